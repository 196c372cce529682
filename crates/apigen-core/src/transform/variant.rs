//! Code-shape variant selection for operation return types.
//!
//! One ordered procedure: response wrapper first, then async wrapping, then
//! the boxing correction for async payloads.

use crate::config::FeatureFlags;
use crate::ir::{CodeShapeVariant, Nullability, ResolvedType, ResponseType, TypeKind};
use crate::profile::{TargetProfile, WrapperSyntax, apply_template};

use super::type_resolver::scalar;

pub fn select_variant(
    response: &ResponseType,
    flags: &FeatureFlags,
    profile: &TargetProfile,
) -> CodeShapeVariant {
    let mut return_type = match response {
        ResponseType::Content(ty) => ty.clone(),
        ResponseType::NoContent => scalar(profile.void.clone(), TypeKind::Void),
    };

    let response_wrapped =
        flags.return_response || (!flags.interface_only && profile.implementation_returns_response);
    if response_wrapped {
        return_type = scalar(profile.response.clone(), TypeKind::Response);
    }

    if flags.support_async {
        return_type = wrap_async(return_type, async_wrapper(flags, profile));
        if profile.async_requires_boxed {
            return_type = box_async_payload(return_type, profile, flags);
        }
    }

    CodeShapeVariant {
        is_async: flags.support_async,
        interface_only: flags.interface_only,
        response_wrapped,
        return_type,
    }
}

fn async_wrapper<'p>(flags: &FeatureFlags, profile: &'p TargetProfile) -> &'p WrapperSyntax {
    if !flags.use_reactive {
        return &profile.async_wrapper;
    }
    match &profile.reactive_wrapper {
        Some(wrapper) => wrapper,
        None => {
            log::warn!(
                "profile {} has no reactive wrapper, using {}",
                profile.id,
                profile.async_wrapper.target.name
            );
            &profile.async_wrapper
        }
    }
}

fn wrap_async(payload: ResolvedType, wrapper: &WrapperSyntax) -> ResolvedType {
    ResolvedType {
        name: apply_template(&wrapper.template, &payload.name),
        target: wrapper.target.clone(),
        kind: TypeKind::Async(Box::new(payload)),
        nullability: Nullability::Unknown,
        default_value: None,
    }
}

/// Rebuild an async type whose payload is primitive with the boxed payload.
fn box_async_payload(
    wrapped: ResolvedType,
    profile: &TargetProfile,
    flags: &FeatureFlags,
) -> ResolvedType {
    match wrapped.kind {
        TypeKind::Async(payload) if payload.is_primitive() => {
            wrap_async((*payload).boxed(), async_wrapper(flags, profile))
        }
        kind => ResolvedType { kind, ..wrapped },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TargetType;

    fn jaxrs() -> TargetProfile {
        TargetProfile::builtin("jaxrs_spec").unwrap().unwrap()
    }

    fn flags(support_async: bool, interface_only: bool, return_response: bool) -> FeatureFlags {
        FeatureFlags {
            support_async,
            interface_only,
            return_response,
            ..Default::default()
        }
    }

    fn model(name: &str) -> ResponseType {
        ResponseType::Content(scalar(TargetType::named(name), TypeKind::Model(name.to_string())))
    }

    fn primitive(profile: &TargetProfile, name: &str) -> ResponseType {
        let target = profile.types.iter().find(|m| m.target.name == name).unwrap();
        ResponseType::Content(scalar(target.target.clone(), TypeKind::Primitive))
    }

    #[test]
    fn interface_only_async_keeps_payload() {
        let p = jaxrs();
        let v = select_variant(&model("Pet"), &flags(true, true, false), &p);
        assert!(v.is_async);
        assert!(v.interface_only);
        assert!(!v.response_wrapped);
        assert_eq!(v.return_type.name, "CompletionStage<Pet>");
        match &v.return_type.kind {
            TypeKind::Async(inner) => assert_eq!(inner.model_ref(), Some("Pet")),
            other => panic!("expected async, got {other:?}"),
        }
    }

    #[test]
    fn implementation_returns_response() {
        let p = jaxrs();
        let v = select_variant(&model("Pet"), &flags(true, false, false), &p);
        assert!(v.response_wrapped);
        assert_eq!(v.return_type.name, "CompletionStage<Response>");

        let v = select_variant(&model("Pet"), &flags(false, false, false), &p);
        assert_eq!(v.return_type.name, "Response");
        assert_eq!(v.return_type.kind, TypeKind::Response);
    }

    #[test]
    fn return_response_wins_over_interface_only() {
        let p = jaxrs();
        let v = select_variant(&model("Pet"), &flags(true, true, true), &p);
        assert!(v.response_wrapped);
        assert_eq!(v.return_type.name, "CompletionStage<Response>");
    }

    #[test]
    fn async_payloads_are_boxed() {
        let p = jaxrs();
        let f = flags(true, true, false);
        assert_eq!(
            select_variant(&ResponseType::NoContent, &f, &p).return_type.name,
            "CompletionStage<Void>"
        );
        assert_eq!(
            select_variant(&primitive(&p, "boolean"), &f, &p).return_type.name,
            "CompletionStage<Boolean>"
        );
        assert_eq!(
            select_variant(&primitive(&p, "int"), &flags(false, true, false), &p)
                .return_type
                .name,
            "int"
        );
    }

    #[test]
    fn reactive_wrapper_when_requested() {
        let p = jaxrs();
        let f = FeatureFlags {
            use_reactive: true,
            ..flags(true, true, false)
        };
        let v = select_variant(&primitive(&p, "boolean"), &f, &p);
        assert_eq!(v.return_type.name, "Uni<Boolean>");

        let ts = TargetProfile::builtin("typescript").unwrap().unwrap();
        let v = select_variant(&ResponseType::NoContent, &f, &ts);
        assert_eq!(v.return_type.name, "Promise<void>");
    }
}
