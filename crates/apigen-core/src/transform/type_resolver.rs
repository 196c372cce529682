use std::collections::HashMap;

use crate::config::FeatureFlags;
use crate::error::ResolveError;
use crate::ir::{
    Discriminator, EnumMember, EnumType, ModelDescriptor, Nullability, ResolvedType, TargetType,
    TypeKind, UnionType, UnknownEnumPolicy,
};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};
use crate::profile::{ContainerSyntax, TargetProfile, apply_template};

use super::default_value;
use super::name_normalizer::{NameAllocator, normalize_name};
use super::schema_index::{SCHEMAS, SchemaIndex, Visited, parse_ref_name};

/// Where a schema is being resolved.
#[derive(Debug, Clone, Copy)]
pub struct Usage<'u> {
    /// Contract location, used in error reports.
    pub location: &'u str,
    /// `Some` for fields and parameters: drives nullability and defaults.
    pub required: Option<bool>,
    /// Name given to an inline object promoted from this position.
    pub inline_name: &'u str,
    /// Name given to an inline enum declared at this position.
    pub enum_name: &'u str,
}

impl<'u> Usage<'u> {
    pub fn standalone(location: &'u str, name: &'u str) -> Self {
        Self {
            location,
            required: None,
            inline_name: name,
            enum_name: name,
        }
    }
}

/// Resolves schemas against one target profile.
///
/// One resolver serves one unit of work (a top-level schema or an operation).
/// Inline objects it promotes to named models are collected in `promoted`,
/// in the order they were met.
pub struct Resolver<'a> {
    pub(crate) index: &'a SchemaIndex<'a>,
    pub(crate) profile: &'a TargetProfile,
    pub(crate) flags: &'a FeatureFlags,
    pub(crate) promoted: Vec<ModelDescriptor>,
    pub(crate) model_names: NameAllocator,
}

impl<'a> Resolver<'a> {
    pub fn new(
        index: &'a SchemaIndex<'a>,
        profile: &'a TargetProfile,
        flags: &'a FeatureFlags,
    ) -> Self {
        let mut model_names = NameAllocator::new();
        model_names.reserve(index.schema_names().map(|n| normalize_name(n).pascal_case));
        Self {
            index,
            profile,
            flags,
            promoted: Vec::new(),
            model_names,
        }
    }

    pub fn into_promoted(self) -> Vec<ModelDescriptor> {
        self.promoted
    }

    /// Resolve a schema at a usage site: shape, nullability, boxing and default.
    pub fn resolve(
        &mut self,
        schema: &'a SchemaOrRef,
        usage: Usage<'_>,
    ) -> Result<ResolvedType, ResolveError> {
        let mut visited = Visited::default();
        let shape = self.resolve_shape(schema, usage, &mut visited)?;
        let target = self.index.target_schema(schema)?;
        Ok(self.finish(shape, target, usage))
    }

    /// [`Resolver::resolve`] for a schema that is already inline.
    pub fn resolve_inline(
        &mut self,
        schema: &'a Schema,
        usage: Usage<'_>,
    ) -> Result<ResolvedType, ResolveError> {
        let mut visited = Visited::default();
        let shape = self.resolve_schema(schema, usage, &mut visited)?;
        Ok(self.finish(shape, schema, usage))
    }

    fn finish(&self, resolved: ResolvedType, target: &Schema, usage: Usage<'_>) -> ResolvedType {
        let marker = target.nullable_marker();

        let nullability = match usage.required {
            Some(required) if marker == Some(true) || !required => Nullability::Nullable,
            Some(_) => Nullability::NonNull,
            None => Nullability::from_marker(marker),
        };
        let mut resolved = ResolvedType {
            nullability,
            ..resolved
        };
        if nullability == Nullability::Nullable && self.profile.box_nullable_primitives {
            resolved = resolved.boxed();
        }

        resolved.default_value = default_value::resolve_default(
            target,
            &resolved,
            usage.required.unwrap_or(false),
            self.profile,
            usage.location,
        );
        resolved
    }

    /// The shape of a schema, before usage-specific nullability and defaults.
    pub(crate) fn resolve_shape(
        &mut self,
        schema: &'a SchemaOrRef,
        usage: Usage<'_>,
        visited: &mut Visited,
    ) -> Result<ResolvedType, ResolveError> {
        match schema {
            SchemaOrRef::Ref { ref_path } => self.resolve_ref(ref_path, usage, visited),
            SchemaOrRef::Schema(s) => self.resolve_schema(s, usage, visited),
        }
    }

    fn resolve_schema(
        &mut self,
        schema: &'a Schema,
        usage: Usage<'_>,
        visited: &mut Visited,
    ) -> Result<ResolvedType, ResolveError> {
        if !schema.enum_values.is_empty() {
            let enum_type = self.enum_type(schema, usage.location)?;
            return Ok(scalar(
                TargetType::named(usage.enum_name),
                TypeKind::Enum(enum_type),
            ));
        }

        if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
            let union = self.union_type(schema, usage)?;
            return Ok(scalar(self.profile.any.clone(), TypeKind::Union(union)));
        }

        if !schema.all_of.is_empty() {
            if schema.all_of.len() == 1 && !schema.has_properties() {
                return self.resolve_shape(&schema.all_of[0], usage, visited);
            }
            let name = self.promote(usage.inline_name, schema, usage.location)?;
            return Ok(model_ref(&name));
        }

        if schema.has_properties() {
            let name = self.promote(usage.inline_name, schema, usage.location)?;
            return Ok(model_ref(&name));
        }

        let alternatives = schema.type_alternatives();
        if alternatives.len() > 1 {
            let mut members = Vec::with_capacity(alternatives.len());
            for t in alternatives {
                members.push(self.primitive(t, schema.format.as_deref(), usage.location)?);
            }
            let union = UnionType {
                members,
                discriminator: None,
            };
            return Ok(scalar(self.profile.any.clone(), TypeKind::Union(union)));
        }

        match schema.primary_type() {
            Some(SchemaType::Array) => self.array(schema, usage, visited),
            Some(SchemaType::Object) => self.object(schema, usage, visited),
            Some(SchemaType::Null) => Ok(self.any()),
            Some(t) => self.primitive(t, schema.format.as_deref(), usage.location),
            None if schema.items.is_some() => self.array(schema, usage, visited),
            None if schema.additional_properties.is_some() => self.object(schema, usage, visited),
            None => Ok(self.any()),
        }
    }

    fn resolve_ref(
        &mut self,
        ref_path: &'a str,
        usage: Usage<'_>,
        visited: &mut Visited,
    ) -> Result<ResolvedType, ResolveError> {
        let (name, target) = self.index.schema_ref(ref_path)?;
        if self.index.is_model(target) {
            return Ok(model_ref(&normalize_name(name).pascal_case));
        }

        if !visited.enter(name) {
            return Err(ResolveError::CircularAlias {
                location: usage.location.to_string(),
                chain: visited.describe(name),
            });
        }
        let location = format!("#/components/schemas/{name}");
        let aliased = Usage {
            location: &location,
            ..usage
        };
        let resolved = self.resolve_shape(target, aliased, visited);
        visited.leave();
        resolved
    }

    fn array(
        &mut self,
        schema: &'a Schema,
        usage: Usage<'_>,
        visited: &mut Visited,
    ) -> Result<ResolvedType, ResolveError> {
        let element = match &schema.items {
            Some(items) => {
                let location = format!("{}/items", usage.location);
                let item_usage = Usage {
                    location: &location,
                    required: None,
                    ..usage
                };
                self.element(items, item_usage, visited)?
            }
            None => self.any(),
        };
        Ok(container(&self.profile.array, element, TypeKind::Array))
    }

    fn object(
        &mut self,
        schema: &'a Schema,
        usage: Usage<'_>,
        visited: &mut Visited,
    ) -> Result<ResolvedType, ResolveError> {
        let value = match &schema.additional_properties {
            Some(AdditionalProperties::Schema(value)) => {
                let location = format!("{}/additionalProperties", usage.location);
                let value_usage = Usage {
                    location: &location,
                    required: None,
                    ..usage
                };
                self.element(value, value_usage, visited)?
            }
            Some(AdditionalProperties::Bool(true)) => self.any(),
            Some(AdditionalProperties::Bool(false)) | None => return Ok(self.any()),
        };
        Ok(container(&self.profile.map, value, TypeKind::Map))
    }

    /// Container elements are always rendered with their object equivalent.
    fn element(
        &mut self,
        schema: &'a SchemaOrRef,
        usage: Usage<'_>,
        visited: &mut Visited,
    ) -> Result<ResolvedType, ResolveError> {
        let element = self.resolve_shape(schema, usage, visited)?;
        let marker = self.index.target_schema(schema)?.nullable_marker();
        Ok(ResolvedType {
            nullability: Nullability::from_marker(marker),
            ..element.boxed()
        })
    }

    pub(crate) fn primitive(
        &self,
        schema_type: SchemaType,
        format: Option<&str>,
        location: &str,
    ) -> Result<ResolvedType, ResolveError> {
        let target = self
            .profile
            .lookup(schema_type, format)
            .ok_or_else(|| ResolveError::UnmappedType {
                location: location.to_string(),
                target: self.profile.id.clone(),
                schema_type: schema_type.as_str().to_string(),
                format: format.map(str::to_string),
            })?;
        Ok(scalar(target.clone(), TypeKind::Primitive))
    }

    pub(crate) fn any(&self) -> ResolvedType {
        scalar(self.profile.any.clone(), TypeKind::Any)
    }

    /// Ordered members of an enum schema, with the fallback member when enabled.
    pub(crate) fn enum_type(
        &self,
        schema: &Schema,
        location: &str,
    ) -> Result<EnumType, ResolveError> {
        let value_type = match schema.primary_type() {
            Some(t) if t.is_primitive() => {
                Some(self.primitive(t, schema.format.as_deref(), location)?.name)
            }
            _ => None,
        };

        let mut members = enum_identifiers(&schema.enum_values, self.profile)
            .into_iter()
            .map(|(value, identifier)| {
                let literal =
                    default_value::scalar_literal(&value, value_type.as_deref(), self.profile)
                        .ok_or_else(|| ResolveError::MalformedSchema {
                            location: location.to_string(),
                            reason: format!("enum value {value} has no scalar literal"),
                        })?;
                Ok(EnumMember {
                    literal,
                    value,
                    identifier,
                    fallback: false,
                })
            })
            .collect::<Result<Vec<_>, ResolveError>>()?;

        let unknown = if self.flags.enum_unknown_default_case {
            members.push(EnumMember {
                value: serde_json::Value::Null,
                identifier: self.fallback_identifier(&members),
                literal: self.profile.literals.null_literal.clone(),
                fallback: true,
            });
            UnknownEnumPolicy::Fallback
        } else {
            UnknownEnumPolicy::Fail
        };

        Ok(EnumType { members, unknown })
    }

    fn fallback_identifier(&self, members: &[EnumMember]) -> String {
        let mut identifiers = NameAllocator::new();
        identifiers.reserve(members.iter().map(|m| m.identifier.clone()));
        identifiers.claim(&self.profile.naming.enum_fallback_member)
    }

    /// Members of a one-of / any-of with the discriminator mapping.
    pub(crate) fn union_type(
        &mut self,
        schema: &'a Schema,
        usage: Usage<'_>,
    ) -> Result<UnionType, ResolveError> {
        let (keyword, branches) = if schema.one_of.is_empty() {
            ("anyOf", &schema.any_of)
        } else {
            ("oneOf", &schema.one_of)
        };

        let mut members = Vec::with_capacity(branches.len());
        for (i, branch) in branches.iter().enumerate() {
            let location = format!("{}/{keyword}/{i}", usage.location);
            let inline_name = format!("{}Option{}", usage.inline_name, i + 1);
            let member_usage = Usage {
                location: &location,
                required: None,
                inline_name: &inline_name,
                enum_name: &inline_name,
            };
            let mut visited = Visited::default();
            members.push(self.resolve_shape(branch, member_usage, &mut visited)?);
        }

        let discriminator = match &schema.discriminator {
            Some(d) => Some(self.discriminator(d, branches)?),
            None => None,
        };
        Ok(UnionType {
            members,
            discriminator,
        })
    }

    pub(crate) fn discriminator(
        &self,
        discriminator: &'a crate::parse::schema::Discriminator,
        branches: &'a [SchemaOrRef],
    ) -> Result<Discriminator, ResolveError> {
        let mapping = if discriminator.mapping.is_empty() {
            let mut mapping = Vec::new();
            for branch in branches {
                if let Some(ref_path) = branch.ref_path() {
                    let name = parse_ref_name(ref_path, SCHEMAS)?;
                    mapping.push((name.to_string(), normalize_name(name).pascal_case));
                }
            }
            mapping
        } else {
            let mut mapping = Vec::with_capacity(discriminator.mapping.len());
            for (literal, target) in &discriminator.mapping {
                let name = if target.starts_with('#') {
                    parse_ref_name(target, SCHEMAS)?
                } else {
                    target.as_str()
                };
                mapping.push((literal.clone(), normalize_name(name).pascal_case));
            }
            mapping
        };
        Ok(Discriminator {
            property_name: discriminator.property_name.clone(),
            mapping,
        })
    }
}

/// Non-null enum literals paired with unique identifiers in the profile's member case.
pub(crate) fn enum_identifiers(
    values: &[serde_json::Value],
    profile: &TargetProfile,
) -> Vec<(serde_json::Value, String)> {
    let mut identifiers = NameAllocator::new();
    values
        .iter()
        .filter(|v| !v.is_null())
        .map(|value| {
            let base = normalize_name(&enum_member_base(value));
            let ident = profile.identifier(&base, profile.naming.enum_member_case);
            (value.clone(), identifiers.claim(&ident))
        })
        .collect()
}

/// Raw identifier text for an enum literal, before casing.
fn enum_member_base(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) if s.is_empty() => "empty".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => {
            let text = n.to_string().replace('-', "minus_").replace('.', "_dot_");
            format!("number_{text}")
        }
        other => other.to_string(),
    }
}

pub(crate) fn scalar(target: TargetType, kind: TypeKind) -> ResolvedType {
    ResolvedType {
        name: target.name.clone(),
        target,
        kind,
        nullability: Nullability::Unknown,
        default_value: None,
    }
}

pub(crate) fn model_ref(name: &str) -> ResolvedType {
    scalar(TargetType::named(name), TypeKind::Model(name.to_string()))
}

fn container(
    syntax: &ContainerSyntax,
    element: ResolvedType,
    kind: fn(Box<ResolvedType>) -> TypeKind,
) -> ResolvedType {
    ResolvedType {
        name: apply_template(&syntax.template, &element.name),
        target: syntax.target.clone(),
        kind: kind(Box::new(element)),
        nullability: Nullability::Unknown,
        default_value: None,
    }
}

/// Re-point model references from `from` to `to`, re-rendering enclosing names.
pub(crate) fn rename_model_refs(
    ty: &mut ResolvedType,
    renames: &HashMap<String, String>,
    profile: &TargetProfile,
) {
    match &mut ty.kind {
        TypeKind::Model(name) => {
            if let Some(to) = renames.get(name.as_str()) {
                *name = to.clone();
                ty.name = to.clone();
                ty.target.name = to.clone();
            }
        }
        TypeKind::Array(inner) => {
            rename_model_refs(inner, renames, profile);
            ty.name = apply_template(&profile.array.template, &inner.name);
        }
        TypeKind::Map(inner) => {
            rename_model_refs(inner, renames, profile);
            ty.name = apply_template(&profile.map.template, &inner.name);
        }
        TypeKind::Async(inner) => {
            rename_model_refs(inner, renames, profile);
            let template = if ty.target == profile.async_wrapper.target {
                &profile.async_wrapper.template
            } else {
                profile
                    .reactive_wrapper
                    .as_ref()
                    .map_or(&profile.async_wrapper.template, |w| &w.template)
            };
            ty.name = apply_template(template, &inner.name);
        }
        TypeKind::Union(union) => {
            for member in &mut union.members {
                rename_model_refs(member, renames, profile);
            }
            if let Some(discriminator) = &mut union.discriminator {
                rename_mapping(discriminator, renames);
            }
        }
        _ => {}
    }
}

/// Point discriminator mapping targets at renamed models.
pub(crate) fn rename_mapping(discriminator: &mut Discriminator, renames: &HashMap<String, String>) {
    for (_, target) in &mut discriminator.mapping {
        if let Some(to) = renames.get(target.as_str()) {
            *target = to.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Container, DefaultOrigin};
    use crate::parse;
    use crate::parse::spec::OpenApiSpec;

    const SPEC: &str = r##"
openapi: 3.0.3
info: {title: t, version: "1"}
components:
  schemas:
    Pet:
      type: object
      properties:
        id: {type: integer, format: int64}
    PetId: {type: integer, format: int64}
    PetIds:
      type: array
      items: {$ref: "#/components/schemas/PetId"}
    Color:
      type: string
      enum: [red, green, blue]
    A: {$ref: "#/components/schemas/B"}
    B: {$ref: "#/components/schemas/A"}
    Weird: {type: string, format: weird}
"##;

    fn spec() -> OpenApiSpec {
        parse::from_yaml(SPEC).unwrap()
    }

    fn jaxrs() -> TargetProfile {
        TargetProfile::builtin("jaxrs_spec").unwrap().unwrap()
    }

    fn inline(yaml: &str) -> SchemaOrRef {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    fn field(required: bool) -> Usage<'static> {
        Usage {
            location: "#/test",
            required: Some(required),
            inline_name: "TestInline",
            enum_name: "TestEnum",
        }
    }

    #[test]
    fn maps_primitives_through_profile() {
        let spec = spec();
        let index = SchemaIndex::new(&spec);
        let profile = jaxrs();
        let flags = FeatureFlags::default();
        let mut r = Resolver::new(&index, &profile, &flags);

        let long = inline("{type: integer, format: int64}");
        let t = r.resolve(&long, field(true)).unwrap();
        assert_eq!(t.name, "long");
        assert_eq!(t.nullability, Nullability::NonNull);

        let t = r.resolve(&long, field(false)).unwrap();
        assert_eq!(t.name, "Long");
        assert_eq!(t.nullability, Nullability::Nullable);

        let wildcard = inline("{type: string, format: email}");
        assert_eq!(r.resolve(&wildcard, field(true)).unwrap().name, "String");

        let untyped = inline("{description: anything}");
        let t = r.resolve(&untyped, field(true)).unwrap();
        assert_eq!(t.name, "Object");
        assert_eq!(t.kind, TypeKind::Any);
    }

    #[test]
    fn follows_primitive_aliases_but_keeps_model_refs() {
        let spec = spec();
        let index = SchemaIndex::new(&spec);
        let profile = jaxrs();
        let flags = FeatureFlags::default();
        let mut r = Resolver::new(&index, &profile, &flags);

        let ids = inline(r##"{$ref: "#/components/schemas/PetIds"}"##);
        let t = r.resolve(&ids, field(false)).unwrap();
        assert_eq!(t.name, "List<Long>");
        assert_eq!(t.container(), Container::Array);

        let pet = inline(r##"{$ref: "#/components/schemas/Pet"}"##);
        let t = r.resolve(&pet, Usage::standalone("#/test", "X")).unwrap();
        assert_eq!(t.model_ref(), Some("Pet"));
        assert_eq!(t.nullability, Nullability::Unknown);
    }

    #[test]
    fn alias_cycle_is_fatal() {
        let spec = spec();
        let index = SchemaIndex::new(&spec);
        let profile = jaxrs();
        let flags = FeatureFlags::default();
        let mut r = Resolver::new(&index, &profile, &flags);

        let a = inline(r##"{$ref: "#/components/schemas/A"}"##);
        let err = r.resolve(&a, field(true)).unwrap_err();
        assert!(matches!(err, ResolveError::CircularAlias { .. }));
    }

    #[test]
    fn unmapped_type_reports_location_and_format() {
        let spec = spec();
        let index = SchemaIndex::new(&spec);
        let mut profile = jaxrs();
        profile.types.retain(|m| m.format.as_deref() != Some("*"));
        let flags = FeatureFlags::default();
        let mut r = Resolver::new(&index, &profile, &flags);

        let weird = inline(r##"{$ref: "#/components/schemas/Weird"}"##);
        let err = r.resolve(&weird, field(true)).unwrap_err();
        match err {
            ResolveError::UnmappedType {
                location,
                schema_type,
                format,
                ..
            } => {
                assert_eq!(location, "#/components/schemas/Weird");
                assert_eq!(schema_type, "string");
                assert_eq!(format.as_deref(), Some("weird"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn required_arrays_get_empty_container_default() {
        let spec = spec();
        let index = SchemaIndex::new(&spec);
        let profile = jaxrs();
        let flags = FeatureFlags::default();
        let mut r = Resolver::new(&index, &profile, &flags);

        let tags = inline("{type: array, items: {type: string}}");
        let t = r.resolve(&tags, field(true)).unwrap();
        let default = t.default_value.unwrap();
        assert_eq!(default.literal, "new ArrayList<>()");
        assert_eq!(default.origin, DefaultOrigin::EmptyContainer);
        assert_eq!(default.imports, vec!["java.util.ArrayList".to_string()]);

        assert!(r.resolve(&tags, field(false)).unwrap().default_value.is_none());

        let nullable = inline("{type: array, nullable: true, items: {type: string}}");
        let t = r.resolve(&nullable, field(true)).unwrap();
        assert_eq!(t.nullability, Nullability::Nullable);
        assert!(t.default_value.is_none());
    }

    #[test]
    fn inline_enum_members_follow_profile_case() {
        let spec = spec();
        let index = SchemaIndex::new(&spec);
        let profile = jaxrs();
        let flags = FeatureFlags::default();
        let mut r = Resolver::new(&index, &profile, &flags);

        let status = inline("{type: string, enum: [available, sold-out, '', '1st'], default: sold-out}");
        let t = r.resolve(&status, field(true)).unwrap();
        assert_eq!(t.name, "TestEnum");
        let TypeKind::Enum(e) = &t.kind else {
            panic!("expected an enum, got {:?}", t.kind);
        };
        let idents: Vec<&str> = e.members.iter().map(|m| m.identifier.as_str()).collect();
        assert_eq!(idents, ["AVAILABLE", "SOLD_OUT", "EMPTY", "_1ST"]);
        assert_eq!(e.members[1].literal, "\"sold-out\"");
        assert_eq!(e.unknown, UnknownEnumPolicy::Fail);
        assert_eq!(t.default_value.unwrap().literal, "TestEnum.SOLD_OUT");
    }

    #[test]
    fn numeric_enum_identifiers() {
        let spec = spec();
        let index = SchemaIndex::new(&spec);
        let profile = jaxrs();
        let flags = FeatureFlags::default();
        let r = Resolver::new(&index, &profile, &flags);

        let schema: Schema =
            serde_yaml_ng::from_str("{type: integer, format: int64, enum: [1, -2]}").unwrap();
        let e = r.enum_type(&schema, "#/test").unwrap();
        let idents: Vec<&str> = e.members.iter().map(|m| m.identifier.as_str()).collect();
        assert_eq!(idents, ["NUMBER_1", "NUMBER_MINUS_2"]);
        assert_eq!(e.members[1].literal, "-2L");
    }

    #[test]
    fn structured_enum_values_are_rejected() {
        let spec = spec();
        let index = SchemaIndex::new(&spec);
        let profile = jaxrs();
        let flags = FeatureFlags::default();
        let r = Resolver::new(&index, &profile, &flags);

        let schema: Schema =
            serde_yaml_ng::from_str("{type: string, enum: [plain, [1, 2]]}").unwrap();
        let err = r.enum_type(&schema, "#/components/schemas/Odd").unwrap_err();
        match err {
            ResolveError::MalformedSchema { location, reason } => {
                assert_eq!(location, "#/components/schemas/Odd");
                assert!(reason.contains("[1,2]"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn union_discriminator_defaults_to_member_names() {
        let spec = spec();
        let index = SchemaIndex::new(&spec);
        let profile = jaxrs();
        let flags = FeatureFlags::default();
        let mut r = Resolver::new(&index, &profile, &flags);

        let schema: Schema = serde_yaml_ng::from_str(
            r##"
oneOf:
  - $ref: "#/components/schemas/Pet"
  - $ref: "#/components/schemas/Color"
discriminator:
  propertyName: kind
"##,
        )
        .unwrap();
        let union = r
            .union_type(&schema, Usage::standalone("#/test", "Choice"))
            .unwrap();
        assert_eq!(union.members.len(), 2);
        let d = union.discriminator.unwrap();
        assert_eq!(d.property_name, "kind");
        assert_eq!(
            d.mapping,
            vec![
                ("Pet".to_string(), "Pet".to_string()),
                ("Color".to_string(), "Color".to_string())
            ]
        );
    }

    #[test]
    fn renames_reach_union_members_and_mapping() {
        let spec = spec();
        let index = SchemaIndex::new(&spec);
        let profile = jaxrs();
        let flags = FeatureFlags::default();
        let mut r = Resolver::new(&index, &profile, &flags);

        let schema: Schema = serde_yaml_ng::from_str(
            r##"
oneOf:
  - $ref: "#/components/schemas/Pet"
  - $ref: "#/components/schemas/Color"
discriminator:
  propertyName: kind
"##,
        )
        .unwrap();
        let union = r
            .union_type(&schema, Usage::standalone("#/test", "Choice"))
            .unwrap();
        let mut ty = scalar(TargetType::named("Choice"), TypeKind::Union(union));
        let renames = HashMap::from([
            ("Pet".to_string(), "Pet2".to_string()),
            ("Pet2".to_string(), "Pet3".to_string()),
        ]);
        rename_model_refs(&mut ty, &renames, &profile);

        let TypeKind::Union(union) = &ty.kind else {
            panic!("expected a union");
        };
        assert_eq!(union.members[0].model_ref(), Some("Pet2"));
        assert_eq!(union.members[0].name, "Pet2");
        assert_eq!(union.members[1].model_ref(), Some("Color"));
        assert_eq!(
            union.discriminator.as_ref().unwrap().mapping,
            vec![
                ("Pet".to_string(), "Pet2".to_string()),
                ("Color".to_string(), "Color".to_string())
            ]
        );
    }
}
