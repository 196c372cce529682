//! Default-value literals in target syntax.

use serde_json::Value;

use crate::ir::{
    Container, DefaultOrigin, DefaultValue, EnumType, Nullability, ResolvedType, TypeKind,
};
use crate::parse::schema::Schema;
use crate::profile::{TargetProfile, apply_template};

use super::type_resolver::enum_identifiers;

/// The default for a resolved usage: the declared one, else an empty
/// container for required, non-null arrays.
pub fn resolve_default(
    schema: &Schema,
    ty: &ResolvedType,
    required: bool,
    profile: &TargetProfile,
    location: &str,
) -> Option<DefaultValue> {
    match &schema.default_value {
        Some(value) => {
            let declared = declared_default(value, schema, ty, profile);
            if declared.is_none() {
                log::warn!("{location}: default {value} has no {} literal, dropped", profile.id);
            }
            declared
        }
        None => empty_container(ty, required, profile),
    }
}

fn empty_container(
    ty: &ResolvedType,
    required: bool,
    profile: &TargetProfile,
) -> Option<DefaultValue> {
    if ty.container() != Container::Array || !required || ty.nullability != Nullability::NonNull {
        return None;
    }
    Some(DefaultValue {
        literal: profile.array.empty_literal.clone()?,
        origin: DefaultOrigin::EmptyContainer,
        imports: profile.array.empty_imports.clone(),
    })
}

fn declared_default(
    value: &Value,
    schema: &Schema,
    ty: &ResolvedType,
    profile: &TargetProfile,
) -> Option<DefaultValue> {
    if value.is_null() {
        return Some(declared(profile.literals.null_literal.clone(), Vec::new()));
    }
    match &ty.kind {
        TypeKind::Array(element) => {
            let items = value.as_array()?;
            if items.is_empty() {
                let literal = profile.array.empty_literal.clone()?;
                return Some(declared(literal, profile.array.empty_imports.clone()));
            }
            let template = profile.array.literal_template.as_ref()?;
            let elements = items
                .iter()
                .map(|item| element_literal(item, element, profile))
                .collect::<Option<Vec<_>>>()?;
            Some(declared(
                apply_template(template, &elements.join(", ")),
                profile.array.literal_imports.clone(),
            ))
        }
        TypeKind::Map(_) => {
            let entries = value.as_object()?;
            if !entries.is_empty() {
                return None;
            }
            let literal = profile.map.empty_literal.clone()?;
            Some(declared(literal, profile.map.empty_imports.clone()))
        }
        TypeKind::Enum(enum_type) => {
            let literal = inline_enum_literal(value, &ty.name, enum_type, profile)?;
            Some(declared(literal, Vec::new()))
        }
        TypeKind::Model(name) if !schema.enum_values.is_empty() => {
            let identifiers = enum_identifiers(&schema.enum_values, profile);
            let (_, identifier) = identifiers.into_iter().find(|(v, _)| v == value)?;
            Some(declared(enum_reference(name, &identifier, profile), Vec::new()))
        }
        _ => scalar_literal(value, Some(&ty.name), profile).map(|l| declared(l, Vec::new())),
    }
}

fn element_literal(value: &Value, element: &ResolvedType, profile: &TargetProfile) -> Option<String> {
    match &element.kind {
        TypeKind::Enum(enum_type) => inline_enum_literal(value, &element.name, enum_type, profile),
        _ => scalar_literal(value, Some(&element.name), profile),
    }
}

fn inline_enum_literal(
    value: &Value,
    type_name: &str,
    enum_type: &EnumType,
    profile: &TargetProfile,
) -> Option<String> {
    enum_type
        .members
        .iter()
        .find(|m| !m.fallback && m.value == *value)
        .map(|m| enum_reference(type_name, &m.identifier, profile))
}

fn enum_reference(type_name: &str, member: &str, profile: &TargetProfile) -> String {
    profile
        .literals
        .enum_member
        .replace("{type}", type_name)
        .replace("{member}", member)
}

fn declared(literal: String, imports: Vec<String>) -> DefaultValue {
    DefaultValue {
        literal,
        origin: DefaultOrigin::Declared,
        imports,
    }
}

/// A scalar JSON value in target syntax. `type_name` selects the number template.
pub fn scalar_literal(value: &Value, type_name: Option<&str>, profile: &TargetProfile) -> Option<String> {
    let literals = &profile.literals;
    match value {
        Value::String(s) => Some(quote(s, literals.string_quote)),
        Value::Number(n) => {
            let text = n.to_string();
            let template = type_name.and_then(|t| literals.numbers.get(t));
            Some(match template {
                Some(template) => apply_template(template, &text),
                None => text,
            })
        }
        Value::Bool(true) => Some(literals.true_literal.clone()),
        Value::Bool(false) => Some(literals.false_literal.clone()),
        Value::Null => Some(literals.null_literal.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn quote(s: &str, quote: char) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
