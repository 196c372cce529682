//! Target profiles: everything platform-specific, expressed as data.
//!
//! A profile carries the `(type, format)` mapping table, container and wrapper
//! templates, literal syntax, reserved words and naming rules. Built-in
//! profiles are YAML documents compiled into the crate; custom ones load from
//! disk with the same schema.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::ir::{NormalizedName, TargetType};
use crate::parse::schema::SchemaType;

const JAXRS_SPEC: &str = include_str!("../profiles/jaxrs_spec.yaml");
const TYPESCRIPT: &str = include_str!("../profiles/typescript.yaml");

/// Ids of the profiles bundled with the crate.
pub const BUILTIN_PROFILES: &[&str] = &["jaxrs_spec", "typescript"];

/// Placeholder substituted by container and wrapper templates.
pub const ITEM_PLACEHOLDER: &str = "{item}";
const WILDCARD_FORMAT: &str = "*";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TargetProfile {
    pub id: String,
    /// Default relative path for the embedded contract copy.
    pub spec_file_location: String,
    pub types: Vec<TypeMapping>,
    pub any: TargetType,
    pub void: TargetType,
    pub response: TargetType,
    pub array: ContainerSyntax,
    pub map: ContainerSyntax,
    pub async_wrapper: WrapperSyntax,
    #[serde(default)]
    pub reactive_wrapper: Option<WrapperSyntax>,
    /// Async payloads must be object types (`CompletionStage<Integer>`).
    #[serde(default)]
    pub async_requires_boxed: bool,
    #[serde(default)]
    pub box_nullable_primitives: bool,
    /// Non-interface implementations return the generic response type.
    #[serde(default)]
    pub implementation_returns_response: bool,
    /// Import template for a model, e.g. `org.openapitools.model.{item}`.
    #[serde(default)]
    pub model_import: Option<String>,
    /// Model files live in one namespace and never import each other.
    #[serde(default)]
    pub models_share_namespace: bool,
    pub literals: LiteralSyntax,
    pub naming: NamingRules,
    #[serde(default)]
    pub reserved_words: BTreeSet<String>,
}

/// One row of the primitive mapping table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TypeMapping {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    /// `None` matches a schema without format, `*` matches any format.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(flatten)]
    pub target: TargetType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContainerSyntax {
    pub template: String,
    pub target: TargetType,
    #[serde(default)]
    pub empty_literal: Option<String>,
    #[serde(default)]
    pub empty_imports: Vec<String>,
    /// Literal for a declared non-empty default; `{item}` receives the elements.
    #[serde(default)]
    pub literal_template: Option<String>,
    #[serde(default)]
    pub literal_imports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WrapperSyntax {
    pub template: String,
    pub target: TargetType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiteralSyntax {
    #[serde(default = "default_quote")]
    pub string_quote: char,
    pub null_literal: String,
    pub true_literal: String,
    pub false_literal: String,
    /// Number literal templates keyed by target type name, e.g. `long: "{item}L"`.
    #[serde(default)]
    pub numbers: IndexMap<String, String>,
    /// Template for an enum member reference; `{type}` and `{member}`.
    pub enum_member: String,
}

fn default_quote() -> char {
    '"'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Case {
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
}

impl Case {
    pub fn pick(self, name: &NormalizedName) -> &str {
        match self {
            Case::Pascal => &name.pascal_case,
            Case::Camel => &name.camel_case,
            Case::Snake => &name.snake_case,
            Case::ScreamingSnake => &name.screaming_snake,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamingRules {
    pub field_case: Case,
    pub enum_member_case: Case,
    pub api_suffix: String,
    pub reserved_prefix: String,
    /// Identifier of the extra member added for unknown enum literals.
    pub enum_fallback_member: String,
}

impl TargetProfile {
    pub fn from_yaml(source: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_yaml_ng::from_str(source).map_err(|source| ConfigError::Yaml {
            path: origin.to_string(),
            source,
        })
    }

    pub fn builtin(id: &str) -> Option<Result<Self, ConfigError>> {
        let source = match id {
            "jaxrs_spec" => JAXRS_SPEC,
            "typescript" => TYPESCRIPT,
            _ => return None,
        };
        Some(Self::from_yaml(source, &format!("<builtin {id}>")))
    }

    /// Resolve a built-in id, or else read a profile document from disk.
    pub fn load(target: &str) -> Result<Self, ConfigError> {
        if let Some(profile) = Self::builtin(target) {
            return profile;
        }
        let path = Path::new(target);
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&source, &path.display().to_string())
    }

    /// Exact `(type, format)` row first, then the type's wildcard row.
    pub fn lookup(&self, schema_type: SchemaType, format: Option<&str>) -> Option<&TargetType> {
        let find = |wanted: Option<&str>| {
            self.types
                .iter()
                .find(|m| m.schema_type == schema_type && m.format.as_deref() == wanted)
        };
        find(format)
            .or_else(|| find(Some(WILDCARD_FORMAT)))
            .map(|m| &m.target)
    }

    pub fn is_reserved(&self, identifier: &str) -> bool {
        self.reserved_words.contains(identifier)
    }

    /// Apply a case rule and escape reserved words and leading digits.
    pub fn identifier(&self, name: &NormalizedName, case: Case) -> String {
        let ident = case.pick(name);
        let leading_digit = ident.starts_with(|c: char| c.is_ascii_digit());
        if leading_digit || self.is_reserved(ident) {
            format!("{}{}", self.naming.reserved_prefix, ident)
        } else {
            ident.to_string()
        }
    }

    pub fn api_name(&self, group: &NormalizedName) -> String {
        format!("{}{}", group.pascal_case, self.naming.api_suffix)
    }

    pub fn model_import(&self, model: &str) -> Option<String> {
        self.model_import
            .as_ref()
            .map(|t| t.replace(ITEM_PLACEHOLDER, model))
    }
}

/// Substitute `{item}` in a container or wrapper template.
pub fn apply_template(template: &str, item: &str) -> String {
    template.replace(ITEM_PLACEHOLDER, item)
}
