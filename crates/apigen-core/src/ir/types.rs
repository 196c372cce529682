use std::fmt;

use serde::{Deserialize, Serialize};

use super::models::ModelDescriptor;
use super::operations::ApiGroup;
use crate::config::FeatureFlags;

/// The fully resolved, renderer-ready model of one contract for one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntermediateModel {
    pub info: ApiInfo,
    pub servers: Vec<ApiServer>,
    pub target: String,
    pub flags: FeatureFlags,
    pub models: Vec<ModelDescriptor>,
    pub groups: Vec<ApiGroup>,
}

impl IntermediateModel {
    pub fn model(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.name.original == name)
    }

    pub fn group(&self, name: &str) -> Option<&ApiGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiInfo {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiServer {
    pub url: String,
    pub description: Option<String>,
}

/// A name with its casing variants pre-computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NormalizedName {
    pub original: String,
    pub pascal_case: String,
    pub camel_case: String,
    pub snake_case: String,
    pub screaming_snake: String,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// One concrete type of the target platform, as listed in a profile table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
    #[serde(default)]
    pub primitive: bool,
    /// Object equivalent of a primitive (`int` -> `Integer`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boxed: Option<String>,
}

impl TargetType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            import: None,
            primitive: false,
            boxed: None,
        }
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.import = Some(import.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Nullability {
    Nullable,
    NonNull,
    Unknown,
}

impl Nullability {
    pub fn from_marker(marker: Option<bool>) -> Self {
        match marker {
            Some(true) => Nullability::Nullable,
            Some(false) => Nullability::NonNull,
            None => Nullability::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    Scalar,
    Array,
    Map,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Primitive,
    Any,
    /// No content.
    Void,
    /// The profile's generic HTTP response type.
    Response,
    /// Reference to a named model, resolved lazily by name.
    Model(String),
    Enum(EnumType),
    Union(UnionType),
    Array(Box<ResolvedType>),
    Map(Box<ResolvedType>),
    Async(Box<ResolvedType>),
}

/// A schema or parameter resolved against a target profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedType {
    /// Rendered target type, e.g. `List<Pet>`.
    pub name: String,
    /// Outermost target type (`List` for `List<Pet>`).
    pub target: TargetType,
    pub kind: TypeKind,
    pub nullability: Nullability,
    pub default_value: Option<DefaultValue>,
}

impl ResolvedType {
    pub fn container(&self) -> Container {
        match self.kind {
            TypeKind::Array(_) => Container::Array,
            TypeKind::Map(_) => Container::Map,
            _ => Container::Scalar,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.target.primitive
    }

    pub fn model_ref(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Model(name) => Some(name),
            _ => None,
        }
    }

    /// Swap a primitive for its object equivalent; other types are returned unchanged.
    pub fn boxed(self) -> ResolvedType {
        if !self.target.primitive {
            return self;
        }
        let Some(boxed) = self.target.boxed.clone() else {
            return self;
        };
        ResolvedType {
            name: boxed.clone(),
            target: TargetType::named(boxed),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultOrigin {
    /// Formatted from the schema's declared `default`.
    Declared,
    /// Synthesized empty container for a required, non-null array.
    EmptyContainer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultValue {
    pub literal: String,
    pub origin: DefaultOrigin,
    /// Imports the literal itself needs (e.g. `java.util.Arrays`).
    pub imports: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownEnumPolicy {
    /// Decoding an unrecognized literal fails.
    Fail,
    /// Decoding an unrecognized literal yields the fallback member.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumType {
    pub members: Vec<EnumMember>,
    pub unknown: UnknownEnumPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    /// Contract literal; `null` for the fallback member.
    pub value: serde_json::Value,
    pub identifier: String,
    /// `value` formatted in target syntax.
    pub literal: String,
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionType {
    pub members: Vec<ResolvedType>,
    pub discriminator: Option<Discriminator>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discriminator {
    pub property_name: String,
    /// Discriminator literal -> model name, in declaration order.
    pub mapping: Vec<(String, String)>,
}
