use serde::Serialize;

use super::types::{Discriminator, EnumType, NormalizedName, ResolvedType, UnionType};

/// A named model produced from a component schema or a promoted inline object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDescriptor {
    pub name: NormalizedName,
    pub description: Option<String>,
    pub shape: ModelShape,
    pub fields: Vec<FieldDescriptor>,
    /// Parent model when all-of composition resolved to inheritance.
    pub parent: Option<String>,
    pub discriminator: Option<Discriminator>,
    /// Filled by the import pass.
    pub imports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelShape {
    Object,
    Enum(EnumType),
    Union(UnionType),
    Alias(ResolvedType),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub original_name: String,
    /// Sanitized, collision-free identifier in the profile's field case.
    pub identifier: String,
    pub owner: String,
    pub field_type: ResolvedType,
    pub required: bool,
    pub nullable: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,
}

/// Validation constraints, passed through for downstream annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        *self == Constraints::default()
    }
}

impl ModelDescriptor {
    pub fn field(&self, original_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.original_name == original_name)
    }

    /// Every type this model's file refers to.
    pub fn referenced_types(&self) -> Vec<&ResolvedType> {
        let mut types: Vec<&ResolvedType> = self.fields.iter().map(|f| &f.field_type).collect();
        match &self.shape {
            ModelShape::Union(union) => types.extend(union.members.iter()),
            ModelShape::Alias(target) => types.push(target),
            ModelShape::Object | ModelShape::Enum(_) => {}
        }
        types
    }
}
