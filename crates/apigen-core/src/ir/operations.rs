use serde::Serialize;

use super::models::Constraints;
use super::types::{NormalizedName, ResolvedType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    pub original_name: String,
    pub identifier: String,
    pub location: ParameterLocation,
    pub param_type: ResolvedType,
    pub required: bool,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBodyDescriptor {
    pub body_type: ResolvedType,
    pub required: bool,
    pub content_type: String,
}

/// What the contract says an operation returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Content(ResolvedType),
    NoContent,
}

/// The finalized code shape of one operation's signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeShapeVariant {
    pub is_async: bool,
    pub interface_only: bool,
    pub response_wrapped: bool,
    pub return_type: ResolvedType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDescriptor {
    pub operation_id: String,
    pub name: NormalizedName,
    pub method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub parameters: Vec<ParameterDescriptor>,
    pub request_body: Option<RequestBodyDescriptor>,
    pub response: ResponseType,
    pub group: String,
    pub base_name: String,
    pub variant: CodeShapeVariant,
    pub deprecated: bool,
}

impl OperationDescriptor {
    /// Every type this operation contributes to its API file.
    pub fn referenced_types(&self) -> Vec<&ResolvedType> {
        let mut types: Vec<&ResolvedType> =
            self.parameters.iter().map(|p| &p.param_type).collect();
        if let Some(body) = &self.request_body {
            types.push(&body.body_type);
        }
        types.push(&self.variant.return_type);
        types
    }
}

/// Operations sharing one API surface, in contract order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiGroup {
    pub name: String,
    /// Target type name of the API, e.g. `SubresourceApi`.
    pub api_name: String,
    pub operations: Vec<OperationDescriptor>,
    /// Filled by the import pass.
    pub imports: Vec<String>,
}
