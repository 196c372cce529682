use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::ir::{
    HttpMethod, OperationDescriptor, ParameterDescriptor, ParameterLocation,
    RequestBodyDescriptor, ResponseType,
};
use crate::parse::operation::{
    self as contract, Operation, Parameter, ParameterOrRef, PathItem, RequestBody,
    RequestBodyOrRef, Response, ResponseOrRef, preferred_media_type,
};

use super::grouping;
use super::model_builder::constraints_of;
use super::name_normalizer::{NameAllocator, normalize_name, route_to_name};
use super::type_resolver::{Resolver, Usage};
use super::variant::select_variant;

/// Group key used when an operation has no tag to offer.
pub const DEFAULT_GROUP: &str = "default";

impl<'a> Resolver<'a> {
    pub fn build_operation(
        &mut self,
        path: &'a str,
        item: &'a PathItem,
        method: HttpMethod,
        op: &'a Operation,
    ) -> Result<OperationDescriptor, ResolveError> {
        let raw_name = op
            .operation_id
            .clone()
            .unwrap_or_else(|| route_to_name(method, path));
        let name = normalize_name(&raw_name);
        let location = format!("#/paths/{path}/{}", method.as_str().to_lowercase());

        let parameters = self.build_parameters(&name.pascal_case, &location, item, op)?;

        let request_body = match &op.request_body {
            Some(body) => self.build_request_body(&name.pascal_case, &location, body)?,
            None => None,
        };

        let response = self.build_response(&name.pascal_case, &location, op)?;

        let group_key = op.tags.first().map_or(DEFAULT_GROUP, String::as_str);
        let (group, base_name) = grouping::assign(group_key, path, &op.tags, self.flags.use_tags);
        log::debug!("{} {path} -> group {group}", method.as_str());

        let variant = select_variant(&response, self.flags, self.profile);

        Ok(OperationDescriptor {
            operation_id: raw_name,
            name,
            method,
            path: path.to_string(),
            summary: op.summary.clone(),
            tags: op.tags.clone(),
            parameters,
            request_body,
            response,
            group,
            base_name,
            variant,
            deprecated: op.deprecated,
        })
    }

    /// Path-level parameters merged with the operation's; the operation wins
    /// on name + location.
    fn build_parameters(
        &mut self,
        owner: &str,
        location: &str,
        item: &'a PathItem,
        op: &'a Operation,
    ) -> Result<Vec<ParameterDescriptor>, ResolveError> {
        let mut merged: IndexMap<(&'a str, contract::ParameterLocation), &'a Parameter> =
            IndexMap::new();
        for param in item.parameters.iter().chain(&op.parameters) {
            let param = match param {
                ParameterOrRef::Parameter(p) => p,
                ParameterOrRef::Ref { ref_path } => self.index.parameter(ref_path)?,
            };
            merged.insert((param.name.as_str(), param.location), param);
        }

        let mut identifiers = NameAllocator::new();
        let mut parameters = Vec::with_capacity(merged.len());
        for param in merged.into_values() {
            let param_in = ir_location(param.location);
            let required = param.required || param_in == ParameterLocation::Path;
            let param_name = normalize_name(&param.name);
            let param_location = format!("{location}/parameters/{}", param.name);
            let inline_name = format!("{owner}{}", param_name.pascal_case);
            let enum_name = format!("{}Enum", param_name.pascal_case);
            let usage = Usage {
                location: &param_location,
                required: Some(required),
                inline_name: &inline_name,
                enum_name: &enum_name,
            };

            let (param_type, constraints) = match &param.schema {
                Some(schema) => (
                    self.resolve(schema, usage)?,
                    constraints_of(self.index.target_schema(schema)?),
                ),
                None => (self.any(), Default::default()),
            };
            let identifier = self
                .profile
                .identifier(&param_name, self.profile.naming.field_case);

            parameters.push(ParameterDescriptor {
                original_name: param.name.clone(),
                identifier: identifiers.claim(&identifier),
                location: param_in,
                param_type,
                required,
                description: param.description.clone(),
                constraints,
            });
        }
        Ok(parameters)
    }

    fn build_request_body(
        &mut self,
        owner: &str,
        location: &str,
        body: &'a RequestBodyOrRef,
    ) -> Result<Option<RequestBodyDescriptor>, ResolveError> {
        let body: &'a RequestBody = match body {
            RequestBodyOrRef::RequestBody(b) => b,
            RequestBodyOrRef::Ref { ref_path } => self.index.request_body(ref_path)?,
        };
        let Some((content_type, media)) = preferred_media_type(&body.content) else {
            return Ok(None);
        };
        let body_location = format!("{location}/requestBody");
        let inline_name = format!("{owner}Request");
        let usage = Usage {
            location: &body_location,
            required: Some(body.required),
            inline_name: &inline_name,
            enum_name: &inline_name,
        };
        let body_type = match &media.schema {
            Some(schema) => self.resolve(schema, usage)?,
            None => self.any(),
        };
        Ok(Some(RequestBodyDescriptor {
            body_type,
            required: body.required,
            content_type: content_type.clone(),
        }))
    }

    fn build_response(
        &mut self,
        owner: &str,
        location: &str,
        op: &'a Operation,
    ) -> Result<ResponseType, ResolveError> {
        let Some((status, response)) = success_response(&op.responses) else {
            return Ok(ResponseType::NoContent);
        };
        let response: &'a Response = match response {
            ResponseOrRef::Response(r) => r,
            ResponseOrRef::Ref { ref_path } => self.index.response(ref_path)?,
        };
        let schema = preferred_media_type(&response.content).and_then(|(_, m)| m.schema.as_ref());
        let Some(schema) = schema else {
            return Ok(ResponseType::NoContent);
        };

        let response_location = format!("{location}/responses/{status}");
        let inline_name = format!("{owner}Response");
        let usage = Usage::standalone(&response_location, &inline_name);
        Ok(ResponseType::Content(self.resolve(schema, usage)?))
    }
}

/// First `2xx` in declaration order, then `2XX`, then `default`.
pub fn success_response(
    responses: &IndexMap<String, ResponseOrRef>,
) -> Option<(&str, &ResponseOrRef)> {
    let explicit = responses.iter().find(|(status, _)| {
        status.len() == 3 && status.starts_with('2') && status.chars().all(|c| c.is_ascii_digit())
    });
    explicit
        .or_else(|| responses.get_key_value("2XX"))
        .or_else(|| responses.get_key_value("default"))
        .map(|(status, response)| (status.as_str(), response))
}

fn ir_location(location: contract::ParameterLocation) -> ParameterLocation {
    match location {
        contract::ParameterLocation::Path => ParameterLocation::Path,
        contract::ParameterLocation::Query => ParameterLocation::Query,
        contract::ParameterLocation::Header => ParameterLocation::Header,
        contract::ParameterLocation::Cookie => ParameterLocation::Cookie,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureFlags;
    use crate::parse::{self, spec::OpenApiSpec};
    use crate::profile::TargetProfile;
    use crate::transform::schema_index::SchemaIndex;

    const SPEC: &str = r##"
openapi: 3.0.3
info: {title: Ops, version: "1"}
paths:
  /users/{userId}/posts:
    parameters:
      - {name: userId, in: path, schema: {type: string}}
      - {name: page, in: query, description: path level, schema: {type: integer}}
    get:
      parameters:
        - {name: page, in: query, required: true, schema: {type: integer, format: int64}}
        - {$ref: "#/components/parameters/Trace"}
        - {name: page, in: header, schema: {type: string}}
      responses:
        default:
          description: error
          content:
            application/json:
              schema: {type: string}
        2XX:
          $ref: "#/components/responses/PostList"
    post:
      operationId: createPost
      requestBody:
        $ref: "#/components/requestBodies/NewPost"
      responses:
        "202": {description: accepted}
        "200":
          description: ok
          content:
            application/json:
              schema: {type: integer}
components:
  parameters:
    Trace: {name: X-Trace-Id, in: header, schema: {type: string, format: uuid}}
  requestBodies:
    NewPost:
      required: true
      content:
        text/plain:
          schema: {type: string}
  responses:
    PostList:
      description: posts
      content:
        application/json:
          schema:
            type: array
            items: {type: string}
"##;

    fn build(spec: &OpenApiSpec, path: &str, method: HttpMethod) -> OperationDescriptor {
        let profile = TargetProfile::builtin("jaxrs_spec").unwrap().unwrap();
        let flags = FeatureFlags {
            interface_only: true,
            ..Default::default()
        };
        let index = SchemaIndex::new(spec);
        let mut resolver = Resolver::new(&index, &profile, &flags);
        let (path, item) = spec.paths.get_key_value(path).unwrap();
        let (_, op) = item
            .operations()
            .into_iter()
            .find(|(m, _)| *m == method)
            .unwrap();
        resolver.build_operation(path, item, method, op).unwrap()
    }

    #[test]
    fn operation_parameters_override_path_level() {
        let spec = parse::from_yaml(SPEC).unwrap();
        let op = build(&spec, "/users/{userId}/posts", HttpMethod::Get);
        assert_eq!(op.operation_id, "listUsersPosts");

        let params: Vec<(&str, ParameterLocation, &str, bool)> = op
            .parameters
            .iter()
            .map(|p| (p.identifier.as_str(), p.location, p.param_type.name.as_str(), p.required))
            .collect();
        assert_eq!(
            params,
            [
                ("userId", ParameterLocation::Path, "String", true),
                ("page", ParameterLocation::Query, "long", true),
                ("xTraceId", ParameterLocation::Header, "UUID", false),
                ("page2", ParameterLocation::Header, "String", false),
            ]
        );
        assert_eq!(op.parameters[1].description, None);
    }

    #[test]
    fn success_range_beats_default() {
        let spec = parse::from_yaml(SPEC).unwrap();
        let op = build(&spec, "/users/{userId}/posts", HttpMethod::Get);
        assert_eq!(op.variant.return_type.name, "List<String>");
        assert_eq!(op.group, "users");
    }

    #[test]
    fn first_explicit_success_status_wins() {
        let spec = parse::from_yaml(SPEC).unwrap();
        let op = build(&spec, "/users/{userId}/posts", HttpMethod::Post);
        assert_eq!(op.response, ResponseType::NoContent);
        assert_eq!(op.variant.return_type.name, "void");

        let body = op.request_body.unwrap();
        assert!(body.required);
        assert_eq!(body.content_type, "text/plain");
        assert_eq!(body.body_type.name, "String");
    }
}
