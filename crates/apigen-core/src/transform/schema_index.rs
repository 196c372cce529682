//! Name-keyed view over the contract's reusable components.
//!
//! Nothing is inlined eagerly: every `$ref` is looked up on demand, and
//! recursion through named schemas is guarded by a [`Visited`] chain.

use crate::error::ResolveError;
use crate::parse::operation::{
    Parameter, ParameterOrRef, RequestBody, RequestBodyOrRef, Response, ResponseOrRef,
};
use crate::parse::schema::{Schema, SchemaOrRef};
use crate::parse::spec::{Components, OpenApiSpec};

pub const SCHEMAS: &str = "schemas";
pub const PARAMETERS: &str = "parameters";
pub const REQUEST_BODIES: &str = "requestBodies";
pub const RESPONSES: &str = "responses";

/// Extract the component name from `#/components/<section>/<name>`.
pub fn parse_ref_name<'r>(ref_path: &'r str, section: &str) -> Result<&'r str, ResolveError> {
    let invalid = || ResolveError::InvalidRefFormat(ref_path.to_string());
    let rest = ref_path.strip_prefix("#/components/").ok_or_else(invalid)?;
    let name = rest
        .strip_prefix(section)
        .and_then(|r| r.strip_prefix('/'))
        .ok_or_else(invalid)?;
    if name.is_empty() || name.contains('/') {
        return Err(invalid());
    }
    Ok(name)
}

/// The chain of named schemas currently being expanded.
#[derive(Debug, Default, Clone)]
pub struct Visited {
    chain: Vec<String>,
}

impl Visited {
    /// Push `name`; `false` when it is already on the chain.
    pub fn enter(&mut self, name: &str) -> bool {
        if self.chain.iter().any(|n| n == name) {
            return false;
        }
        self.chain.push(name.to_string());
        true
    }

    pub fn leave(&mut self) {
        self.chain.pop();
    }

    /// Render the chain closed by `name`, e.g. `A -> B -> A`.
    pub fn describe(&self, name: &str) -> String {
        let mut parts: Vec<&str> = self.chain.iter().map(String::as_str).collect();
        parts.push(name);
        parts.join(" -> ")
    }
}

pub struct SchemaIndex<'a> {
    components: &'a Components,
}

impl<'a> SchemaIndex<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            components: &spec.components,
        }
    }

    pub fn schema_names(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.components.schemas.keys().map(String::as_str)
    }

    pub fn schema(&self, name: &str) -> Result<&'a SchemaOrRef, ResolveError> {
        self.components
            .schemas
            .get(name)
            .ok_or_else(|| ResolveError::RefTargetNotFound(format!("#/components/schemas/{name}")))
    }

    /// Follow a `$ref` to its named schema.
    pub fn schema_ref(&self, ref_path: &'a str) -> Result<(&'a str, &'a SchemaOrRef), ResolveError> {
        let name = parse_ref_name(ref_path, SCHEMAS)?;
        Ok((name, self.schema(name)?))
    }

    /// Follow ref-to-ref chains down to an inline schema.
    pub fn target_schema(&self, schema: &'a SchemaOrRef) -> Result<&'a Schema, ResolveError> {
        let mut visited = Visited::default();
        let mut current = schema;
        loop {
            match current {
                SchemaOrRef::Schema(s) => return Ok(s),
                SchemaOrRef::Ref { ref_path } => {
                    let (name, next) = self.schema_ref(ref_path)?;
                    if !visited.enter(name) {
                        return Err(ResolveError::CircularAlias {
                            location: ref_path.clone(),
                            chain: visited.describe(name),
                        });
                    }
                    current = next;
                }
            }
        }
    }

    /// Whether references to `name` stay references (objects, enums,
    /// compositions) instead of being followed to the aliased type.
    pub fn is_model(&self, schema: &'a SchemaOrRef) -> bool {
        match schema.as_schema() {
            Some(s) => s.has_properties() || s.is_composed() || !s.enum_values.is_empty(),
            None => false,
        }
    }

    pub fn parameter(&self, ref_path: &'a str) -> Result<&'a Parameter, ResolveError> {
        let mut visited = Visited::default();
        let mut path = ref_path;
        loop {
            let name = parse_ref_name(path, PARAMETERS)?;
            if !visited.enter(name) {
                return Err(cycle(ref_path, &visited, name));
            }
            match self.components.parameters.get(name) {
                Some(ParameterOrRef::Parameter(p)) => return Ok(p),
                Some(ParameterOrRef::Ref { ref_path }) => path = ref_path.as_str(),
                None => return Err(ResolveError::RefTargetNotFound(path.to_string())),
            }
        }
    }

    pub fn request_body(&self, ref_path: &'a str) -> Result<&'a RequestBody, ResolveError> {
        let mut visited = Visited::default();
        let mut path = ref_path;
        loop {
            let name = parse_ref_name(path, REQUEST_BODIES)?;
            if !visited.enter(name) {
                return Err(cycle(ref_path, &visited, name));
            }
            match self.components.request_bodies.get(name) {
                Some(RequestBodyOrRef::RequestBody(b)) => return Ok(b),
                Some(RequestBodyOrRef::Ref { ref_path }) => path = ref_path.as_str(),
                None => return Err(ResolveError::RefTargetNotFound(path.to_string())),
            }
        }
    }

    pub fn response(&self, ref_path: &'a str) -> Result<&'a Response, ResolveError> {
        let mut visited = Visited::default();
        let mut path = ref_path;
        loop {
            let name = parse_ref_name(path, RESPONSES)?;
            if !visited.enter(name) {
                return Err(cycle(ref_path, &visited, name));
            }
            match self.components.responses.get(name) {
                Some(ResponseOrRef::Response(r)) => return Ok(r),
                Some(ResponseOrRef::Ref { ref_path }) => path = ref_path.as_str(),
                None => return Err(ResolveError::RefTargetNotFound(path.to_string())),
            }
        }
    }
}

fn cycle(location: &str, visited: &Visited, name: &str) -> ResolveError {
    ResolveError::CircularAlias {
        location: location.to_string(),
        chain: visited.describe(name),
    }
}
