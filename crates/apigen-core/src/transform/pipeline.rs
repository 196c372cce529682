use std::collections::HashMap;

use rayon::prelude::*;

use crate::config::FeatureFlags;
use crate::error::{ResolveError, TransformError};
use crate::ir::{
    ApiInfo, ApiServer, IntermediateModel, ModelDescriptor, ModelShape, OperationDescriptor,
    ResponseType,
};
use crate::parse::spec::OpenApiSpec;
use crate::profile::TargetProfile;

use super::grouping::group_operations;
use super::imports::{group_imports, model_imports};
use super::name_normalizer::{NameAllocator, normalize_name};
use super::schema_index::SchemaIndex;
use super::type_resolver::{Resolver, rename_mapping, rename_model_refs};

/// Transform a parsed contract into the renderer-ready model for one target.
///
/// Top-level schemas and operations are resolved on the rayon pool; results
/// are merged in contract order, so the output matches a sequential run.
pub fn generate(
    spec: &OpenApiSpec,
    profile: &TargetProfile,
    flags: &FeatureFlags,
) -> Result<IntermediateModel, TransformError> {
    let index = SchemaIndex::new(spec);

    // Phase 1: component schemas
    let schemas: Vec<_> = spec.components.schemas.iter().collect();
    let built_models = schemas
        .par_iter()
        .map(|&(name, schema)| {
            let mut resolver = Resolver::new(&index, profile, flags);
            let model = resolver.build_component(name, schema)?;
            Ok((model, resolver.into_promoted()))
        })
        .collect::<Result<Vec<_>, ResolveError>>()?;
    log::debug!("resolved {} component schemas", built_models.len());

    // Phase 2: operations
    let endpoints: Vec<_> = spec
        .paths
        .iter()
        .flat_map(|(path, item)| {
            item.operations()
                .into_iter()
                .map(move |(method, op)| (path.as_str(), item, method, op))
        })
        .collect();
    let built_operations = endpoints
        .par_iter()
        .map(|&(path, item, method, op)| {
            let mut resolver = Resolver::new(&index, profile, flags);
            let operation = resolver.build_operation(path, item, method, op)?;
            Ok((operation, resolver.into_promoted()))
        })
        .collect::<Result<Vec<_>, ResolveError>>()?;
    log::debug!("resolved {} operations", built_operations.len());

    // Phase 3: merge promoted inline models in contract order
    let mut registry = InlineRegistry::new(index.schema_names(), profile);
    let mut models = Vec::with_capacity(built_models.len());
    for (mut model, promoted) in built_models {
        let renames = registry.adopt(promoted);
        rename_in_model(&mut model, &renames, profile);
        models.push(model);
    }

    let mut operation_names = NameAllocator::new();
    let mut operations = Vec::with_capacity(built_operations.len());
    for (mut operation, promoted) in built_operations {
        let renames = registry.adopt(promoted);
        rename_in_operation(&mut operation, &renames, profile);
        let unique = operation_names.claim(&operation.name.camel_case);
        if unique != operation.name.camel_case {
            log::warn!(
                "operation {} clashes with an earlier method name, renamed to {unique}",
                operation.name.original
            );
            operation.name = normalize_name(&unique);
        }
        operations.push(operation);
    }
    models.extend(registry.into_models());

    // Phase 4: group operations and compute imports
    let mut groups = group_operations(operations, profile);
    for model in &mut models {
        model.imports = model_imports(model, profile);
    }
    for group in &mut groups {
        group.imports = group_imports(group, profile);
    }

    log::info!(
        "{}: {} models, {} api groups for target {}",
        spec.info.title,
        models.len(),
        groups.len(),
        profile.id
    );

    Ok(IntermediateModel {
        info: ApiInfo {
            title: spec.info.title.clone(),
            description: spec.info.description.clone(),
            version: spec.info.version.clone(),
        },
        servers: spec
            .servers
            .iter()
            .map(|s| ApiServer {
                url: s.url.clone(),
                description: s.description.clone(),
            })
            .collect(),
        target: profile.id.clone(),
        flags: flags.clone(),
        models,
        groups,
    })
}

/// Inline models collected from every worker, unique by name.
struct InlineRegistry<'p> {
    names: NameAllocator,
    by_name: HashMap<String, usize>,
    models: Vec<ModelDescriptor>,
    profile: &'p TargetProfile,
}

impl<'p> InlineRegistry<'p> {
    fn new<'n>(component_names: impl Iterator<Item = &'n str>, profile: &'p TargetProfile) -> Self {
        let mut names = NameAllocator::new();
        names.reserve(component_names.map(|n| normalize_name(n).pascal_case));
        Self {
            names,
            by_name: HashMap::new(),
            models: Vec::new(),
            profile,
        }
    }

    /// Take one worker's promoted models. Identical duplicates are shared;
    /// a different model under a taken name is renamed. Returns the complete
    /// rename map the worker's own descriptor must apply in one pass.
    fn adopt(&mut self, promoted: Vec<ModelDescriptor>) -> HashMap<String, String> {
        // fresh names must not land on a name the same worker still holds
        self.names.reserve(
            promoted
                .iter()
                .map(|m| m.name.pascal_case.clone())
                .filter(|name| !self.by_name.contains_key(name)),
        );

        let mut renames = HashMap::new();
        let mut adopted = Vec::new();
        for model in promoted {
            let name = model.name.pascal_case.clone();
            let Some(&existing) = self.by_name.get(&name) else {
                adopted.push(self.insert(name, model));
                continue;
            };
            let mut candidate = model.clone();
            rename_in_model(&mut candidate, &renames, self.profile);
            if self.models[existing] == candidate {
                continue;
            }
            let fresh = self.names.claim(&name);
            log::debug!("inline model {name} renamed to {fresh}");
            let mut model = model;
            model.name = normalize_name(&fresh);
            for field in &mut model.fields {
                field.owner = fresh.clone();
            }
            renames.insert(name, fresh.clone());
            adopted.push(self.insert(fresh, model));
        }

        for i in adopted {
            rename_in_model(&mut self.models[i], &renames, self.profile);
        }
        renames
    }

    fn insert(&mut self, name: String, model: ModelDescriptor) -> usize {
        let i = self.models.len();
        self.by_name.insert(name, i);
        self.models.push(model);
        i
    }

    fn into_models(self) -> Vec<ModelDescriptor> {
        self.models
    }
}

fn rename_in_model(
    model: &mut ModelDescriptor,
    renames: &HashMap<String, String>,
    profile: &TargetProfile,
) {
    if renames.is_empty() {
        return;
    }
    for field in &mut model.fields {
        rename_model_refs(&mut field.field_type, renames, profile);
    }
    match &mut model.shape {
        ModelShape::Alias(target) => rename_model_refs(target, renames, profile),
        ModelShape::Union(union) => {
            for member in &mut union.members {
                rename_model_refs(member, renames, profile);
            }
            if let Some(discriminator) = &mut union.discriminator {
                rename_mapping(discriminator, renames);
            }
        }
        ModelShape::Object | ModelShape::Enum(_) => {}
    }
    if let Some(discriminator) = &mut model.discriminator {
        rename_mapping(discriminator, renames);
    }
    if let Some(to) = model.parent.as_deref().and_then(|p| renames.get(p)) {
        model.parent = Some(to.clone());
    }
}

fn rename_in_operation(
    operation: &mut OperationDescriptor,
    renames: &HashMap<String, String>,
    profile: &TargetProfile,
) {
    if renames.is_empty() {
        return;
    }
    for param in &mut operation.parameters {
        rename_model_refs(&mut param.param_type, renames, profile);
    }
    if let Some(body) = &mut operation.request_body {
        rename_model_refs(&mut body.body_type, renames, profile);
    }
    if let ResponseType::Content(ty) = &mut operation.response {
        rename_model_refs(ty, renames, profile);
    }
    rename_model_refs(&mut operation.variant.return_type, renames, profile);
}
