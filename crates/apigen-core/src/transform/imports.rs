use std::collections::BTreeSet;

use crate::ir::{ApiGroup, ModelDescriptor, ResolvedType, TypeKind};
use crate::profile::TargetProfile;

/// Which file the imports are computed for.
#[derive(Debug, Clone, Copy)]
pub enum ImportScope<'s> {
    /// A model file; the model never imports itself.
    Model(&'s str),
    /// An API file.
    Api,
}

/// Deduplicated imports for a set of types, sorted lexically.
pub fn collect_imports<'t, I>(types: I, scope: ImportScope<'_>, profile: &TargetProfile) -> Vec<String>
where
    I: IntoIterator<Item = &'t ResolvedType>,
{
    let mut imports = BTreeSet::new();
    for ty in types {
        visit(ty, scope, profile, &mut imports);
    }
    imports.into_iter().collect()
}

pub fn model_imports(model: &ModelDescriptor, profile: &TargetProfile) -> Vec<String> {
    let scope = ImportScope::Model(&model.name.pascal_case);
    let mut imports = collect_imports(model.referenced_types(), scope, profile);
    if let Some(parent) = &model.parent {
        if let Some(import) = model_import(parent, scope, profile) {
            imports.push(import);
            imports.sort();
            imports.dedup();
        }
    }
    imports
}

pub fn group_imports(group: &ApiGroup, profile: &TargetProfile) -> Vec<String> {
    let types = group.operations.iter().flat_map(|op| op.referenced_types());
    collect_imports(types, ImportScope::Api, profile)
}

fn visit(ty: &ResolvedType, scope: ImportScope<'_>, profile: &TargetProfile, out: &mut BTreeSet<String>) {
    if !ty.target.primitive {
        if let Some(import) = &ty.target.import {
            out.insert(import.clone());
        }
    }
    if let Some(default) = &ty.default_value {
        out.extend(default.imports.iter().cloned());
    }

    match &ty.kind {
        TypeKind::Model(name) => out.extend(model_import(name, scope, profile)),
        TypeKind::Array(inner) | TypeKind::Map(inner) | TypeKind::Async(inner) => {
            visit(inner, scope, profile, out)
        }
        TypeKind::Union(union) => {
            for member in &union.members {
                visit(member, scope, profile, out);
            }
        }
        TypeKind::Primitive
        | TypeKind::Any
        | TypeKind::Void
        | TypeKind::Response
        | TypeKind::Enum(_) => {}
    }
}

fn model_import(name: &str, scope: ImportScope<'_>, profile: &TargetProfile) -> Option<String> {
    match scope {
        ImportScope::Model(own) if own == name => None,
        ImportScope::Model(_) if profile.models_share_namespace => None,
        _ => profile.model_import(name),
    }
}
