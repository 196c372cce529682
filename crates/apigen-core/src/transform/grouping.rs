use indexmap::IndexMap;

use crate::ir::{ApiGroup, OperationDescriptor};
use crate::profile::TargetProfile;

use super::name_normalizer::normalize_name;
use super::operation_builder::DEFAULT_GROUP;

/// Assign an operation to an API group; returns `(group, base_name)`.
///
/// Tag mode takes the first tag, falling back to `group_key`. Path mode uses
/// the first path segment and ignores tags and `group_key` entirely.
pub fn assign(group_key: &str, path: &str, tags: &[String], use_tags: bool) -> (String, String) {
    let group = if use_tags {
        tags.first().map_or(group_key, String::as_str).to_string()
    } else {
        extract_path_prefix(path)
    };
    (group.clone(), group)
}

/// First path segment, or `default` for the root path and paths that start
/// with a placeholder.
/// e.g. "/pets/{petId}" → "pets", "/{id}" → "default"
fn extract_path_prefix(path: &str) -> String {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let first = trimmed.split('/').next().unwrap_or_default();
    if first.is_empty() || first.starts_with('{') {
        DEFAULT_GROUP.to_string()
    } else {
        first.to_string()
    }
}

/// Bucket operations by group in first-appearance order; contract order is
/// kept inside each group.
pub fn group_operations(
    operations: Vec<OperationDescriptor>,
    profile: &TargetProfile,
) -> Vec<ApiGroup> {
    let mut groups: IndexMap<String, Vec<OperationDescriptor>> = IndexMap::new();
    for op in operations {
        groups.entry(op.group.clone()).or_default().push(op);
    }

    groups
        .into_iter()
        .map(|(name, operations)| ApiGroup {
            api_name: profile.api_name(&normalize_name(&name)),
            name,
            operations,
            imports: Vec::new(),
        })
        .collect()
}
