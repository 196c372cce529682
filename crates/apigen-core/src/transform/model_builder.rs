//! Named models from component schemas and promoted inline objects.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::ir::{Constraints, FieldDescriptor, ModelDescriptor, ModelShape, NormalizedName};
use crate::parse::schema::{Discriminator, Schema, SchemaOrRef, SchemaType};

use super::name_normalizer::{NameAllocator, normalize_name};
use super::schema_index::Visited;
use super::type_resolver::{Resolver, Usage};

/// What an all-of branch contributes when merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BranchKind {
    Object,
    Value(SchemaType),
}

impl BranchKind {
    fn describe(self) -> &'static str {
        match self {
            BranchKind::Object => "object",
            BranchKind::Value(t) => t.as_str(),
        }
    }
}

/// Accumulated result of flattening all-of branches.
#[derive(Default)]
struct Merged<'a> {
    kind: Option<BranchKind>,
    properties: IndexMap<&'a str, &'a SchemaOrRef>,
    required: HashSet<&'a str>,
    value_branch: Option<&'a Schema>,
    discriminator: Option<&'a Discriminator>,
}

impl<'a> Resolver<'a> {
    /// Build the model for a named component schema.
    pub fn build_component(
        &mut self,
        name: &'a str,
        schema: &'a SchemaOrRef,
    ) -> Result<ModelDescriptor, ResolveError> {
        let location = format!("#/components/schemas/{name}");
        let model_name = normalize_name(name);
        match schema {
            SchemaOrRef::Schema(s) => self.build_model(model_name, s, &location),
            SchemaOrRef::Ref { .. } => {
                let usage = Usage::standalone(&location, &model_name.pascal_case);
                let target = self.resolve(schema, usage)?;
                Ok(new_model(model_name, None, ModelShape::Alias(target)))
            }
        }
    }

    /// Promote an inline object to a named model; returns the allocated name.
    pub(crate) fn promote(
        &mut self,
        base: &str,
        schema: &'a Schema,
        location: &str,
    ) -> Result<String, ResolveError> {
        let name = self.model_names.claim(base);
        log::debug!("{location}: promoting inline schema to model {name}");
        let model = self.build_model(normalize_name(&name), schema, location)?;
        self.promoted.push(model);
        Ok(name)
    }

    fn build_model(
        &mut self,
        name: NormalizedName,
        schema: &'a Schema,
        location: &str,
    ) -> Result<ModelDescriptor, ResolveError> {
        let owner = name.pascal_case.clone();
        let mut model = new_model(name, schema.description.clone(), ModelShape::Object);

        if !schema.enum_values.is_empty() {
            model.shape = ModelShape::Enum(self.enum_type(schema, location)?);
        } else if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
            let union = self.union_type(schema, Usage::standalone(location, &owner))?;
            model.discriminator = union.discriminator.clone();
            model.shape = ModelShape::Union(union);
        } else if !schema.all_of.is_empty() {
            self.compose(&mut model, &owner, schema, location)?;
        } else if schema.has_properties() {
            let properties = schema
                .properties
                .iter()
                .map(|(n, p)| (n.as_str(), p, schema.is_required(n)));
            model.fields = self.build_fields(&owner, location, properties)?;
            if let Some(d) = &schema.discriminator {
                model.discriminator = Some(self.discriminator(d, &[])?);
            }
        } else {
            let target = self.resolve_inline(schema, Usage::standalone(location, &owner))?;
            model.shape = ModelShape::Alias(target);
        }
        Ok(model)
    }

    /// All-of: alias for a lone branch, inheritance for one parent reference
    /// plus additive property sets, otherwise a flattened merge.
    fn compose(
        &mut self,
        model: &mut ModelDescriptor,
        owner: &str,
        schema: &'a Schema,
        location: &str,
    ) -> Result<(), ResolveError> {
        let branches = &schema.all_of;
        if branches.len() == 1 && schema.properties.is_empty() {
            let target = self.resolve(&branches[0], Usage::standalone(location, owner))?;
            model.shape = ModelShape::Alias(target);
            return Ok(());
        }

        let origin = model.name.original.clone();
        if let Some(parent) = self.inheritance_parent(&origin, schema, location)? {
            // a later declaration of the same property replaces the earlier one in place
            let mut properties: IndexMap<&str, (&SchemaOrRef, bool)> = IndexMap::new();
            let own = std::iter::once(schema);
            for set in branches.iter().filter_map(SchemaOrRef::as_schema).chain(own) {
                for (n, p) in &set.properties {
                    let required = set.is_required(n)
                        || properties.get(n.as_str()).is_some_and(|&(_, r)| r);
                    properties.insert(n.as_str(), (p, required));
                }
            }
            log::debug!("{location}: {owner} extends {parent}");
            model.parent = Some(parent);
            let properties = properties.into_iter().map(|(n, (p, r))| (n, p, r));
            model.fields = self.build_fields(owner, location, properties)?;
            if let Some(d) = &schema.discriminator {
                model.discriminator = Some(self.discriminator(d, &[])?);
            }
            return Ok(());
        }

        let mut merged = Merged::default();
        let mut visited = Visited::default();
        for branch in branches {
            self.merge_branch(branch, location, &mut visited, &mut merged)?;
        }
        merge_schema(schema, location, &mut merged)?;

        if let Some(BranchKind::Value(_)) = merged.kind {
            if let Some(value) = merged.value_branch {
                let target = self.resolve_inline(value, Usage::standalone(location, owner))?;
                model.shape = ModelShape::Alias(target);
            }
            return Ok(());
        }

        let Merged {
            properties,
            required,
            discriminator,
            ..
        } = merged;
        let properties = properties
            .into_iter()
            .map(|(n, p)| (n, p, required.contains(n)));
        model.fields = self.build_fields(owner, location, properties)?;
        if let Some(d) = discriminator {
            model.discriminator = Some(self.discriminator(d, &[])?);
        }
        Ok(())
    }

    /// The parent model name when the all-of is one object reference plus
    /// inline property sets. A parent chain leading back to `origin` is fatal.
    fn inheritance_parent(
        &self,
        origin: &str,
        schema: &'a Schema,
        location: &str,
    ) -> Result<Option<String>, ResolveError> {
        let Some(parent_ref) = extension_ref(schema) else {
            return Ok(None);
        };
        let (name, parent) = self.index.schema_ref(parent_ref)?;
        let object_parent = parent
            .as_schema()
            .is_some_and(|p| p.has_properties() || !p.all_of.is_empty());
        if !object_parent {
            return Ok(None);
        }

        let mut visited = Visited::default();
        visited.enter(origin);
        let (mut ancestor, mut ancestor_schema) = (name, parent);
        loop {
            if !visited.enter(ancestor) {
                return Err(ResolveError::CircularAlias {
                    location: location.to_string(),
                    chain: visited.describe(ancestor),
                });
            }
            let Some(next) = ancestor_schema.as_schema().and_then(extension_ref) else {
                break;
            };
            (ancestor, ancestor_schema) = self.index.schema_ref(next)?;
        }
        Ok(Some(normalize_name(name).pascal_case))
    }

    fn merge_branch(
        &self,
        branch: &'a SchemaOrRef,
        location: &str,
        visited: &mut Visited,
        merged: &mut Merged<'a>,
    ) -> Result<(), ResolveError> {
        match branch {
            SchemaOrRef::Ref { ref_path } => {
                let (name, target) = self.index.schema_ref(ref_path)?;
                if !visited.enter(name) {
                    return Err(ResolveError::CircularAlias {
                        location: location.to_string(),
                        chain: visited.describe(name),
                    });
                }
                self.merge_branch(target, location, visited, merged)?;
                visited.leave();
                Ok(())
            }
            SchemaOrRef::Schema(s) => {
                for nested in &s.all_of {
                    self.merge_branch(nested, location, visited, merged)?;
                }
                merge_schema(s, location, merged)
            }
        }
    }

    pub(crate) fn build_fields<I>(
        &mut self,
        owner: &str,
        location: &str,
        properties: I,
    ) -> Result<Vec<FieldDescriptor>, ResolveError>
    where
        I: IntoIterator<Item = (&'a str, &'a SchemaOrRef, bool)>,
    {
        let mut identifiers = NameAllocator::new();
        let mut fields = Vec::new();
        for (name, property, required) in properties {
            let field_name = normalize_name(name);
            let field_location = format!("{location}/properties/{name}");
            let inline_name = format!("{owner}{}", field_name.pascal_case);
            let enum_name = format!("{}Enum", field_name.pascal_case);
            let usage = Usage {
                location: &field_location,
                required: Some(required),
                inline_name: &inline_name,
                enum_name: &enum_name,
            };
            let field_type = self.resolve(property, usage)?;
            let target = self.index.target_schema(property)?;
            let identifier = self
                .profile
                .identifier(&field_name, self.profile.naming.field_case);

            fields.push(FieldDescriptor {
                original_name: name.to_string(),
                identifier: identifiers.claim(&identifier),
                owner: owner.to_string(),
                field_type,
                required,
                nullable: target.nullable_marker() == Some(true),
                read_only: target.read_only.unwrap_or(false),
                write_only: target.write_only.unwrap_or(false),
                description: property.as_schema().and_then(|s| s.description.clone()),
                constraints: constraints_of(target),
            });
        }
        Ok(fields)
    }
}

/// Fold one inline all-of branch into the accumulator.
fn merge_schema<'a>(
    schema: &'a Schema,
    location: &str,
    merged: &mut Merged<'a>,
) -> Result<(), ResolveError> {
    if !schema.one_of.is_empty() || !schema.any_of.is_empty() || !schema.enum_values.is_empty() {
        return Err(ResolveError::MalformedSchema {
            location: location.to_string(),
            reason: "allOf branch with oneOf, anyOf or enum cannot be merged".to_string(),
        });
    }

    let kind = match schema.primary_type() {
        Some(SchemaType::Object) => Some(BranchKind::Object),
        Some(t) => Some(BranchKind::Value(t)),
        None if !schema.properties.is_empty() => Some(BranchKind::Object),
        None => None,
    };
    if let Some(kind) = kind {
        match merged.kind {
            Some(seen) if seen != kind => {
                return Err(ResolveError::MalformedSchema {
                    location: location.to_string(),
                    reason: format!(
                        "allOf mixes {} and {} branches",
                        seen.describe(),
                        kind.describe()
                    ),
                });
            }
            _ => merged.kind = Some(kind),
        }
        if matches!(kind, BranchKind::Value(_)) && merged.value_branch.is_none() {
            merged.value_branch = Some(schema);
        }
    }

    for (name, property) in &schema.properties {
        merged.properties.insert(name.as_str(), property);
    }
    merged
        .required
        .extend(schema.required.iter().map(String::as_str));
    if merged.discriminator.is_none() {
        merged.discriminator = schema.discriminator.as_ref();
    }
    Ok(())
}

/// An inline branch that only adds properties.
/// The single `$ref` of an all-of whose other branches only add properties.
fn extension_ref(schema: &Schema) -> Option<&str> {
    let mut refs = schema.all_of.iter().filter_map(SchemaOrRef::ref_path);
    let (Some(parent_ref), None) = (refs.next(), refs.next()) else {
        return None;
    };
    schema
        .all_of
        .iter()
        .filter_map(SchemaOrRef::as_schema)
        .all(is_property_set)
        .then_some(parent_ref)
}

fn is_property_set(schema: &Schema) -> bool {
    !schema.is_composed()
        && schema.enum_values.is_empty()
        && matches!(schema.primary_type(), None | Some(SchemaType::Object))
}

fn new_model(name: NormalizedName, description: Option<String>, shape: ModelShape) -> ModelDescriptor {
    ModelDescriptor {
        name,
        description,
        shape,
        fields: Vec::new(),
        parent: None,
        discriminator: None,
        imports: Vec::new(),
    }
}

pub(crate) fn constraints_of(schema: &Schema) -> Constraints {
    Constraints {
        minimum: schema.minimum,
        maximum: schema.maximum,
        exclusive_minimum: schema.exclusive_minimum,
        exclusive_maximum: schema.exclusive_maximum,
        min_length: schema.min_length,
        max_length: schema.max_length,
        pattern: schema.pattern.clone(),
        min_items: schema.min_items,
        max_items: schema.max_items,
        unique_items: schema.unique_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureFlags;
    use crate::ir::{Nullability, TypeKind, UnknownEnumPolicy};
    use crate::parse;
    use crate::parse::spec::OpenApiSpec;
    use crate::profile::TargetProfile;
    use crate::transform::schema_index::SchemaIndex;

    const SPEC: &str = r##"
openapi: 3.0.3
info: {title: t, version: "1"}
components:
  schemas:
    Pet:
      type: object
      required: [name]
      properties:
        id: {type: integer, format: int64}
        name: {type: string, nullable: true}
        class: {type: string}
        pet-name: {type: string}
        pet_name: {type: string}
        category:
          type: object
          properties:
            label: {type: string}
        tags:
          type: array
          items: {type: string}
    Dog:
      allOf:
        - $ref: "#/components/schemas/Pet"
        - type: object
          properties:
            bark: {type: boolean}
    Base:
      type: object
      required: [id]
      properties:
        id: {type: string}
        note: {type: string}
    Extra:
      type: object
      properties:
        note: {type: integer}
        size: {type: integer}
    Merged:
      allOf:
        - $ref: "#/components/schemas/Base"
        - $ref: "#/components/schemas/Extra"
    Broken:
      allOf:
        - type: string
        - type: object
          properties:
            x: {type: string}
    Alias:
      allOf:
        - $ref: "#/components/schemas/Pet"
    Color:
      type: string
      enum: [red, green, blue]
    Node:
      type: object
      properties:
        next: {$ref: "#/components/schemas/Node"}
"##;

    struct Fixture {
        spec: OpenApiSpec,
        profile: TargetProfile,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                spec: parse::from_yaml(SPEC).unwrap(),
                profile: TargetProfile::builtin("jaxrs_spec").unwrap().unwrap(),
            }
        }

        fn build(&self, name: &str, flags: &FeatureFlags) -> Result<(ModelDescriptor, Vec<ModelDescriptor>), ResolveError> {
            let index = SchemaIndex::new(&self.spec);
            let mut resolver = Resolver::new(&index, &self.profile, flags);
            let (key, schema) = self.spec.components.schemas.get_key_value(name).unwrap();
            let model = resolver.build_component(key, schema)?;
            Ok((model, resolver.into_promoted()))
        }
    }

    #[test]
    fn object_fields_keep_order_and_flags() {
        let fx = Fixture::new();
        let (pet, promoted) = fx.build("Pet", &FeatureFlags::default()).unwrap();

        let names: Vec<&str> = pet.fields.iter().map(|f| f.identifier.as_str()).collect();
        assert_eq!(names, ["id", "name", "_class", "petName", "petName2", "category", "tags"]);

        let name = pet.field("name").unwrap();
        assert!(name.required);
        assert!(name.nullable);
        assert_eq!(name.field_type.nullability, Nullability::Nullable);

        let id = pet.field("id").unwrap();
        assert!(!id.required);
        assert_eq!(id.field_type.name, "Long");

        assert_eq!(pet.field("category").unwrap().field_type.name, "PetCategory");
        assert_eq!(promoted.len(), 1);
        assert_eq!(promoted[0].name.pascal_case, "PetCategory");
        assert_eq!(promoted[0].fields[0].owner, "PetCategory");
    }

    #[test]
    fn single_parent_reference_is_inheritance() {
        let fx = Fixture::new();
        let (dog, _) = fx.build("Dog", &FeatureFlags::default()).unwrap();
        assert_eq!(dog.parent.as_deref(), Some("Pet"));
        assert_eq!(dog.fields.len(), 1);
        assert_eq!(dog.fields[0].original_name, "bark");
    }

    #[test]
    fn multiple_references_merge_with_later_override() {
        let fx = Fixture::new();
        let (merged, _) = fx.build("Merged", &FeatureFlags::default()).unwrap();
        assert!(merged.parent.is_none());
        let names: Vec<&str> = merged.fields.iter().map(|f| f.original_name.as_str()).collect();
        assert_eq!(names, ["id", "note", "size"]);
        assert_eq!(merged.field("note").unwrap().field_type.name, "Integer");
        assert!(merged.field("id").unwrap().required);
    }

    #[test]
    fn incompatible_branches_are_malformed() {
        let fx = Fixture::new();
        let err = fx.build("Broken", &FeatureFlags::default()).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedSchema { .. }));
    }

    #[test]
    fn single_branch_all_of_is_alias() {
        let fx = Fixture::new();
        let (alias, _) = fx.build("Alias", &FeatureFlags::default()).unwrap();
        match alias.shape {
            ModelShape::Alias(target) => assert_eq!(target.model_ref(), Some("Pet")),
            other => panic!("expected alias, got {other:?}"),
        }
    }

    #[test]
    fn enum_fallback_member_follows_flag() {
        let fx = Fixture::new();
        let (color, _) = fx.build("Color", &FeatureFlags::default()).unwrap();
        let ModelShape::Enum(e) = &color.shape else {
            panic!("expected enum");
        };
        assert_eq!(e.members.len(), 3);
        assert_eq!(e.unknown, UnknownEnumPolicy::Fail);

        let flags = FeatureFlags {
            enum_unknown_default_case: true,
            ..Default::default()
        };
        let (color, _) = fx.build("Color", &flags).unwrap();
        let ModelShape::Enum(e) = &color.shape else {
            panic!("expected enum");
        };
        assert_eq!(e.members.len(), 4);
        assert_eq!(e.unknown, UnknownEnumPolicy::Fallback);
        let last = e.members.last().unwrap();
        assert!(last.fallback);
        assert_eq!(last.identifier, "UNKNOWN_DEFAULT_OPEN_API");
    }

    #[test]
    fn self_reference_resolves_by_name() {
        let fx = Fixture::new();
        let (node, _) = fx.build("Node", &FeatureFlags::default()).unwrap();
        let next = &node.field("next").unwrap().field_type;
        assert_eq!(next.kind, TypeKind::Model("Node".to_string()));
    }
}
