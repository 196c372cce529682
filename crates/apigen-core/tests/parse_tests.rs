use apigen_core::parse::{self, operation::ParameterOrRef, schema::SchemaOrRef};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");
const COMPOSITION: &str = include_str!("fixtures/composition.yaml");

#[test]
fn parse_petstore_yaml() {
    let spec = parse::from_yaml(PETSTORE).expect("should parse petstore.yaml");
    assert_eq!(spec.openapi, "3.0.3");
    assert_eq!(spec.info.title, "Petstore");
    assert_eq!(spec.servers.len(), 1);
    assert_eq!(spec.paths.len(), 3);

    let pet_path = &spec.paths["/pets/{petId}"];
    assert_eq!(pet_path.parameters.len(), 1);
    assert!(matches!(
        &pet_path.parameters[0],
        ParameterOrRef::Parameter(p) if p.name == "petId"
    ));
    let ops: Vec<_> = pet_path
        .operations()
        .into_iter()
        .map(|(method, op)| (method.as_str(), op.operation_id.clone().unwrap()))
        .collect();
    assert_eq!(
        ops,
        [
            ("GET", "getPetById".to_string()),
            ("DELETE", "deletePet".to_string())
        ]
    );

    let pet = spec.components.schemas["Pet"].as_schema().unwrap();
    let names: Vec<&str> = pet.properties.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        ["id", "name", "category", "photoUrls", "tags", "status", "color", "birthday"]
    );
    assert!(pet.is_required("photoUrls"));
    assert!(!pet.is_required("tags"));

    let birthday = pet.properties["birthday"].as_schema().unwrap();
    assert_eq!(birthday.nullable_marker(), Some(true));
}

#[test]
fn parse_composition_keeps_refs_unresolved() {
    let spec = parse::from_yaml(COMPOSITION).unwrap();
    let dog = spec.components.schemas["Dog"].as_schema().unwrap();
    assert_eq!(dog.all_of.len(), 2);
    assert_eq!(
        dog.all_of[0].ref_path(),
        Some("#/components/schemas/Animal")
    );

    let shape = spec.components.schemas["Shape"].as_schema().unwrap();
    let discriminator = shape.discriminator.as_ref().unwrap();
    assert_eq!(discriminator.property_name, "kind");
    assert_eq!(discriminator.mapping["audit"], "Audit");

    let tree = spec.components.schemas["Tree"].as_schema().unwrap();
    let items = tree.properties["children"]
        .as_schema()
        .and_then(|s| s.items.as_deref());
    assert!(matches!(items, Some(SchemaOrRef::Ref { .. })));
}

#[test]
fn parse_json_document() {
    let json = r##"{
        "openapi": "3.1.0",
        "info": {"title": "Ping", "version": "1"},
        "paths": {"/ping": {"get": {"responses": {"204": {"description": "pong"}}}}}
    }"##;
    let spec = parse::from_json(json).unwrap();
    assert_eq!(spec.paths["/ping"].operations().len(), 1);
    assert!(spec.components.schemas.is_empty());
}
