use indexmap::IndexMap;
use openapi_from_typescript::generator::{generate, GenerateRequest, OutputFormat};
use openapi_from_typescript::schema_generator::CollisionPolicy;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn zoo_project() -> TempDir {
    create_test_project(vec![
        ("zoo_routes.ts", include_str!("fixtures/zoo_routes.ts")),
        ("zoo_dtos.ts", include_str!("fixtures/zoo_dtos.ts")),
        ("zoo_router.ts", include_str!("fixtures/zoo_router.ts")),
    ])
}

fn zoo_request(project: &TempDir) -> GenerateRequest {
    GenerateRequest {
        entry_files: vec![project.path().join("zoo_routes.ts")],
        base_document: r#"{ "info": { "title": "Zoo API", "version": "1.0.0" } }"#.to_string(),
        output_path: None,
        format: OutputFormat::Json,
        collision_policy: CollisionPolicy::Overwrite,
        aliases: IndexMap::new(),
        max_files: None,
    }
}

fn zoo_document(project: &TempDir) -> Value {
    let result = generate(&zoo_request(project)).expect("Generation should succeed");
    let text = result.schema.expect("Should return the document as text");
    serde_json::from_str(&text).expect("Generated JSON should be valid")
}

#[test]
fn test_end_to_end_generation() {
    let project = zoo_project();
    let document = zoo_document(&project);

    // Base keys survive, and the version is filled in
    assert_eq!(document["openapi"], "3.0.3");
    assert_eq!(document["info"]["title"], "Zoo API");
    assert_eq!(document["info"]["version"], "1.0.0");

    // Every declared route shows up under its path and method
    assert!(document["paths"]["/users"]["get"].is_object());
    assert!(document["paths"]["/users/{id}"]["get"].is_object());
    assert!(document["paths"]["/animals"]["get"].is_object());
    assert!(document["paths"]["/animals"]["post"].is_object());
    assert!(document["paths"]["/animals/{id}"]["delete"].is_object());

    // Referenced types land in the component registry
    let schemas = document["components"]["schemas"]
        .as_object()
        .expect("Should have components.schemas");
    assert!(schemas.contains_key("User"));
    assert!(schemas.contains_key("Animal"));
    assert!(schemas.contains_key("AnimalLicense"));
    assert!(schemas.contains_key("AnimalKind"));
    assert!(schemas.contains_key("v1"));

    // AdminUser is declared but never referenced by a route
    assert!(!schemas.contains_key("AdminUser"));
}

#[test]
fn test_schema_structure_of_referenced_types() {
    let project = zoo_project();
    let document = zoo_document(&project);
    let schemas = &document["components"]["schemas"];

    // Optional members stay out of the required list
    let user = &schemas["User"];
    assert_eq!(user["type"], "object");
    assert!(user["properties"]["email"].is_object());
    let required: Vec<&str> = user["required"]
        .as_array()
        .expect("User should have required list")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(required.contains(&"id"));
    assert!(required.contains(&"name"));
    assert!(!required.contains(&"email"));

    // A string-literal union becomes an enum component
    let kind = &schemas["AnimalKind"];
    assert_eq!(kind["type"], "string");
    let variants: Vec<&str> = kind["enum"]
        .as_array()
        .expect("AnimalKind should be an enum")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(variants, vec!["lion", "tiger", "bear"]);

    // Class members reference the enum component
    assert_eq!(
        schemas["Animal"]["properties"]["kind"]["$ref"],
        "#/components/schemas/AnimalKind"
    );

    // Self-referential types terminate with a reference to themselves
    assert_eq!(
        schemas["AnimalLicense"]["properties"]["successor"]["$ref"],
        "#/components/schemas/AnimalLicense"
    );

    // Namespaced types nest under their group
    assert!(schemas["v1"]["properties"]["Session"]["properties"]["token"].is_object());
}

#[test]
fn test_route_parameters_extraction() {
    let project = zoo_project();
    let document = zoo_document(&project);

    let parameters = document["paths"]["/users"]["get"]["parameters"]
        .as_array()
        .expect("GET /users should have parameters");
    assert_eq!(parameters.len(), 2);

    // Query parameters are optional unless the wrapper says otherwise
    let limit = &parameters[0];
    assert_eq!(limit["name"], "limit");
    assert_eq!(limit["in"], "query");
    assert_eq!(limit["required"], false);
    assert_eq!(
        limit["content"]["application/json"]["schema"]["type"],
        "number"
    );

    // The header parameter references its namespaced component
    let session = &parameters[1];
    assert_eq!(session["name"], "session");
    assert_eq!(session["in"], "header");
    assert_eq!(session["required"], true);
    assert_eq!(
        session["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/v1/properties/Session"
    );

    // Path parameters are always required
    let id = &document["paths"]["/users/{id}"]["get"]["parameters"][0];
    assert_eq!(id["name"], "id");
    assert_eq!(id["in"], "path");
    assert_eq!(id["required"], true);
    assert_eq!(id["content"]["application/json"]["schema"]["type"], "string");
}

#[test]
fn test_request_body_extraction() {
    let project = zoo_project();
    let document = zoo_document(&project);

    let body = &document["paths"]["/animals"]["post"]["requestBody"];
    assert_eq!(body["required"], true);

    let schema = &body["content"]["application/json"]["schema"];
    assert_eq!(schema["type"], "array");
    assert_eq!(schema["items"]["$ref"], "#/components/schemas/Animal");
}

#[test]
fn test_response_extraction() {
    let project = zoo_project();
    let document = zoo_document(&project);

    // The created animal references its component schema
    let responses = &document["paths"]["/animals"]["post"]["responses"];
    assert_eq!(responses["201"]["description"], "Created");
    assert_eq!(
        responses["201"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/Animal"
    );

    // A null payload with an example keeps the example but carries no schema
    assert_eq!(responses["400"]["description"], "Invalid payload");
    let media = &responses["400"]["content"]["application/json"];
    assert!(media.get("schema").is_none());
    assert_eq!(
        media["example"]["$ref"],
        "#/components/examples/v1.BadPayload"
    );

    // A null payload without an example has no content at all
    let deleted = &document["paths"]["/animals/{id}"]["delete"]["responses"]["204"];
    assert_eq!(deleted["description"], "Deleted");
    assert!(deleted.get("content").is_none());
}

#[test]
fn test_tags_extraction() {
    let project = zoo_project();
    let document = zoo_document(&project);

    let tags = document["paths"]["/users"]["get"]["tags"]
        .as_array()
        .expect("GET /users should have tags");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0], "users");

    // Routes without a tags option omit the key entirely
    let delete = document["paths"]["/animals/{id}"]["delete"]
        .as_object()
        .expect("DELETE /animals/{id} should exist");
    assert!(!delete.contains_key("tags"));
}

#[test]
fn test_yaml_serialization_format() {
    let project = zoo_project();
    let mut request = zoo_request(&project);
    request.format = OutputFormat::Yaml;

    let result = generate(&request).expect("Generation should succeed");
    let yaml = result.schema.expect("Should return the document as text");

    assert!(yaml.starts_with("openapi:"));
    assert!(yaml.contains("paths:"));
    assert!(yaml.contains("/users:"));

    // Verify it's valid YAML by parsing it back
    let parsed: serde_yaml::Value =
        serde_yaml::from_str(&yaml).expect("Generated YAML should be valid");
    assert!(parsed.get("openapi").is_some());
    assert!(parsed.get("paths").is_some());
}

#[test]
fn test_json_serialization_format() {
    let project = zoo_project();
    let result = generate(&zoo_request(&project)).expect("Generation should succeed");
    let json = result.schema.expect("Should return the document as text");

    assert!(json.starts_with('{'));
    assert!(json.ends_with('}'));
    assert!(json.contains('\n'), "JSON should be pretty-printed");

    let parsed: Value = serde_json::from_str(&json).expect("Generated JSON should be valid");
    assert!(parsed.get("openapi").is_some());
    assert!(parsed.get("paths").is_some());
}

#[test]
fn test_output_is_deterministic() {
    let project = zoo_project();

    let first = generate(&zoo_request(&project))
        .expect("Generation should succeed")
        .schema
        .expect("Should return the document as text");
    let second = generate(&zoo_request(&project))
        .expect("Generation should succeed")
        .schema
        .expect("Should return the document as text");

    assert_eq!(first, second, "Two runs must produce identical output");

    // Path keys come out in route declaration order
    let document: Value = serde_json::from_str(&first).unwrap();
    let keys: Vec<&String> = document["paths"].as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["/users", "/users/{id}", "/animals", "/animals/{id}"]);
}

#[test]
fn test_base_document_keys_are_preserved() {
    let project = zoo_project();
    let mut request = zoo_request(&project);
    request.base_document = r#"{
        "openapi": "3.1.0",
        "info": { "title": "Zoo API", "version": "2.0.0" },
        "servers": [{ "url": "https://zoo.example.com" }],
        "components": {
            "examples": {
                "BadPayload": { "value": null }
            }
        }
    }"#
    .to_string();

    let result = generate(&request).expect("Generation should succeed");
    let document: Value = serde_json::from_str(&result.schema.unwrap()).unwrap();

    // An explicit base version is never overwritten
    assert_eq!(document["openapi"], "3.1.0");
    assert_eq!(document["servers"][0]["url"], "https://zoo.example.com");

    // Generated schemas merge in next to the base's examples
    assert!(document["components"]["examples"]["BadPayload"].is_object());
    assert!(document["components"]["schemas"]["User"].is_object());
}

#[test]
fn test_module_without_routes_yields_empty_paths() {
    let project = zoo_project();
    let mut request = zoo_request(&project);
    request.entry_files = vec![project.path().join("zoo_dtos.ts")];

    let result = generate(&request).expect("Generation should succeed");
    let document: Value = serde_json::from_str(&result.schema.unwrap()).unwrap();

    assert_eq!(document["paths"], serde_json::json!({}));
    assert!(document.get("components").is_none());
}
