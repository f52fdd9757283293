// Verify type references resolve across module boundaries
use indexmap::IndexMap;
use openapi_from_typescript::generator::{generate, GenerateRequest, OutputFormat};
use openapi_from_typescript::schema_generator::CollisionPolicy;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

fn generate_document(entry: &Path, aliases: IndexMap<String, PathBuf>) -> Value {
    let request = GenerateRequest {
        entry_files: vec![entry.to_path_buf()],
        base_document: "{}".to_string(),
        output_path: None,
        format: OutputFormat::Json,
        collision_policy: CollisionPolicy::Overwrite,
        aliases,
        max_files: None,
    };
    let result = generate(&request).expect("Generation should succeed");
    serde_json::from_str(&result.schema.expect("Should return the document as text"))
        .expect("Generated JSON should be valid")
}

#[test]
fn test_imported_type_is_resolved() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        &temp_dir,
        "models.ts",
        r#"
            export interface User {
                id: number;
                name: string;
            }
        "#,
    );
    let entry = write_file(
        &temp_dir,
        "routes.ts",
        r#"
            import { User } from './models';

            export const getUser = LilPath(
                async (request: {}, reply: any): Promise<void> => {
                    reply.send(LilResponse({} as User, { statusCode: 200, description: 'One user' }));
                },
                { method: 'GET', path: '/user' }
            );
        "#,
    );

    let document = generate_document(&entry, IndexMap::new());

    assert_eq!(
        document["paths"]["/user"]["get"]["responses"]["200"]["content"]["application/json"]
            ["schema"]["$ref"],
        "#/components/schemas/User"
    );
    assert_eq!(
        document["components"]["schemas"]["User"]["properties"]["id"]["type"],
        "number"
    );
}

#[test]
fn test_reexport_chain_is_followed() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        &temp_dir,
        "models.ts",
        "export interface Animal { name: string; }",
    );
    write_file(
        &temp_dir,
        "index.ts",
        "export { Animal } from './models';",
    );
    let entry = write_file(
        &temp_dir,
        "routes.ts",
        r#"
            import { Animal } from './index';

            export const getAnimal = LilPath(
                async (request: {}, reply: any): Promise<void> => {
                    reply.send(LilResponse({} as Animal, { statusCode: 200, description: 'ok' }));
                },
                { method: 'GET', path: '/animal' }
            );
        "#,
    );

    let document = generate_document(&entry, IndexMap::new());

    assert!(document["components"]["schemas"]["Animal"]["properties"]["name"].is_object());
}

#[test]
fn test_star_reexport_is_followed() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        &temp_dir,
        "models.ts",
        "export interface Keeper { badge: number; }",
    );
    write_file(&temp_dir, "index.ts", "export * from './models';");
    let entry = write_file(
        &temp_dir,
        "routes.ts",
        r#"
            import { Keeper } from './index';

            export const getKeeper = LilPath(
                async (request: {}, reply: any): Promise<void> => {
                    reply.send(LilResponse({} as Keeper, { statusCode: 200, description: 'ok' }));
                },
                { method: 'GET', path: '/keeper' }
            );
        "#,
    );

    let document = generate_document(&entry, IndexMap::new());

    assert!(document["components"]["schemas"]["Keeper"]["properties"]["badge"].is_object());
}

#[test]
fn test_alias_prefix_resolution() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        &temp_dir,
        "auth/session.ts",
        "export interface Session { token: string; }",
    );
    let entry = write_file(
        &temp_dir,
        "routes.ts",
        r#"
            import { Session } from '@auth/session';

            export const getSession = LilPath(
                async (request: {}, reply: any): Promise<void> => {
                    reply.send(LilResponse({} as Session, { statusCode: 200, description: 'ok' }));
                },
                { method: 'GET', path: '/session' }
            );
        "#,
    );

    let mut aliases = IndexMap::new();
    aliases.insert("@auth".to_string(), temp_dir.path().join("auth"));

    let document = generate_document(&entry, aliases);

    assert!(document["components"]["schemas"]["Session"]["properties"]["token"].is_object());
}

#[test]
fn test_mutually_recursive_types_terminate() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        &temp_dir,
        "author.ts",
        r#"
            import { Book } from './book';

            export interface Author {
                name: string;
                books?: Book[];
            }
        "#,
    );
    write_file(
        &temp_dir,
        "book.ts",
        r#"
            import { Author } from './author';

            export interface Book {
                title: string;
                author?: Author;
            }
        "#,
    );
    let entry = write_file(
        &temp_dir,
        "routes.ts",
        r#"
            import { Author } from './author';

            export const getAuthor = LilPath(
                async (request: {}, reply: any): Promise<void> => {
                    reply.send(LilResponse({} as Author, { statusCode: 200, description: 'ok' }));
                },
                { method: 'GET', path: '/author' }
            );
        "#,
    );

    let document = generate_document(&entry, IndexMap::new());
    let schemas = &document["components"]["schemas"];

    assert_eq!(
        schemas["Author"]["properties"]["books"]["items"]["$ref"],
        "#/components/schemas/Book"
    );
    assert_eq!(
        schemas["Book"]["properties"]["author"]["$ref"],
        "#/components/schemas/Author"
    );
}

#[test]
fn test_generic_request_arguments_cross_module() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        &temp_dir,
        "pets.ts",
        r#"
            export class Pet {
                name!: string;
            }

            export interface PetsRequest {
                page: LilQueryParam<number>;
                pet: LilBodyParam<Pet>;
            }
        "#,
    );
    let entry = write_file(
        &temp_dir,
        "routes.ts",
        r#"
            import { PetsRequest } from './pets';

            export const createPet = LilPath(
                async (request: Request<PetsRequest>, reply: any): Promise<void> => {
                    reply.send(LilResponse(null, { statusCode: 201, description: 'Created' }));
                },
                { method: 'POST', path: '/pets' }
            );
        "#,
    );

    let document = generate_document(&entry, IndexMap::new());
    let operation = &document["paths"]["/pets"]["post"];

    // The unresolvable outer wrapper is ignored; its type argument is walked
    assert_eq!(operation["parameters"][0]["name"], "page");
    assert_eq!(operation["parameters"][0]["in"], "query");
    assert_eq!(
        operation["requestBody"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/Pet"
    );
}

#[test]
fn test_unresolvable_import_degrades_to_empty_schema() {
    let temp_dir = TempDir::new().unwrap();
    let entry = write_file(
        &temp_dir,
        "routes.ts",
        r#"
            import { Mystery } from 'npm-lib';

            export const getMystery = LilPath(
                async (request: {}, reply: any): Promise<void> => {
                    reply.send(LilResponse({} as Mystery, { statusCode: 200, description: 'ok' }));
                },
                { method: 'GET', path: '/mystery' }
            );
        "#,
    );

    let document = generate_document(&entry, IndexMap::new());

    // Types from external packages cannot be resolved statically
    assert_eq!(
        document["paths"]["/mystery"]["get"]["responses"]["200"]["content"]["application/json"]
            ["schema"],
        serde_json::json!({})
    );
}
