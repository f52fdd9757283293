use anyhow::{Context, Result};
use clap::ValueEnum;
use indexmap::IndexMap;
use log::debug;
use std::path::PathBuf;

use crate::extractor::OperationExtractor;
use crate::graph::{ModuleGraph, ResolutionOptions};
use crate::openapi_builder::{DocumentAssembler, OpenApiBuilder};
use crate::schema_generator::{CollisionPolicy, SchemaGenerator};
use crate::serializer;
use crate::type_resolver::TypeResolver;

/// Serialization format of the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Everything one generation run needs.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Entry files to scan for route declarations, already glob-expanded
    pub entry_files: Vec<PathBuf>,
    /// Base document template as JSON text
    pub base_document: String,
    /// Where to write the document; returned as text when omitted
    pub output_path: Option<PathBuf>,
    /// Serialization format
    pub format: OutputFormat,
    /// What to do when two modules register the same schema name
    pub collision_policy: CollisionPolicy,
    /// Import-alias table for module specifier resolution
    pub aliases: IndexMap<String, PathBuf>,
    /// Cap on visited modules during graph traversal
    pub max_files: Option<usize>,
}

/// What a generation run produced. Exactly one field is populated: the
/// serialized document when no output path was given, the written path
/// otherwise.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub schema: Option<String>,
    pub filepath: Option<PathBuf>,
}

/// Runs the whole pipeline: parse the entry modules and their imports,
/// extract routes and schemas, merge into the base document, serialize.
pub fn generate(request: &GenerateRequest) -> Result<GenerateResult> {
    debug!(
        "Starting generation for {} entry file(s)",
        request.entry_files.len()
    );

    let base: serde_json::Value = serde_json::from_str(&request.base_document)
        .context("Base document is not valid JSON")?;

    let options = ResolutionOptions {
        aliases: request.aliases.clone(),
        max_files: request.max_files,
    };
    let graph = ModuleGraph::build(&request.entry_files, &options)?;
    debug!("Module graph holds {} module(s)", graph.len());

    let mut generator = SchemaGenerator::new(TypeResolver::new(&graph), request.collision_policy);
    let routes = OperationExtractor::new(&graph, &mut generator).extract()?;
    debug!("Extracted {} route(s)", routes.len());

    let mut builder = OpenApiBuilder::new();
    for route in &routes {
        builder.add_route(route);
    }

    let paths = builder.into_paths();
    let schemas = generator.into_components();
    let document = DocumentAssembler::new(base).assemble(&paths, &schemas)?;

    let text = match request.format {
        OutputFormat::Json => serializer::serialize_json(&document)?,
        OutputFormat::Yaml => serializer::serialize_yaml(&document)?,
    };

    match &request.output_path {
        Some(path) => {
            serializer::write_to_file(&text, path)?;
            Ok(GenerateResult {
                schema: None,
                filepath: Some(path.clone()),
            })
        }
        None => Ok(GenerateResult {
            schema: Some(text),
            filepath: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const ROUTE_MODULE: &str = r#"
        interface User {
            id: number;
            name: string;
        }

        export const getUsers = LilPath(
            async (request: { limit: LilQueryParam<number> }, reply: any): Promise<void> => {
                reply.send(LilResponse({} as User, { statusCode: 200, description: 'Users' }));
            },
            { method: 'GET', path: '/users', tags: ['users'] }
        );
    "#;

    fn write_module(dir: &TempDir, name: &str, source: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, source).unwrap();
        path
    }

    fn request_for(entry: &Path) -> GenerateRequest {
        GenerateRequest {
            entry_files: vec![entry.to_path_buf()],
            base_document: "{}".to_string(),
            output_path: None,
            format: OutputFormat::Json,
            collision_policy: CollisionPolicy::Overwrite,
            aliases: IndexMap::new(),
            max_files: None,
        }
    }

    #[test]
    fn test_generate_returns_schema_text() {
        let temp_dir = TempDir::new().unwrap();
        let entry = write_module(&temp_dir, "routes.ts", ROUTE_MODULE);

        let result = generate(&request_for(&entry)).unwrap();
        assert!(result.filepath.is_none());
        let text = result.schema.unwrap();
        let document: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(document["openapi"], "3.0.3");
        assert!(document["paths"]["/users"]["get"].is_object());
        assert!(document["components"]["schemas"]["User"].is_object());
    }

    #[test]
    fn test_generate_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let entry = write_module(&temp_dir, "routes.ts", ROUTE_MODULE);
        let output = temp_dir.path().join("out").join("openapi.json");

        let mut request = request_for(&entry);
        request.output_path = Some(output.clone());

        let result = generate(&request).unwrap();
        assert!(result.schema.is_none());
        assert_eq!(result.filepath, Some(output.clone()));
        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("\"/users\""));
    }

    #[test]
    fn test_generate_yaml_format() {
        let temp_dir = TempDir::new().unwrap();
        let entry = write_module(&temp_dir, "routes.ts", ROUTE_MODULE);

        let mut request = request_for(&entry);
        request.format = OutputFormat::Yaml;

        let result = generate(&request).unwrap();
        let text = result.schema.unwrap();
        assert!(text.contains("openapi: 3.0.3"));
        assert!(text.contains("/users:"));
    }

    #[test]
    fn test_generate_merges_base_document() {
        let temp_dir = TempDir::new().unwrap();
        let entry = write_module(&temp_dir, "routes.ts", ROUTE_MODULE);

        let mut request = request_for(&entry);
        request.base_document =
            r#"{ "openapi": "3.1.0", "info": { "title": "Zoo", "version": "2.0.0" } }"#.to_string();

        let result = generate(&request).unwrap();
        let document: serde_json::Value = serde_json::from_str(&result.schema.unwrap()).unwrap();
        assert_eq!(document["openapi"], "3.1.0");
        assert_eq!(document["info"]["title"], "Zoo");
        assert!(document["paths"]["/users"].is_object());
    }

    #[test]
    fn test_generate_rejects_invalid_base() {
        let temp_dir = TempDir::new().unwrap();
        let entry = write_module(&temp_dir, "routes.ts", ROUTE_MODULE);

        let mut request = request_for(&entry);
        request.base_document = "not json".to_string();

        let error = generate(&request).unwrap_err();
        assert!(error.to_string().contains("Base document"));
    }

    #[test]
    fn test_generate_fails_on_missing_entry() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.ts");

        assert!(generate(&request_for(&missing)).is_err());
    }

    #[test]
    fn test_generate_honors_module_limit() {
        let temp_dir = TempDir::new().unwrap();
        write_module(
            &temp_dir,
            "user.ts",
            "export interface User { id: number; }",
        );
        let entry = write_module(
            &temp_dir,
            "routes.ts",
            r#"
                import { User } from './user';
                export const getUser = LilPath(
                    async (request: {}, reply: any): Promise<void> => {
                        reply.send(LilResponse({} as User, { statusCode: 200 }));
                    },
                    { method: 'GET', path: '/user' }
                );
            "#,
        );

        let mut request = request_for(&entry);
        request.max_files = Some(1);

        let error = generate(&request).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::GraphLimitExceeded(1))
        ));
    }
}
