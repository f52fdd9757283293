//! OpenAPI from TypeScript - OpenAPI documents derived from annotated TypeScript source.
//!
//! This library generates an OpenAPI 3.0.3 document by statically analyzing
//! TypeScript route modules. Route declarations are recognized by their marker
//! wrappers (`LilPath`, `LilResponse`, parameter and body markers), request and
//! response types are resolved across module imports, and the result is merged
//! into a user-supplied base document. Handlers are never executed.
//!
//! # Architecture
//!
//! The library is organized into modules that form a pipeline:
//!
//! 1. [`scanner`] - Expands configured entry globs into a file list
//! 2. [`parser`] - Parses TypeScript modules into Abstract Syntax Trees (AST)
//! 3. [`graph`] - Builds the import graph reachable from the entry modules
//! 4. [`type_resolver`] - Resolves TypeScript type expressions to a normalized shape
//! 5. [`schema_generator`] - Converts resolved types to OpenAPI schemas
//! 6. [`extractor`] - Extracts route operations from marker-wrapped handlers
//! 7. [`openapi_builder`] - Builds the paths object and merges the base document
//! 8. [`serializer`] - Serializes the document to YAML or JSON
//!
//! The [`generator`] module wires the pipeline together behind a single
//! request/result pair, and [`config`] and [`cli`] put a command-line surface
//! on top of it.
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_typescript::generator::{generate, GenerateRequest, OutputFormat};
//! use openapi_from_typescript::schema_generator::CollisionPolicy;
//! use indexmap::IndexMap;
//! use std::path::PathBuf;
//!
//! let request = GenerateRequest {
//!     entry_files: vec![PathBuf::from("./src/routes/users.ts")],
//!     base_document: r#"{ "info": { "title": "My API", "version": "1.0.0" } }"#.to_string(),
//!     output_path: None,
//!     format: OutputFormat::Yaml,
//!     collision_policy: CollisionPolicy::Overwrite,
//!     aliases: IndexMap::new(),
//!     max_files: None,
//! };
//!
//! let result = generate(&request).unwrap();
//! println!("{}", result.schema.unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides the `init`
//! and `generate` subcommands.

pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod graph;
pub mod openapi_builder;
pub mod parser;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod type_resolver;
