//! OpenAPI from TypeScript - Command-line tool for generating OpenAPI documents.
//!
//! This binary derives an OpenAPI 3.0.3 document from annotated TypeScript
//! route modules. The source code is statically analyzed; route handlers are
//! never executed.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-typescript <COMMAND> [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Write a configuration scaffold into the current directory:
//! ```bash
//! openapi-from-typescript init
//! ```
//!
//! Generate the document described by openapi-ts.config.json:
//! ```bash
//! openapi-from-typescript generate
//! ```
//!
//! Generate with an explicit configuration file and verbose logging:
//! ```bash
//! openapi-from-typescript generate -c configs/openapi-ts.config.json -v
//! ```

mod cli;
mod config;
mod error;
mod extractor;
mod generator;
mod graph;
mod openapi_builder;
mod parser;
mod scanner;
mod schema_generator;
mod serializer;
mod type_resolver;

use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse once to read the verbose flag, so the logger exists before the
    // validating parse logs anything
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from TypeScript starting...");

    // Now do the full parse with validation
    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    Ok(())
}
