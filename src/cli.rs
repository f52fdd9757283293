use anyhow::Result;
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::generator::{self, GenerateRequest, OutputFormat};
use crate::scanner::FileScanner;

/// OpenAPI from TypeScript - Derive an OpenAPI document from annotated TypeScript route modules
#[derive(Parser, Debug)]
#[command(name = "openapi-from-typescript")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Working directory all relative paths resolve against
    #[arg(long = "cwd", global = true, value_name = "DIR", default_value = ".")]
    pub cwd: PathBuf,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file into the working directory
    Init,
    /// Generate the OpenAPI document from the configured entry modules
    Generate {
        /// Path to the configuration file (default: openapi-ts.config.json)
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output format; inferred from the output extension when omitted
        #[arg(short = 'f', long = "format", value_enum)]
        format: Option<OutputFormat>,
    },
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.cwd.exists() {
        anyhow::bail!("Working directory does not exist: {}", args.cwd.display());
    }
    if !args.cwd.is_dir() {
        anyhow::bail!(
            "Working directory is not a directory: {}",
            args.cwd.display()
        );
    }

    info!("Working directory: {}", args.cwd.display());

    Ok(args)
}

/// Run the selected subcommand
pub fn run(args: CliArgs) -> Result<()> {
    match &args.command {
        Command::Init => run_init(&args.cwd),
        Command::Generate { config, format } => {
            run_generate(&args.cwd, config.as_deref(), *format)
        }
    }
}

fn run_init(cwd: &Path) -> Result<()> {
    info!("Writing configuration scaffold...");
    let target = config::init(cwd)?;
    println!("Wrote {}", target.display());
    Ok(())
}

fn run_generate(cwd: &Path, config_path: Option<&Path>, format: Option<OutputFormat>) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    // Step 1: Load configuration
    let config_file = match config_path {
        Some(path) => cwd.join(path),
        None => cwd.join(config::CONFIG_FILE_NAME),
    };
    info!("Loading configuration: {}", config_file.display());
    let config = Config::load(&config_file)?;

    // Step 2: Expand entry patterns
    info!("Scanning for entry files...");
    let scanner = FileScanner::new(cwd.to_path_buf());
    let scan_result = scanner.scan(&config.entry)?;

    for warning in &scan_result.warnings {
        log::warn!("{}", warning);
    }
    info!("Found {} entry file(s)", scan_result.entry_files.len());

    if scan_result.entry_files.is_empty() {
        anyhow::bail!("No entry files matched the configured patterns");
    }

    // Step 3: Resolve output location and format
    let output_path = config.output.as_ref().map(|path| cwd.join(path));
    let format = resolve_format(format, output_path.as_deref());
    info!("Output format: {:?}", format);

    // Step 4: Run the generation pipeline
    let request = GenerateRequest {
        entry_files: scan_result.entry_files,
        base_document: serde_json::to_string(&config.base)?,
        output_path,
        format,
        collision_policy: config.collision_policy,
        aliases: resolve_aliases(cwd, &config.aliases),
        max_files: config.max_files,
    };
    let result = generator::generate(&request)?;

    // Step 5: Deliver the document
    if let Some(text) = result.schema {
        println!("{}", text);
    }
    if let Some(path) = result.filepath {
        info!(
            "Successfully wrote OpenAPI document to {}",
            path.display()
        );
    }

    info!("Generation complete!");
    Ok(())
}

/// Explicit flag wins; otherwise the output extension decides, defaulting
/// to JSON.
fn resolve_format(flag: Option<OutputFormat>, output: Option<&Path>) -> OutputFormat {
    if let Some(format) = flag {
        return format;
    }
    match output.and_then(|path| path.extension()).and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            OutputFormat::Yaml
        }
        _ => OutputFormat::Json,
    }
}

/// Alias directories in the configuration are relative to the working
/// directory.
fn resolve_aliases(cwd: &Path, aliases: &IndexMap<String, PathBuf>) -> IndexMap<String, PathBuf> {
    aliases
        .iter()
        .map(|(prefix, dir)| (prefix.clone(), cwd.join(dir)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_format_flag_wins() {
        let output = PathBuf::from("openapi.yaml");
        let format = resolve_format(Some(OutputFormat::Json), Some(&output));
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_resolve_format_from_output_extension() {
        assert_eq!(
            resolve_format(None, Some(Path::new("docs/openapi.yaml"))),
            OutputFormat::Yaml
        );
        assert_eq!(
            resolve_format(None, Some(Path::new("docs/openapi.yml"))),
            OutputFormat::Yaml
        );
        assert_eq!(
            resolve_format(None, Some(Path::new("docs/openapi.json"))),
            OutputFormat::Json
        );
    }

    #[test]
    fn test_resolve_format_defaults_to_json() {
        assert_eq!(resolve_format(None, None), OutputFormat::Json);
        assert_eq!(
            resolve_format(None, Some(Path::new("openapi"))),
            OutputFormat::Json
        );
    }

    #[test]
    fn test_args_parse_generate_with_flags() {
        let args = CliArgs::try_parse_from([
            "openapi-from-typescript",
            "generate",
            "--config",
            "custom.json",
            "--format",
            "yaml",
            "--cwd",
            "/tmp",
            "-v",
        ])
        .unwrap();

        assert!(args.verbose);
        assert_eq!(args.cwd, PathBuf::from("/tmp"));
        match args.command {
            Command::Generate { config, format } => {
                assert_eq!(config, Some(PathBuf::from("custom.json")));
                assert_eq!(format, Some(OutputFormat::Yaml));
            }
            Command::Init => panic!("expected generate subcommand"),
        }
    }

    #[test]
    fn test_args_reject_missing_cwd() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent");

        let args = CliArgs::try_parse_from([
            "openapi-from-typescript",
            "init",
            "--cwd",
            missing.to_str().unwrap(),
        ])
        .unwrap();

        let result = parse_args_from_parsed(args);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("does not exist"));
    }

    #[test]
    fn test_run_init_writes_scaffold() {
        let temp_dir = TempDir::new().unwrap();
        let args = CliArgs::try_parse_from([
            "openapi-from-typescript",
            "init",
            "--cwd",
            temp_dir.path().to_str().unwrap(),
        ])
        .unwrap();

        run(args).unwrap();
        assert!(temp_dir.path().join(config::CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_run_generate_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let cwd = temp_dir.path();
        fs::create_dir(cwd.join("routes")).unwrap();
        fs::write(
            cwd.join("routes/users.ts"),
            r#"
                interface User { id: number; }
                export const getUsers = LilPath(
                    async (request: {}, reply: any): Promise<void> => {
                        reply.send(LilResponse({} as User, { statusCode: 200, description: 'ok' }));
                    },
                    { method: 'GET', path: '/users' }
                );
            "#,
        )
        .unwrap();
        fs::write(
            cwd.join(config::CONFIG_FILE_NAME),
            r#"{
                "entry": ["routes/*.ts"],
                "base": { "info": { "title": "Test", "version": "1.0.0" }, "paths": {} },
                "output": "out/openapi.yaml"
            }"#,
        )
        .unwrap();

        let args = CliArgs::try_parse_from([
            "openapi-from-typescript",
            "generate",
            "--cwd",
            cwd.to_str().unwrap(),
        ])
        .unwrap();
        run(args).unwrap();

        let written = fs::read_to_string(cwd.join("out/openapi.yaml")).unwrap();
        assert!(written.contains("openapi: 3.0.3"));
        assert!(written.contains("/users:"));
        assert!(written.contains("title: Test"));
    }
}
