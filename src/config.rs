use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::schema_generator::CollisionPolicy;

/// Configuration file name both subcommands look for.
pub const CONFIG_FILE_NAME: &str = "openapi-ts.config.json";

/// Scaffold written by `init`.
pub const DEFAULT_CONFIG: &str = r#"{
  "entry": ["src/routes/**/*.ts"],
  "base": {
    "openapi": "3.0.3",
    "info": {
      "title": "Generated API",
      "version": "1.0.0"
    },
    "paths": {}
  },
  "output": "openapi.json"
}
"#;

/// Project configuration, loaded from a JSON file with camelCase keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Entry globs or file paths, relative to the working directory
    pub entry: Vec<String>,
    /// Inline base document template the generated content merges into
    pub base: Value,
    /// Output file path; the document goes to stdout when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Import-alias table mapping a specifier prefix to a directory
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub aliases: IndexMap<String, PathBuf>,
    /// What to do when two modules register the same schema name
    #[serde(default)]
    pub collision_policy: CollisionPolicy,
    /// Cap on visited modules during graph traversal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
}

impl Config {
    /// Loads and validates the configuration at `path`.
    pub fn load(path: &Path) -> Result<Config> {
        debug!("Loading configuration from {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        if config.entry.is_empty() {
            bail!(
                "Configuration {} must list at least one entry pattern",
                path.display()
            );
        }
        Ok(config)
    }
}

/// Writes the default configuration scaffold into `directory`. Refuses to
/// overwrite an existing file.
pub fn init(directory: &Path) -> Result<PathBuf> {
    let target = directory.join(CONFIG_FILE_NAME);
    if target.exists() {
        bail!("{} already exists", target.display());
    }
    fs::write(&target, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    debug!("Wrote configuration scaffold to {}", target.display());
    Ok(target)
}
