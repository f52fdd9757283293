//! Serialization of assembled OpenAPI documents to JSON or YAML text.
//!
//! The document arrives as a JSON value whose maps preserve insertion
//! order, so both output formats are byte-stable across runs.

use anyhow::{Context, Result};
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Serializes a document to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use openapi_from_typescript::serializer::serialize_json;
/// use serde_json::json;
///
/// let document = json!({ "openapi": "3.0.3", "paths": {} });
/// let text = serialize_json(&document).unwrap();
/// assert!(text.contains("\"openapi\": \"3.0.3\""));
/// ```
pub fn serialize_json(document: &Value) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(document).context("Failed to serialize OpenAPI document to JSON")
}

/// Serializes a document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(document: &Value) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    serde_yaml::to_string(document).context("Failed to serialize OpenAPI document to YAML")
}

/// Writes string content to a file, creating parent directories as needed.
/// An existing file is overwritten.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be created or
/// written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!(
        "Successfully wrote {} bytes to {}",
        content.len(),
        path.display()
    );
    Ok(())
}
