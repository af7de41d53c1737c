//! Serialization of AsyncAPI documents to YAML or JSON.

use crate::spec3::AsyncApi;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes an AsyncAPI document to YAML format.
///
/// Section and property order follows insertion order, so the output is
/// stable across runs over the same source tree.
pub fn serialize_yaml(document: &AsyncApi) -> Result<String> {
    debug!("Serializing AsyncAPI document to YAML");
    serde_yaml::to_string(document).context("Failed to serialize AsyncAPI document to YAML")
}

/// Serializes an AsyncAPI document to pretty-printed JSON.
pub fn serialize_json(document: &AsyncApi) -> Result<String> {
    debug!("Serializing AsyncAPI document to JSON");
    serde_json::to_string_pretty(document)
        .context("Failed to serialize AsyncAPI document to JSON")
}

/// Writes string content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
