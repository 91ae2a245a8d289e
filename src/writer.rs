//! Rendering and persisting the finished document.
//!
//! Thin by design: the interesting work happens before this point. JSON and
//! YAML both render from the same serde model, so the two outputs can never
//! drift apart.

use std::fs;
use std::path::Path;

use crate::document::OpenApiDocument;
use crate::error::DocError;

/// Render the document as pretty-printed JSON.
pub fn to_json(document: &OpenApiDocument) -> Result<String, DocError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Render the document as YAML.
pub fn to_yaml(document: &OpenApiDocument) -> Result<String, DocError> {
    Ok(serde_yaml::to_string(document)?)
}

/// Write the JSON rendering to `path`.
pub fn write_json(document: &OpenApiDocument, path: &Path) -> Result<(), DocError> {
    fs::write(path, to_json(document)?)?;
    Ok(())
}

/// Write the YAML rendering to `path`.
pub fn write_yaml(document: &OpenApiDocument, path: &Path) -> Result<(), DocError> {
    fs::write(path, to_yaml(document)?)?;
    Ok(())
}
