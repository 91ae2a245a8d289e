//! Error taxonomy for the documentation pipeline.
//!
//! Normalization-level anomalies never surface here; they degrade with a
//! diagnostic. These errors are contract violations by the documented
//! project (or plain I/O failures at the output boundary), surfaced
//! per-endpoint so the caller can choose to skip or abort.

use thiserror::Error;

/// Errors surfaced by the assembler and the writer.
#[derive(Debug, Error)]
pub enum DocError {
    /// A path configuration names an entry point the walk never collected.
    #[error("entry point `{entry_point}` was not found in the collected project metadata")]
    UnknownEntryPoint {
        /// The configured entry-point function name.
        entry_point: String,
    },

    /// A request type variant resolved to a non-object top-level shape.
    #[error(
        "request type `{type_name}` for entry point `{entry_point}` is not an object; \
         request handlers must declare object request types"
    )]
    RequestTypeNotObject {
        /// The entry point being documented.
        entry_point: String,
        /// The offending type name.
        type_name: String,
    },

    /// JSON serialization of the finished document failed.
    #[error("failed to serialize OpenAPI document to JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization of the finished document failed.
    #[error("failed to serialize OpenAPI document to YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Writing the rendered document failed.
    #[error("failed to write OpenAPI document: {0}")]
    Io(#[from] std::io::Error),
}
