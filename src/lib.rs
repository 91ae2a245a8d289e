#![forbid(unsafe_code)]
#![deny(warnings, unused_must_use, dead_code, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! OpenAPI documentation core: type-graph normalization, schema emission,
//! and endpoint assembly.
//!
//! The pipeline is:
//! 1. Normalize: compiler type handles -> `Node` IR (via the
//!    [`adapter::TypeInspector`] contract)
//! 2. Emit: `Node` -> OpenAPI schema objects
//! 3. Assemble: entry-point annotations -> path items, derived per-location
//!    components, pruned `components.schemas`
//! 4. Write: document -> JSON / YAML
//!
//! Project loading, declaration discovery, and doc-comment tag parsing are
//! the caller's concern; they feed [`metadata::GlobalMetadata`] in and get
//! an [`document::OpenApiDocument`] out.

pub mod adapter;
pub mod assembler;
pub mod document;
pub mod error;
pub mod fixture;
pub mod metadata;
pub mod node;
pub mod normalize;
pub mod registry;
pub mod schema;
pub mod writer;

pub use assembler::{DocumentBuilder, PathOutcome};
pub use document::{HttpMethod, Info, OpenApiDocument};
pub use error::DocError;
pub use metadata::{Declaration, DeclarationKind, EntryPoint, GlobalMetadata, PathConfig, TypeExpr};
pub use node::Node;
pub use normalize::{Normalized, Normalizer, MAX_DEPTH};
pub use registry::ComponentRegistry;
pub use schema::{to_schema, SchemaObject};
