//! Project metadata consumed by the assembler.
//!
//! The declaration walk (external to this crate) collects every documented
//! interface, class, type alias, and entry-point function, normalizes their
//! types, and hands the result over as [`GlobalMetadata`]. The assembler
//! only ever reads this structure; it never goes back to the type graph.

use crate::document::HttpMethod;
use crate::node::Node;

/// Everything the declaration walk collected for one documentation run.
#[derive(Debug, Default)]
pub struct GlobalMetadata {
    /// Named type declarations, in project declaration order.
    pub declarations: Vec<Declaration>,
    /// Documented entry-point functions.
    pub entry_points: Vec<EntryPoint>,
}

impl GlobalMetadata {
    /// Every declaration whose name matches, in declaration order.
    ///
    /// Duplicate names across files are legal but unreconciled; callers
    /// take the first match. That first-match rule is the documented
    /// resolution order, not an accident of iteration.
    pub fn resolve_all(&self, type_name: &str) -> Vec<&Declaration> {
        self.declarations
            .iter()
            .filter(|declaration| declaration.name == type_name)
            .collect()
    }

    /// The entry point with the given function name, if any.
    pub fn entry_point(&self, name: &str) -> Option<&EntryPoint> {
        self.entry_points
            .iter()
            .find(|entry_point| entry_point.name == name)
    }
}

/// A named type declaration with its normalized root node.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Declared name.
    pub name: String,
    /// What kind of declaration produced it.
    pub kind: DeclarationKind,
    /// The declaration's normalized type.
    pub node: Node,
}

impl Declaration {
    /// Build a declaration, stamping the node's display name when the walk
    /// did not set one.
    pub fn new(name: impl Into<String>, kind: DeclarationKind, mut node: Node) -> Self {
        let name = name.into();
        if node.meta.name.is_none() {
            node.meta.name = Some(name.clone());
        }
        Self { name, kind, node }
    }
}

/// The source construct a declaration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// `interface` declaration.
    Interface,
    /// `class` declaration.
    Class,
    /// `type` alias declaration.
    TypeAlias,
}

/// A documented entry-point function and its annotation tags.
#[derive(Debug, Clone, Default)]
pub struct EntryPoint {
    /// Function name, matched against path configuration.
    pub name: String,
    /// Doc comment text, emitted as the operation description.
    pub comment: Option<String>,
    /// Extra grouping tag beyond the path configuration's tag.
    pub tag: Option<String>,
    /// Declared media type; `application/json` when absent.
    pub media_type: Option<String>,
    /// Declared request type expression.
    pub request: Option<RequestAnnotation>,
    /// Declared responses.
    pub responses: Vec<ResponseAnnotation>,
}

/// The request annotation of an entry point.
#[derive(Debug, Clone)]
pub struct RequestAnnotation {
    /// Accepted request type variants.
    pub types: TypeExpr,
    /// Request description.
    pub comment: Option<String>,
}

/// One response annotation of an entry point.
#[derive(Debug, Clone)]
pub struct ResponseAnnotation {
    /// Response type variants.
    pub types: TypeExpr,
    /// HTTP status code; `"default"` when absent.
    pub status: Option<u16>,
    /// Response description.
    pub comment: Option<String>,
}

/// An ordered, de-duplicated list of type names.
///
/// The project convention writes "this handler accepts one of several
/// request shapes" as a `|`-joined name list. [`TypeExpr::parse`] owns that
/// split so the assembler only ever sees a typed list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeExpr {
    variants: Vec<String>,
}

impl TypeExpr {
    /// Parse a `|`-joined type name expression: split, trim, drop empties,
    /// de-duplicate preserving first occurrence.
    pub fn parse(expression: &str) -> Self {
        let mut variants: Vec<String> = Vec::new();
        for part in expression.split('|') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !variants.iter().any(|existing| existing == trimmed) {
                variants.push(trimmed.to_string());
            }
        }
        Self { variants }
    }

    /// An expression with a single variant.
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            variants: vec![name.into()],
        }
    }

    /// The variant names, in declaration order.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Whether the expression names no types at all.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Per-endpoint routing facts supplied by the configuration layer.
#[derive(Debug, Clone)]
pub struct PathConfig {
    /// URL path (e.g. `/accounts/{accountId}`).
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Primary grouping tag.
    pub tag_name: String,
    /// Path summary.
    pub summary: Option<String>,
    /// Path description.
    pub description: Option<String>,
}
