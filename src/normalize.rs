//! Normalization from type handles to the IR.
//!
//! This module owns all the type-graph logic:
//! - shape classification dispatch over the [`TypeInspector`] contract
//! - union simplification (absent-branch dropping, single-branch
//!   degeneration, boolean merging, literal-union-to-enum collapse)
//! - intersection folding
//! - locality filtering of object properties
//! - depth limiting for cyclic and self-referential type graphs
//!
//! Normalization is infallible by design: every anomaly degrades to `Any`
//! or to an absent result with a diagnostic, so one malformed property can
//! never block documenting the rest of the project.

use std::collections::BTreeMap;

use tracing::debug;

use crate::adapter::{LiteralValue, TypeInspector, TypeShape};
use crate::node::{Node, NodeKind, ObjectNode, ObjectProperty};

/// Maximum recursion depth before a type is forced to `Any`.
///
/// Cyclic type graphs are broken by depth rather than by a visited set:
/// distinct instantiations of a generic at different depths are legitimately
/// different types, so identity-based cutoffs would be wrong more often than
/// this cap is coarse.
pub const MAX_DEPTH: usize = 20;

/// The outcome of normalizing one type handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// The normalized node, or `None` when the type contributes no schema.
    pub node: Option<Node>,
    /// Whether the enclosing slot stays required. `undefined`/`void`
    /// branches clear this; generic placeholders and empty records do not.
    pub required: bool,
}

impl Normalized {
    /// An `undefined`/`void`-style absence: no schema, slot optional.
    pub fn absent() -> Self {
        Self {
            node: None,
            required: false,
        }
    }

    /// A placeholder absence (unresolved generic, empty record): no schema,
    /// but the slot stays required.
    pub fn placeholder() -> Self {
        Self {
            node: None,
            required: true,
        }
    }

    /// A real schema contribution.
    pub fn present(node: Node) -> Self {
        Self {
            node: Some(node),
            required: true,
        }
    }
}

/// Recursive converter from type handles to [`Node`] trees.
pub struct Normalizer<'a, I: TypeInspector> {
    inspector: &'a I,
}

impl<I: TypeInspector> std::fmt::Debug for Normalizer<'_, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Normalizer")
    }
}

impl<'a, I: TypeInspector> Normalizer<'a, I> {
    /// Create a normalizer over the given introspection backend.
    pub fn new(inspector: &'a I) -> Self {
        Self { inspector }
    }

    /// Normalize a type handle at the given recursion depth.
    ///
    /// Callers start at depth 0; every structural descent (array element,
    /// union member, object property) recurses at `depth + 1`.
    pub fn normalize(&self, handle: &I::Handle, depth: usize) -> Normalized {
        if depth > MAX_DEPTH {
            return Normalized::present(Node::any());
        }

        match self.inspector.classify(handle) {
            TypeShape::Array => self.normalize_array(handle, depth),
            TypeShape::Union => self.normalize_union(handle, depth),
            TypeShape::Intersection => self.normalize_intersection(handle, depth),
            TypeShape::NumberLiteral | TypeShape::StringLiteral | TypeShape::BooleanLiteral => {
                self.normalize_literal(handle)
            }
            TypeShape::Boolean => Normalized::present(Node::boolean()),
            TypeShape::Number => Normalized::present(Node::number()),
            TypeShape::String => Normalized::present(Node::string()),
            TypeShape::Undefined | TypeShape::Void => Normalized::absent(),
            TypeShape::Null => Normalized::present(Node::null()),
            TypeShape::Any => Normalized::present(Node::any()),
            TypeShape::Object => self.normalize_object(handle, depth),
            TypeShape::TypeParameter | TypeShape::Conditional => {
                debug!(
                    type_name = %self.inspector.display_name(handle),
                    "Unresolved generic placeholder contributes no schema."
                );
                Normalized::placeholder()
            }
            TypeShape::Unknown => {
                debug!(
                    type_name = %self.inspector.display_name(handle),
                    "Unclassified type shape; attempting object processing."
                );
                self.normalize_object(handle, depth)
            }
        }
    }

    /// Normalize the built-in array shape.
    fn normalize_array(&self, handle: &I::Handle, depth: usize) -> Normalized {
        let Some(element) = self.inspector.element_type(handle) else {
            // Element not decomposable: degrade to an array of anything.
            return Normalized::present(Node::array(Node::any()));
        };
        let element_node = self
            .normalize(&element, depth + 1)
            .node
            .unwrap_or_else(Node::any);
        Normalized::present(Node::array(element_node))
    }

    /// Normalize a union, dropping absent members and simplifying the rest.
    fn normalize_union(&self, handle: &I::Handle, depth: usize) -> Normalized {
        let mut saw_absent = false;
        let mut branches = Vec::new();

        for member in self.inspector.members(handle) {
            let normalized = self.normalize(&member, depth + 1);
            match normalized.node {
                Some(node) => branches.push(node),
                // Placeholders contribute nothing but keep the slot required.
                None if normalized.required => {}
                None => saw_absent = true,
            }
        }

        if branches.is_empty() {
            return Normalized::absent();
        }

        let mut branches = merge_boolean_literals(branches);

        let node = if branches.len() == 1 {
            branches.remove(0)
        } else if let Some(collapsed) = collapse_literal_union(&branches) {
            collapsed
        } else {
            Node::or(branches)
        };

        Normalized {
            node: Some(node),
            required: !saw_absent,
        }
    }

    /// Normalize an intersection: every surviving member is mandatory.
    fn normalize_intersection(&self, handle: &I::Handle, depth: usize) -> Normalized {
        let mut branches = Vec::new();
        for member in self.inspector.members(handle) {
            if let Some(node) = self.normalize(&member, depth + 1).node {
                branches.push(node);
            }
        }

        match branches.len() {
            0 => Normalized::placeholder(),
            1 => Normalized::present(branches.remove(0)),
            _ => Normalized::present(Node::and(branches)),
        }
    }

    /// Normalize a literal shape into a primitive with `const` set.
    fn normalize_literal(&self, handle: &I::Handle) -> Normalized {
        match self.inspector.literal_value(handle) {
            Some(LiteralValue::String(value)) => Normalized::present(Node::string_const(value)),
            Some(LiteralValue::Number(value)) => {
                if value.is_finite() && value.fract().abs() < f64::EPSILON {
                    Normalized::present(Node::integer_const(value as i64))
                } else {
                    Normalized::present(Node::number_const(value))
                }
            }
            Some(LiteralValue::Boolean(value)) => Normalized::present(Node::boolean_const(value)),
            None => {
                debug!(
                    type_name = %self.inspector.display_name(handle),
                    "Literal shape without a literal value; treating as any."
                );
                Normalized::present(Node::any())
            }
        }
    }

    /// Normalize an object shape by enumerating its own properties.
    fn normalize_object(&self, handle: &I::Handle, depth: usize) -> Normalized {
        // Structurally empty records mean "nothing here": the caller must
        // omit the slot rather than emit an empty object schema.
        if self.inspector.is_empty_record(handle) {
            return Normalized::placeholder();
        }

        let mut properties = BTreeMap::new();
        for property in self.inspector.own_properties(handle) {
            if !property.locally_owned {
                debug!(
                    property = %property.name,
                    "Skipping property with externally-owned type."
                );
                continue;
            }
            let normalized = self.normalize(&property.handle, depth + 1);
            let Some(node) = normalized.node else {
                continue;
            };
            properties.insert(
                property.name,
                ObjectProperty {
                    node,
                    required: normalized.required,
                },
            );
        }

        Normalized::present(Node::new(NodeKind::Object(ObjectNode {
            properties,
            ..ObjectNode::default()
        })))
    }
}

/// Merge boolean-literal branches that span both truth values into a single
/// bare `Boolean` branch. Other branches pass through untouched.
fn merge_boolean_literals(branches: Vec<Node>) -> Vec<Node> {
    let mut saw_true = false;
    let mut saw_false = false;
    for branch in &branches {
        if let NodeKind::Boolean(primitive) = &branch.kind {
            match primitive.const_value {
                Some(true) => saw_true = true,
                Some(false) => saw_false = true,
                None => {}
            }
        }
    }
    if !(saw_true && saw_false) {
        return branches;
    }

    let mut merged = Vec::new();
    let mut boolean_emitted = false;
    for branch in branches {
        if matches!(branch.kind, NodeKind::Boolean(_)) {
            if !boolean_emitted {
                boolean_emitted = true;
                merged.push(Node::boolean());
            }
        } else {
            merged.push(branch);
        }
    }
    merged
}

/// Collapse a homogeneous union of literal constants into a single enum
/// node, so `'A' | 'B'` becomes a string enum instead of nested `anyOf`.
fn collapse_literal_union(branches: &[Node]) -> Option<Node> {
    if branches.len() < 2 {
        return None;
    }

    if let Some(values) = literal_values(branches, |kind| match kind {
        NodeKind::String(primitive) => primitive.const_value.clone(),
        _ => None,
    }) {
        return Some(Node::string_enum(dedupe(values)));
    }

    if let Some(values) = literal_values(branches, |kind| match kind {
        NodeKind::Integer(primitive) => primitive.const_value,
        _ => None,
    }) {
        return Some(Node::integer_enum(dedupe(values)));
    }

    // Mixed integer/float constants widen to a number enum.
    if let Some(values) = literal_values(branches, |kind| match kind {
        NodeKind::Integer(primitive) => primitive.const_value.map(|value| value as f64),
        NodeKind::Number(primitive) => primitive.const_value,
        _ => None,
    }) {
        return Some(Node::number_enum(dedupe(values)));
    }

    None
}

/// Extract one literal value per branch, or `None` if any branch does not
/// match the extractor.
fn literal_values<T>(
    branches: &[Node],
    extract: impl Fn(&NodeKind) -> Option<T>,
) -> Option<Vec<T>> {
    branches.iter().map(|branch| extract(&branch.kind)).collect()
}

/// De-duplicate preserving first-occurrence order.
fn dedupe<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fixture::{FixtureGraph, FixtureProperty, FixtureType};

    #[test]
    fn test_optional_union_returns_inner_node_non_required() {
        let mut graph = FixtureGraph::new();
        let string = graph.add(FixtureType::String);
        let undefined = graph.add(FixtureType::Undefined);
        let union = graph.add(FixtureType::Union {
            members: vec![string, undefined],
        });

        let normalized = Normalizer::new(&graph).normalize(&union, 0);
        assert_eq!(
            normalized.node.unwrap().kind,
            Node::string().kind,
            "union with undefined should degenerate to the inner node"
        );
        assert!(!normalized.required, "undefined branch should clear required");
    }

    #[test]
    fn test_boolean_literal_pair_merges_to_boolean() {
        let mut graph = FixtureGraph::new();
        let true_literal = graph.add(FixtureType::BooleanLiteral(true));
        let false_literal = graph.add(FixtureType::BooleanLiteral(false));
        let union = graph.add(FixtureType::Union {
            members: vec![true_literal, false_literal],
        });

        let normalized = Normalizer::new(&graph).normalize(&union, 0);
        assert_eq!(normalized.node.unwrap(), Node::boolean());
        assert!(normalized.required);
    }

    #[test]
    fn test_string_literal_union_collapses_to_enum() {
        let mut graph = FixtureGraph::new();
        let a = graph.add(FixtureType::StringLiteral("A".to_string()));
        let b = graph.add(FixtureType::StringLiteral("B".to_string()));
        let union = graph.add(FixtureType::Union { members: vec![a, b] });

        let normalized = Normalizer::new(&graph).normalize(&union, 0);
        assert_eq!(
            normalized.node.unwrap(),
            Node::string_enum(vec!["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn test_array_of_literal_union_keeps_enum_items() {
        let mut graph = FixtureGraph::new();
        let a = graph.add(FixtureType::StringLiteral("A".to_string()));
        let b = graph.add(FixtureType::StringLiteral("B".to_string()));
        let union = graph.add(FixtureType::Union { members: vec![a, b] });
        let array = graph.add(FixtureType::Array { element: union });

        let normalized = Normalizer::new(&graph).normalize(&array, 0);
        let expected = Node::array(Node::string_enum(vec!["A".to_string(), "B".to_string()]));
        assert_eq!(normalized.node.unwrap(), expected);
    }

    #[test]
    fn test_union_of_only_absent_members_is_absent() {
        let mut graph = FixtureGraph::new();
        let undefined = graph.add(FixtureType::Undefined);
        let void = graph.add(FixtureType::Void);
        let union = graph.add(FixtureType::Union {
            members: vec![undefined, void],
        });

        let normalized = Normalizer::new(&graph).normalize(&union, 0);
        assert_eq!(normalized, Normalized::absent());
    }

    #[test]
    fn test_numeric_literal_union_collapses_to_integer_enum() {
        let mut graph = FixtureGraph::new();
        let one = graph.add(FixtureType::NumberLiteral(1.0));
        let two = graph.add(FixtureType::NumberLiteral(2.0));
        let union = graph.add(FixtureType::Union {
            members: vec![one, two],
        });

        let normalized = Normalizer::new(&graph).normalize(&union, 0);
        assert_eq!(normalized.node.unwrap(), Node::integer_enum(vec![1, 2]));
    }

    #[test]
    fn test_intersection_folds_all_members() {
        let mut graph = FixtureGraph::new();
        let string = graph.add(FixtureType::String);
        let left = graph.add(FixtureType::Object {
            name: "Left".to_string(),
            properties: vec![FixtureProperty::local("a", string)],
        });
        let right = graph.add(FixtureType::Object {
            name: "Right".to_string(),
            properties: vec![FixtureProperty::local("b", string)],
        });
        let intersection = graph.add(FixtureType::Intersection {
            members: vec![left, right],
        });

        let normalized = Normalizer::new(&graph).normalize(&intersection, 0);
        let node = normalized.node.unwrap();
        match node.kind {
            NodeKind::And(branches) => assert_eq!(branches.len(), 2),
            other => panic!("expected And, got {other:?}"),
        }
        assert!(normalized.required, "intersections are always required");
    }

    #[test]
    fn test_empty_record_property_is_omitted() {
        let mut graph = FixtureGraph::new();
        let empty = graph.add(FixtureType::EmptyRecord);
        let string = graph.add(FixtureType::String);
        let object = graph.add(FixtureType::Object {
            name: "IFoo".to_string(),
            properties: vec![
                FixtureProperty::local("body", empty),
                FixtureProperty::local("accountId", string),
            ],
        });

        let normalized = Normalizer::new(&graph).normalize(&object, 0);
        let node = normalized.node.unwrap();
        let object = node.as_object().unwrap();
        assert!(!object.properties.contains_key("body"));
        assert!(object.properties.contains_key("accountId"));
    }

    #[test]
    fn test_foreign_property_types_are_skipped() {
        let mut graph = FixtureGraph::new();
        let string = graph.add(FixtureType::String);
        let foreign = graph.add(FixtureType::Object {
            name: "ExternalDate".to_string(),
            properties: vec![],
        });
        let object = graph.add(FixtureType::Object {
            name: "IEvent".to_string(),
            properties: vec![
                FixtureProperty::local("id", string),
                FixtureProperty::foreign("createdAt", foreign),
            ],
        });

        let normalized = Normalizer::new(&graph).normalize(&object, 0);
        let node = normalized.node.unwrap();
        let object = node.as_object().unwrap();
        assert_eq!(object.properties.len(), 1);
        assert!(object.properties.contains_key("id"));
    }

    #[test]
    fn test_type_parameter_property_contributes_nothing() {
        let mut graph = FixtureGraph::new();
        let parameter = graph.add(FixtureType::TypeParameter("T".to_string()));
        let object = graph.add(FixtureType::Object {
            name: "IWrapper".to_string(),
            properties: vec![FixtureProperty::local("payload", parameter)],
        });

        let normalized = Normalizer::new(&graph).normalize(&object, 0);
        let node = normalized.node.unwrap();
        assert!(node.as_object().unwrap().properties.is_empty());
    }

    #[test]
    fn test_unclassified_shape_falls_back_to_object_processing() {
        let mut graph = FixtureGraph::new();
        let string = graph.add(FixtureType::String);
        let opaque = graph.add(FixtureType::Opaque {
            name: "Mystery".to_string(),
            properties: vec![FixtureProperty::local("tag", string)],
        });

        let normalized = Normalizer::new(&graph).normalize(&opaque, 0);
        let node = normalized.node.unwrap();
        assert!(node.as_object().unwrap().properties.contains_key("tag"));
    }

    #[test]
    fn test_self_referential_type_terminates_at_depth_cap() {
        let mut graph = FixtureGraph::new();
        let cell = graph.reserve();
        graph.fill(
            cell,
            FixtureType::Object {
                name: "LinkedNode".to_string(),
                properties: vec![FixtureProperty::local("next", cell)],
            },
        );

        let normalized = Normalizer::new(&graph).normalize(&cell, 0);
        let mut node = normalized.node.unwrap();
        let mut layers = 0;
        loop {
            match node.kind {
                NodeKind::Object(object) => {
                    layers += 1;
                    node = object
                        .properties
                        .get("next")
                        .expect("each layer links to the next")
                        .node
                        .clone();
                }
                NodeKind::Any => break,
                other => panic!("expected object chain ending in Any, got {other:?}"),
            }
        }
        assert_eq!(layers, MAX_DEPTH + 1, "one object layer per depth step");
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let mut graph = FixtureGraph::new();
        let string = graph.add(FixtureType::String);
        let number = graph.add(FixtureType::Number);
        let object = graph.add(FixtureType::Object {
            name: "IAccount".to_string(),
            properties: vec![
                FixtureProperty::local("name", string),
                FixtureProperty::local("balance", number),
            ],
        });

        let normalizer = Normalizer::new(&graph);
        let first = normalizer.normalize(&object, 0);
        let second = normalizer.normalize(&object, 0);
        assert_eq!(first, second);
    }
}
