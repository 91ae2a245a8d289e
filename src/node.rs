//! Intermediate representation of normalized types.
//!
//! The normalizer reduces compiler-specific type handles into this closed
//! `Node` union; the schema emitter renders the union into OpenAPI schema
//! objects. Nodes are plain data: no handles, no lifetimes, no compiler
//! state, so they can be stored in the component registry and compared in
//! tests.

use std::collections::BTreeMap;

use serde_json::Value;

/// Annotations shared by every node variant.
///
/// These mirror what doc comments contribute to a schema: a display name,
/// prose, example payloads, and a default value. All fields are optional;
/// a freshly normalized node carries none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    /// Display name, emitted as the schema `title`.
    pub name: Option<String>,
    /// Primary description text.
    pub description: Option<String>,
    /// Secondary comment text, joined to the description on emission.
    pub comment: Option<String>,
    /// Example payload(s).
    pub examples: Option<Examples>,
    /// Default value.
    pub default: Option<Value>,
}

/// One example or several; the emitter picks the `example` scalar or the
/// `examples` list keyword accordingly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Examples {
    /// A single example payload.
    Single(Value),
    /// Multiple example payloads.
    Many(Vec<Value>),
}

/// A normalized type: shared annotations plus the shape-specific kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Annotations carried over from the source declaration.
    pub meta: Annotations,
    /// The structural shape of the type.
    pub kind: NodeKind,
}

/// The closed union of shapes a normalized type can take.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// The `null` literal type.
    Null,
    /// A string, optionally narrowed to a constant or a closed value set.
    String(Primitive<String>),
    /// A number, optionally narrowed to a constant or a closed value set.
    Number(Primitive<f64>),
    /// An integer, optionally narrowed to a constant or a closed value set.
    Integer(Primitive<i64>),
    /// A boolean, optionally narrowed to a constant.
    Boolean(Primitive<bool>),
    /// An unresolved or opaque type; permits any JSON value.
    Any,
    /// A homogeneous sequence.
    Array(Box<Node>),
    /// A fixed-arity sequence.
    Tuple(TupleNode),
    /// A structural record.
    Object(ObjectNode),
    /// An intersection: every branch must hold.
    And(Vec<Node>),
    /// A union: at least one branch holds.
    Or(Vec<Node>),
    /// A named reference to a registered component.
    Ref(String),
}

/// Constant/enum narrowing carried by a primitive kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Primitive<T> {
    /// Exact constant the type is narrowed to.
    pub const_value: Option<T>,
    /// Closed set of permitted values.
    pub enum_values: Option<Vec<T>>,
}

/// A fixed-arity sequence type.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleNode {
    /// Element types by position.
    pub elements: Vec<Node>,
    /// Whether elements past the declared positions are permitted.
    pub additional_items: BoolOrNode,
    /// Minimum number of elements.
    pub min_items: Option<u64>,
}

/// A structural record type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectNode {
    /// Named properties; `BTreeMap` keeps the ordering deterministic.
    pub properties: BTreeMap<String, ObjectProperty>,
    /// Whether undeclared properties are permitted.
    pub additional_properties: BoolOrNode,
}

/// A single object property.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    /// The property's normalized type.
    pub node: Node,
    /// `false` iff the source type admits `undefined`/`void` as a branch,
    /// or a union collapse removed every informative branch.
    pub required: bool,
}

/// Tri-state used for `additionalProperties` and `additionalItems`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BoolOrNode {
    /// Anything goes (the JSON Schema default); omitted on emission.
    #[default]
    Allowed,
    /// Explicitly forbidden.
    Denied,
    /// Constrained by a schema.
    Schema(Box<Node>),
}

impl Node {
    /// Wrap a kind with empty annotations.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            meta: Annotations::default(),
            kind,
        }
    }

    /// The `null` type.
    pub fn null() -> Self {
        Self::new(NodeKind::Null)
    }

    /// The unconstrained `any` type.
    pub fn any() -> Self {
        Self::new(NodeKind::Any)
    }

    /// A bare string.
    pub fn string() -> Self {
        Self::new(NodeKind::String(Primitive::default()))
    }

    /// A string narrowed to one constant.
    pub fn string_const(value: impl Into<String>) -> Self {
        Self::new(NodeKind::String(Primitive {
            const_value: Some(value.into()),
            enum_values: None,
        }))
    }

    /// A string narrowed to a closed value set.
    pub fn string_enum(values: Vec<String>) -> Self {
        Self::new(NodeKind::String(Primitive {
            const_value: None,
            enum_values: Some(values),
        }))
    }

    /// A bare number.
    pub fn number() -> Self {
        Self::new(NodeKind::Number(Primitive::default()))
    }

    /// A number narrowed to one constant.
    pub fn number_const(value: f64) -> Self {
        Self::new(NodeKind::Number(Primitive {
            const_value: Some(value),
            enum_values: None,
        }))
    }

    /// A number narrowed to a closed value set.
    pub fn number_enum(values: Vec<f64>) -> Self {
        Self::new(NodeKind::Number(Primitive {
            const_value: None,
            enum_values: Some(values),
        }))
    }

    /// A bare integer.
    pub fn integer() -> Self {
        Self::new(NodeKind::Integer(Primitive::default()))
    }

    /// An integer narrowed to one constant.
    pub fn integer_const(value: i64) -> Self {
        Self::new(NodeKind::Integer(Primitive {
            const_value: Some(value),
            enum_values: None,
        }))
    }

    /// An integer narrowed to a closed value set.
    pub fn integer_enum(values: Vec<i64>) -> Self {
        Self::new(NodeKind::Integer(Primitive {
            const_value: None,
            enum_values: Some(values),
        }))
    }

    /// A bare boolean.
    pub fn boolean() -> Self {
        Self::new(NodeKind::Boolean(Primitive::default()))
    }

    /// A boolean narrowed to one truth value.
    pub fn boolean_const(value: bool) -> Self {
        Self::new(NodeKind::Boolean(Primitive {
            const_value: Some(value),
            enum_values: None,
        }))
    }

    /// A homogeneous sequence of `element`.
    pub fn array(element: Self) -> Self {
        Self::new(NodeKind::Array(Box::new(element)))
    }

    /// A structural record with open additional properties.
    pub fn object(properties: BTreeMap<String, ObjectProperty>) -> Self {
        Self::new(NodeKind::Object(ObjectNode {
            properties,
            additional_properties: BoolOrNode::Allowed,
        }))
    }

    /// An intersection of `branches`.
    pub fn and(branches: Vec<Self>) -> Self {
        Self::new(NodeKind::And(branches))
    }

    /// A union of `branches`.
    pub fn or(branches: Vec<Self>) -> Self {
        Self::new(NodeKind::Or(branches))
    }

    /// A named reference to a registered component.
    pub fn reference(target: impl Into<String>) -> Self {
        Self::new(NodeKind::Ref(target.into()))
    }

    /// Set the display name, builder-style.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.meta.name = Some(name.into());
        self
    }

    /// The object shape, if this node is object-shaped at the top level.
    pub fn as_object(&self) -> Option<&ObjectNode> {
        match &self.kind {
            NodeKind::Object(object) => Some(object),
            _ => None,
        }
    }
}
