//! Schema emission: rendering IR nodes into OpenAPI schema objects.
//!
//! [`to_schema`] is a pure function over the closed [`NodeKind`] union. The
//! match is exhaustive, so a new IR variant without an emission rule is a
//! compile error rather than a runtime condition.
//!
//! `SchemaObject` is a single struct covering both schema and reference
//! objects: a `$ref` entry is just a schema whose `ref_path` is set, which
//! lets references carry their own annotation overlay (title, description)
//! distinct from the referenced component's.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::node::{Annotations, BoolOrNode, Examples, Node, NodeKind, Primitive};

/// The subset of an OpenAPI 3.1 schema object this generator produces.
///
/// Every field is optional and omitted from the serialized document when
/// unset, so the JSON output contains exactly what the IR implies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaObject {
    /// Reference to another schema (`#/components/schemas/{name}`).
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    /// Schema title, sourced from the node's display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description text (declaration description and comment joined by a
    /// blank line).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The schema type keyword.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,

    /// Constant value the schema is narrowed to.
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    /// Closed set of permitted values.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    /// Element schema for array types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaObject>>,

    /// Positional element schemas for tuple types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_items: Option<Vec<SchemaObject>>,

    /// Whether elements past the declared tuple positions are permitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_items: Option<BoolOrSchema>,

    /// Minimum number of elements for tuple types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    /// Properties for object types; omitted entirely when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaObject>>,

    /// Required property names; omitted entirely when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    /// Whether undeclared properties are permitted; omitted when open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<BoolOrSchema>,

    /// Intersection branches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<SchemaObject>>,

    /// Union branches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<SchemaObject>>,

    /// Single example payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// Multiple example payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Value>>,

    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// A boolean or a nested schema, as `additionalProperties` and
/// `additionalItems` allow both forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BoolOrSchema {
    /// The plain boolean form.
    Bool(bool),
    /// The schema form.
    Schema(Box<SchemaObject>),
}

impl SchemaObject {
    /// A bare `$ref` to a registered component.
    pub fn reference(name: &str) -> Self {
        Self {
            ref_path: Some(format!("#/components/schemas/{name}")),
            ..Self::default()
        }
    }
}

/// Render a normalized node into its OpenAPI schema object.
pub fn to_schema(node: &Node) -> SchemaObject {
    let mut schema = annotation_schema(&node.meta);

    match &node.kind {
        NodeKind::Null => {
            schema.schema_type = Some("null".to_string());
        }
        NodeKind::String(primitive) => {
            schema.schema_type = Some("string".to_string());
            apply_primitive(&mut schema, primitive, |value| Value::from(value.clone()));
        }
        NodeKind::Number(primitive) => {
            schema.schema_type = Some("number".to_string());
            apply_primitive(&mut schema, primitive, |value| Value::from(*value));
        }
        NodeKind::Integer(primitive) => {
            schema.schema_type = Some("integer".to_string());
            apply_primitive(&mut schema, primitive, |value| Value::from(*value));
        }
        NodeKind::Boolean(primitive) => {
            schema.schema_type = Some("boolean".to_string());
            apply_primitive(&mut schema, primitive, |value| Value::from(*value));
        }
        NodeKind::Any => {
            // Bare annotation object: no `type` keyword permits any value.
        }
        NodeKind::Array(element) => {
            schema.schema_type = Some("array".to_string());
            schema.items = Some(Box::new(to_schema(element)));
        }
        NodeKind::Tuple(tuple) => {
            schema.schema_type = Some("array".to_string());
            schema.prefix_items = Some(tuple.elements.iter().map(to_schema).collect());
            schema.additional_items = bool_or_schema(&tuple.additional_items);
            schema.min_items = tuple.min_items;
        }
        NodeKind::Object(object) => {
            schema.schema_type = Some("object".to_string());
            if !object.properties.is_empty() {
                schema.properties = Some(
                    object
                        .properties
                        .iter()
                        .map(|(name, property)| (name.clone(), to_schema(&property.node)))
                        .collect(),
                );
                let required: Vec<String> = object
                    .properties
                    .iter()
                    .filter(|(_, property)| property.required)
                    .map(|(name, _)| name.clone())
                    .collect();
                if !required.is_empty() {
                    schema.required = Some(required);
                }
            }
            schema.additional_properties = bool_or_schema(&object.additional_properties);
        }
        NodeKind::And(branches) => {
            schema.all_of = Some(branches.iter().map(to_schema).collect());
        }
        NodeKind::Or(branches) => {
            schema.any_of = Some(branches.iter().map(to_schema).collect());
        }
        NodeKind::Ref(target) => {
            schema.ref_path = Some(format!("#/components/schemas/{target}"));
        }
    }

    schema
}

/// Seed a schema with the node's annotation overlay.
fn annotation_schema(meta: &Annotations) -> SchemaObject {
    let description = match (&meta.description, &meta.comment) {
        (None, None) => None,
        (description, comment) => {
            let parts: Vec<&str> = [description.as_deref(), comment.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            Some(parts.join("\n\n"))
        }
    };

    let (example, examples) = match &meta.examples {
        Some(Examples::Single(value)) => (Some(value.clone()), None),
        Some(Examples::Many(values)) => (None, Some(values.clone())),
        None => (None, None),
    };

    SchemaObject {
        title: meta.name.clone(),
        description,
        example,
        examples,
        default: meta.default.clone(),
        ..SchemaObject::default()
    }
}

/// Copy a primitive's const/enum narrowing into the schema.
fn apply_primitive<T>(
    schema: &mut SchemaObject,
    primitive: &Primitive<T>,
    convert: impl Fn(&T) -> Value,
) {
    schema.const_value = primitive.const_value.as_ref().map(&convert);
    schema.enum_values = primitive
        .enum_values
        .as_ref()
        .map(|values| values.iter().map(&convert).collect());
}

/// Map the IR tri-state onto the serialized form; `Allowed` is the JSON
/// Schema default and stays unwritten.
fn bool_or_schema(value: &BoolOrNode) -> Option<BoolOrSchema> {
    match value {
        BoolOrNode::Allowed => None,
        BoolOrNode::Denied => Some(BoolOrSchema::Bool(false)),
        BoolOrNode::Schema(node) => Some(BoolOrSchema::Schema(Box::new(to_schema(node)))),
    }
}
