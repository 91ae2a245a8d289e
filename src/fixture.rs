//! An in-memory type graph implementing the introspection contract.
//!
//! Real documentation runs sit on top of a compiler's type checker; the
//! fixture graph replaces it with an arena of hand-built shapes so the
//! normalizer and assembler can be exercised hermetically. Handles are
//! arena indices, and [`FixtureGraph::reserve`]/[`FixtureGraph::fill`]
//! allow self-referential graphs to be constructed.

use crate::adapter::{LiteralValue, OwnProperty, TypeInspector, TypeShape};

/// Handle into a [`FixtureGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeId(usize);

/// One hand-built type shape.
#[derive(Debug, Clone)]
pub enum FixtureType {
    /// Array of an element type.
    Array {
        /// Element type handle.
        element: TypeId,
    },
    /// Union of member types.
    Union {
        /// Member handles.
        members: Vec<TypeId>,
    },
    /// Intersection of member types.
    Intersection {
        /// Member handles.
        members: Vec<TypeId>,
    },
    /// A string literal type.
    StringLiteral(String),
    /// A numeric literal type.
    NumberLiteral(f64),
    /// A boolean literal type.
    BooleanLiteral(bool),
    /// The bare `string` primitive.
    String,
    /// The bare `number` primitive.
    Number,
    /// The bare `boolean` primitive.
    Boolean,
    /// The `undefined` type.
    Undefined,
    /// The `void` type.
    Void,
    /// The `null` type.
    Null,
    /// The `any` type.
    Any,
    /// A named object type with properties.
    Object {
        /// Display name.
        name: String,
        /// Own properties.
        properties: Vec<FixtureProperty>,
    },
    /// A structurally empty record (`Record<string, never>`).
    EmptyRecord,
    /// An unresolved generic type parameter.
    TypeParameter(String),
    /// An unresolved conditional type.
    Conditional,
    /// A shape the backend cannot classify; still enumerable as an object.
    Opaque {
        /// Display name.
        name: String,
        /// Own properties.
        properties: Vec<FixtureProperty>,
    },
    /// A reserved slot not yet filled; classifies as `any`.
    Unresolved,
}

/// One property of a fixture object.
#[derive(Debug, Clone)]
pub struct FixtureProperty {
    /// Property name.
    pub name: String,
    /// Handle of the property's declared type.
    pub target: TypeId,
    /// Whether the property's type counts as project-owned.
    pub locally_owned: bool,
}

impl FixtureProperty {
    /// A property whose type is declared within the project.
    pub fn local(name: impl Into<String>, target: TypeId) -> Self {
        Self {
            name: name.into(),
            target,
            locally_owned: true,
        }
    }

    /// A property whose type comes from the standard library or an
    /// external dependency.
    pub fn foreign(name: impl Into<String>, target: TypeId) -> Self {
        Self {
            name: name.into(),
            target,
            locally_owned: false,
        }
    }
}

/// Arena of fixture types.
#[derive(Debug, Default)]
pub struct FixtureGraph {
    types: Vec<FixtureType>,
}

impl FixtureGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape and return its handle.
    pub fn add(&mut self, fixture: FixtureType) -> TypeId {
        self.types.push(fixture);
        TypeId(self.types.len() - 1)
    }

    /// Reserve a handle to be filled later; needed for cyclic graphs.
    pub fn reserve(&mut self) -> TypeId {
        self.add(FixtureType::Unresolved)
    }

    /// Fill a reserved handle. Out-of-range handles are ignored.
    pub fn fill(&mut self, id: TypeId, fixture: FixtureType) {
        if let Some(slot) = self.types.get_mut(id.0) {
            *slot = fixture;
        }
    }

    fn get(&self, id: TypeId) -> &FixtureType {
        static UNRESOLVED: FixtureType = FixtureType::Unresolved;
        self.types.get(id.0).unwrap_or(&UNRESOLVED)
    }
}

impl TypeInspector for FixtureGraph {
    type Handle = TypeId;

    fn classify(&self, handle: &TypeId) -> TypeShape {
        match self.get(*handle) {
            FixtureType::Array { .. } => TypeShape::Array,
            FixtureType::Union { .. } => TypeShape::Union,
            FixtureType::Intersection { .. } => TypeShape::Intersection,
            FixtureType::StringLiteral(_) => TypeShape::StringLiteral,
            FixtureType::NumberLiteral(_) => TypeShape::NumberLiteral,
            FixtureType::BooleanLiteral(_) => TypeShape::BooleanLiteral,
            FixtureType::String => TypeShape::String,
            FixtureType::Number => TypeShape::Number,
            FixtureType::Boolean => TypeShape::Boolean,
            FixtureType::Undefined => TypeShape::Undefined,
            FixtureType::Void => TypeShape::Void,
            FixtureType::Null => TypeShape::Null,
            FixtureType::Any | FixtureType::Unresolved => TypeShape::Any,
            FixtureType::Object { .. } | FixtureType::EmptyRecord => TypeShape::Object,
            FixtureType::TypeParameter(_) => TypeShape::TypeParameter,
            FixtureType::Conditional => TypeShape::Conditional,
            FixtureType::Opaque { .. } => TypeShape::Unknown,
        }
    }

    fn element_type(&self, handle: &TypeId) -> Option<TypeId> {
        match self.get(*handle) {
            FixtureType::Array { element } => Some(*element),
            _ => None,
        }
    }

    fn members(&self, handle: &TypeId) -> Vec<TypeId> {
        match self.get(*handle) {
            FixtureType::Union { members } | FixtureType::Intersection { members } => {
                members.clone()
            }
            _ => Vec::new(),
        }
    }

    fn literal_value(&self, handle: &TypeId) -> Option<LiteralValue> {
        match self.get(*handle) {
            FixtureType::StringLiteral(value) => Some(LiteralValue::String(value.clone())),
            FixtureType::NumberLiteral(value) => Some(LiteralValue::Number(*value)),
            FixtureType::BooleanLiteral(value) => Some(LiteralValue::Boolean(*value)),
            _ => None,
        }
    }

    fn own_properties(&self, handle: &TypeId) -> Vec<OwnProperty<TypeId>> {
        match self.get(*handle) {
            FixtureType::Object { properties, .. } | FixtureType::Opaque { properties, .. } => {
                properties
                    .iter()
                    .map(|property| OwnProperty {
                        name: property.name.clone(),
                        handle: property.target,
                        locally_owned: property.locally_owned,
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    fn is_empty_record(&self, handle: &TypeId) -> bool {
        matches!(self.get(*handle), FixtureType::EmptyRecord)
    }

    fn display_name(&self, handle: &TypeId) -> String {
        match self.get(*handle) {
            FixtureType::Object { name, .. } | FixtureType::Opaque { name, .. } => name.clone(),
            FixtureType::TypeParameter(name) => name.clone(),
            FixtureType::StringLiteral(value) => format!("'{value}'"),
            FixtureType::NumberLiteral(value) => value.to_string(),
            FixtureType::BooleanLiteral(value) => value.to_string(),
            FixtureType::Array { .. } => "array".to_string(),
            FixtureType::Union { .. } => "union".to_string(),
            FixtureType::Intersection { .. } => "intersection".to_string(),
            FixtureType::String => "string".to_string(),
            FixtureType::Number => "number".to_string(),
            FixtureType::Boolean => "boolean".to_string(),
            FixtureType::Undefined => "undefined".to_string(),
            FixtureType::Void => "void".to_string(),
            FixtureType::Null => "null".to_string(),
            FixtureType::Any => "any".to_string(),
            FixtureType::EmptyRecord => "Record<string, never>".to_string(),
            FixtureType::Conditional => "conditional".to_string(),
            FixtureType::Unresolved => "unresolved".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_then_fill_builds_cycles() {
        let mut graph = FixtureGraph::new();
        let cell = graph.reserve();
        assert_eq!(graph.classify(&cell), TypeShape::Any);

        graph.fill(
            cell,
            FixtureType::Object {
                name: "Node".to_string(),
                properties: vec![FixtureProperty::local("next", cell)],
            },
        );
        assert_eq!(graph.classify(&cell), TypeShape::Object);
        let properties = graph.own_properties(&cell);
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].handle, cell);
    }

    #[test]
    fn test_display_names() {
        let mut graph = FixtureGraph::new();
        let literal = graph.add(FixtureType::StringLiteral("A".to_string()));
        assert_eq!(graph.display_name(&literal), "'A'");
        let record = graph.add(FixtureType::EmptyRecord);
        assert_eq!(graph.display_name(&record), "Record<string, never>");
    }
}
