//! Component registry: named schemas collected during one documentation run.
//!
//! The registry maps a component name to its root IR node. Registration is
//! last-write-wins: duplicate declarations across files are warned about,
//! not reconciled, and the latest registration is authoritative. One
//! registry instance belongs to one documentation run and is discarded with
//! it.

use std::collections::BTreeMap;

use tracing::warn;

use crate::node::Node;

/// Named-schema store for one documentation run.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    schemas: BTreeMap<String, Node>,
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `node` under `name`, overwriting any previous registration.
    pub fn register(&mut self, name: impl Into<String>, node: Node) {
        let name = name.into();
        if self.schemas.insert(name.clone(), node).is_some() {
            warn!(
                component = %name,
                "Component registered more than once; keeping the last registration."
            );
        }
    }

    /// The node registered under `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<&Node> {
        self.schemas.get(name)
    }

    /// Whether no component has been registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Registered components in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.schemas.iter()
    }
}
