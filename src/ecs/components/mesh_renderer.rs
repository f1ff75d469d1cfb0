use std::collections::HashMap;

use crate::material::MaterialValue;

/// Render settings and material properties for an entity.
///
/// The property map holds named uniform values; the renderer collaborator
/// pushes them to its shader at draw time (unknown names are its problem to
/// absorb, not ours).
#[derive(Debug, Clone, Default)]
pub struct MeshRenderer {
    /// Skipped by the render iteration when false.
    pub enabled: bool,
    /// Draw order: lower values draw first.
    pub priority: i32,
    properties: HashMap<String, MaterialValue>,
}

impl MeshRenderer {
    /// Create an enabled renderer with default priority and no properties.
    pub fn new() -> Self {
        Self {
            enabled: true,
            priority: 0,
            properties: HashMap::new(),
        }
    }

    /// Returns this renderer with a draw priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set a material property.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<MaterialValue>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Get a material property.
    pub fn property(&self, name: &str) -> Option<&MaterialValue> {
        self.properties.get(name)
    }

    /// Remove a material property, returning its old value.
    pub fn remove_property(&mut self, name: &str) -> Option<MaterialValue> {
        self.properties.remove(name)
    }

    /// Iterate over all material properties.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &MaterialValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of material properties.
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}
