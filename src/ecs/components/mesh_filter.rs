use std::sync::Arc;

use crate::mesh::{CpuMesh, Model};

/// Selects which mesh of a [`Model`] an entity renders.
///
/// A model can hold several named meshes; the filter points at one of them.
/// Assigning a model selects its first mesh by default.
#[derive(Debug, Clone)]
pub struct MeshFilter {
    model: Arc<Model>,
    selected: Option<usize>,
}

impl MeshFilter {
    /// Create a filter for `model`, selecting its first mesh if it has one.
    pub fn new(model: Arc<Model>) -> Self {
        let selected = if model.is_empty() { None } else { Some(0) };
        Self { model, selected }
    }

    /// The model this filter draws from.
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Replace the model, resetting the selection to its first mesh.
    pub fn set_model(&mut self, model: Arc<Model>) {
        self.selected = if model.is_empty() { None } else { Some(0) };
        self.model = model;
    }

    /// Select a mesh by name. Returns `false` (leaving the selection
    /// unchanged) if no mesh has that name.
    pub fn select_mesh(&mut self, name: &str) -> bool {
        match self.model.meshes().iter().position(|m| m.name() == name) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => {
                log::warn!("model has no mesh named '{name}'");
                false
            }
        }
    }

    /// Select a mesh by its index in the model. Returns `false` if out of
    /// range.
    pub fn select_mesh_by_index(&mut self, index: usize) -> bool {
        if index < self.model.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    /// Index of the selected mesh, if any.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Name of the selected mesh, if any.
    pub fn selected_mesh_name(&self) -> Option<&str> {
        self.current_mesh().map(|m| m.name())
    }

    /// The selected mesh, if any.
    pub fn current_mesh(&self) -> Option<&CpuMesh> {
        self.selected.and_then(|i| self.model.mesh_by_index(i))
    }

    /// Whether a mesh is currently selected.
    pub fn has_mesh(&self) -> bool {
        self.current_mesh().is_some()
    }

    /// Names of all meshes available in the model.
    pub fn available_mesh_names(&self) -> impl Iterator<Item = &str> {
        self.model.mesh_names()
    }

    /// Index count of the selected mesh (0 when nothing is selected).
    pub fn index_count(&self) -> usize {
        self.current_mesh().map_or(0, |m| m.index_count())
    }

    /// Number of meshes in the model.
    pub fn mesh_count(&self) -> usize {
        self.model.len()
    }
}
