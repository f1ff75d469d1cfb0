//! CPU-side mesh and model data.
//!
//! Meshes hold typed attribute arrays; a [`Model`] is a named collection of
//! meshes the way an imported asset delivers them. Uploading to the GPU is
//! the renderer collaborator's job.

use thiserror::Error;

/// Errors produced by mesh validation.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("mesh '{mesh}': {attribute} count {actual} does not match vertex count {expected}")]
    AttributeLengthMismatch {
        mesh: String,
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("mesh '{mesh}': index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },
    #[error("mesh '{mesh}': index count {count} is not a multiple of 3")]
    PartialTriangle { mesh: String, count: usize },
}

/// A triangle mesh with per-vertex attributes.
///
/// Positions and indices are mandatory; normals and UVs are optional but,
/// when present, must match the vertex count (checked by [`validate`]).
///
/// [`validate`]: CpuMesh::validate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuMesh {
    name: String,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
    material: Option<String>,
}

impl CpuMesh {
    /// Create a mesh from positions and triangle indices.
    pub fn new(name: impl Into<String>, positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            positions,
            normals: Vec::new(),
            uvs: Vec::new(),
            indices,
            material: None,
        }
    }

    /// Attach per-vertex normals.
    #[must_use]
    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = normals;
        self
    }

    /// Attach per-vertex texture coordinates.
    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<[f32; 2]>) -> Self {
        self.uvs = uvs;
        self
    }

    /// Attach a material name.
    #[must_use]
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Material name, if one was assigned.
    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check attribute lengths and index bounds.
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.positions.len();

        if !self.normals.is_empty() && self.normals.len() != vertex_count {
            return Err(MeshError::AttributeLengthMismatch {
                mesh: self.name.clone(),
                attribute: "normal",
                expected: vertex_count,
                actual: self.normals.len(),
            });
        }
        if !self.uvs.is_empty() && self.uvs.len() != vertex_count {
            return Err(MeshError::AttributeLengthMismatch {
                mesh: self.name.clone(),
                attribute: "uv",
                expected: vertex_count,
                actual: self.uvs.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle {
                mesh: self.name.clone(),
                count: self.indices.len(),
            });
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfBounds {
                mesh: self.name.clone(),
                index,
                vertex_count,
            });
        }

        Ok(())
    }
}

/// A named collection of meshes, as delivered by an asset importer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    meshes: Vec<CpuMesh>,
}

impl Model {
    /// Build a model from meshes, validating each one.
    pub fn from_meshes(meshes: Vec<CpuMesh>) -> Result<Self, MeshError> {
        for mesh in &meshes {
            mesh.validate()?;
        }
        log::debug!("model created with {} meshes", meshes.len());
        Ok(Self { meshes })
    }

    pub fn meshes(&self) -> &[CpuMesh] {
        &self.meshes
    }

    /// Find a mesh by name.
    pub fn mesh_by_name(&self, name: &str) -> Option<&CpuMesh> {
        self.meshes.iter().find(|m| m.name() == name)
    }

    /// Get a mesh by its position in the model.
    pub fn mesh_by_index(&self, index: usize) -> Option<&CpuMesh> {
        self.meshes.get(index)
    }

    /// Iterate over the mesh names in model order.
    pub fn mesh_names(&self) -> impl Iterator<Item = &str> {
        self.meshes.iter().map(|m| m.name())
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
