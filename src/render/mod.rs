//! Render iteration.
//!
//! [`build_draw_list`] walks the world once per frame and produces the flat
//! list of draw commands an external renderer consumes. Each entity's world
//! matrix is read exactly once, after which the command carries everything a
//! backend needs to fill its per-draw uniforms. No GPU work happens here.

use std::sync::Arc;

use glam::Mat4;

use crate::ecs::{Entity, World};
use crate::mesh::{CpuMesh, Model};
use crate::scene::{Camera, TransformUniformData};

/// One mesh draw with resolved transform uniforms.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    /// Entity this draw belongs to, for material-property lookup.
    pub entity: Entity,
    /// Model the mesh comes from.
    pub model: Arc<Model>,
    /// Index of the selected mesh within the model.
    pub mesh_index: usize,
    /// Draw priority the list was sorted by (lower draws first).
    pub priority: i32,
    /// Model and normal matrices for the per-draw uniform buffer.
    pub transform: TransformUniformData,
    /// Premultiplied model-view-projection matrix.
    pub mvp: Mat4,
}

impl DrawCommand {
    /// The mesh to draw.
    pub fn mesh(&self) -> Option<&CpuMesh> {
        self.model.mesh_by_index(self.mesh_index)
    }
}

/// Build the frame's draw list.
///
/// Includes every alive entity that is visible, has an enabled
/// [`MeshRenderer`](crate::ecs::MeshRenderer), and has a
/// [`MeshFilter`](crate::ecs::MeshFilter) with a selected mesh. Commands are
/// sorted by render priority (stable, so equal priorities keep entity
/// order).
pub fn build_draw_list(world: &World, camera: &Camera) -> Vec<DrawCommand> {
    let view_proj = camera.view_projection_matrix();
    let mut commands = Vec::new();

    for entity in world.iter() {
        if !world.visibility(entity).is_visible() {
            continue;
        }
        let Some(renderer) = world.mesh_renderer(entity) else {
            continue;
        };
        if !renderer.enabled {
            continue;
        }
        let Some(filter) = world.mesh_filter(entity) else {
            continue;
        };
        let Some(mesh_index) = filter.selected_index() else {
            continue;
        };

        // The single per-draw world matrix read
        let model_matrix = world.graph().local_to_world_matrix(world.node(entity));

        commands.push(DrawCommand {
            entity,
            model: Arc::clone(filter.model()),
            mesh_index,
            priority: renderer.priority,
            transform: TransformUniformData::from_matrix(model_matrix),
            mvp: view_proj * model_matrix,
        });
    }

    commands.sort_by_key(|command| command.priority);
    log::trace!("built draw list with {} commands", commands.len());
    commands
}
