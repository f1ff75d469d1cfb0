//! Scene Sandbox - hierarchical scene transforms with an entity layer
//!
//! The scene/entity core of a tutorial-style 3D rendering sandbox. The
//! rendering backend, windowing, and asset import live in external
//! collaborators; this crate owns everything between "an object exists" and
//! "here is its per-draw uniform data":
//!
//! - **Scene graph**: a parent/child transform hierarchy with cached world
//!   matrices, eager synchronous propagation, and change notification
//!   ([`scene::SceneGraph`])
//! - **Camera**: free-look camera with lazily recomputed view/projection
//!   matrices ([`scene::Camera`])
//! - **Entities**: a minimal component container tying scene nodes to
//!   meshes, materials, names, and visibility ([`ecs::World`])
//! - **Meshes**: CPU-side mesh/model data plus shape generators ([`mesh`])
//! - **Render iteration**: per-frame draw-list construction reading each
//!   world matrix once ([`render::build_draw_list`])

pub mod ecs;
pub mod material;
pub mod math;
pub mod mesh;
pub mod render;
pub mod scene;

pub use ecs::{Entity, MeshFilter, MeshRenderer, Name, Visibility, World};
pub use material::MaterialValue;
pub use mesh::{CpuMesh, MeshError, Model};
pub use render::{build_draw_list, DrawCommand};
pub use scene::{
    Camera, CameraUniformData, ListenerId, NodeId, ParentChanged, Projection, SceneGraph, Space,
    Transform, TransformChanged, TransformUniformData,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
