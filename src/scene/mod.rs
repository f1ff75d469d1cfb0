//! Scene layer: the transform hierarchy and the camera.

mod camera;
mod graph;
mod transform;

pub use camera::{Camera, CameraUniformData, Projection};
pub use graph::{
    ListenerId, NodeId, ParentChanged, SceneGraph, Space, TransformChanged,
};
pub use transform::{Transform, TransformUniformData};
