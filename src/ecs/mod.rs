//! Minimal entity-component container.
//!
//! Entities are generational ids; each one owns a node in the world's
//! [`SceneGraph`](crate::scene::SceneGraph) and an optional fixed set of
//! render-facing components.

mod components;
mod entity;
mod world;

pub use components::{MeshFilter, MeshRenderer, Name, Visibility};
pub use entity::Entity;
pub use world::World;
