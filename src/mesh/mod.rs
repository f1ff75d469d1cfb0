//! CPU-side mesh data and shape generators.

mod data;
mod generators;

pub use data::{CpuMesh, MeshError, Model};
pub use generators::{generate_cube, generate_quad, generate_sphere};
