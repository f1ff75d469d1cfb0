mod mesh_filter;
mod mesh_renderer;
mod name;
mod visibility;

pub use mesh_filter::MeshFilter;
pub use mesh_renderer::MeshRenderer;
pub use name::Name;
pub use visibility::Visibility;
