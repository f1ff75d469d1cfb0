//! Material property values.
//!
//! A material here is a bag of named uniform values owned by a
//! [`MeshRenderer`](crate::ecs::MeshRenderer). The renderer collaborator
//! matches them against its shader's uniforms at draw time.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// A single material property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl MaterialValue {
    /// Name of the contained type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Vec2(_) => "vec2",
            Self::Vec3(_) => "vec3",
            Self::Vec4(_) => "vec4",
            Self::Mat4(_) => "mat4",
        }
    }
}

impl From<f32> for MaterialValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for MaterialValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for MaterialValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec2> for MaterialValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for MaterialValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec4> for MaterialValue {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<Mat4> for MaterialValue {
    fn from(v: Mat4) -> Self {
        Self::Mat4(v)
    }
}
