//! Free-look camera with cached view and projection matrices.

use std::cell::Cell;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Camera projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    /// Perspective projection from a field of view in degrees.
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Projection::Perspective {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    /// Orthographic projection centered on the origin.
    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Projection::Orthographic {
            left: -half_w,
            right: half_w,
            bottom: -half_h,
            top: half_h,
            near,
            far,
        }
    }

    /// Compute the projection matrix.
    pub fn matrix(&self) -> Mat4 {
        match self {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(*fov_y, *aspect, *near, *far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh(*left, *right, *bottom, *top, *near, *far),
        }
    }

    pub fn near(&self) -> f32 {
        match self {
            Projection::Perspective { near, .. } => *near,
            Projection::Orthographic { near, .. } => *near,
        }
    }

    pub fn far(&self) -> f32 {
        match self {
            Projection::Perspective { far, .. } => *far,
            Projection::Orthographic { far, .. } => *far,
        }
    }
}

/// Free-look camera described by a position and yaw/pitch angles.
///
/// View and projection matrices are cached and recomputed lazily on read,
/// after a setter has invalidated them. This is deliberately different from
/// the scene graph, which recomputes eagerly on every write: the camera is
/// typically mutated several times per frame (input) and read once.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    /// Yaw in radians. -90° looks down -Z.
    yaw: f32,
    /// Pitch in radians, clamped to ±89° to keep the basis well-defined.
    pitch: f32,
    projection: Projection,
    view_cache: Cell<Option<Mat4>>,
    projection_cache: Cell<Option<Mat4>>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 2.0, 5.0))
    }
}

impl Camera {
    const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

    /// Create a camera at `position` looking down -Z with the default
    /// perspective projection.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: -std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
            projection: Projection::default(),
            view_cache: Cell::new(None),
            projection_cache: Cell::new(None),
        }
    }

    /// Create a camera with an explicit projection.
    pub fn with_projection(position: Vec3, projection: Projection) -> Self {
        Self {
            projection,
            ..Self::new(position)
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.view_cache.set(None);
    }

    /// Yaw angle in radians.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.view_cache.set(None);
    }

    /// Pitch angle in radians (clamped to ±89°).
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
        self.view_cache.set(None);
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.projection_cache.set(None);
    }

    /// Update the aspect ratio of a perspective projection after a resize.
    /// No effect on orthographic projections.
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = width / height;
            self.projection_cache.set(None);
        }
    }

    /// Point the camera at a world-space target by recomputing yaw/pitch.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = target - self.position;
        if dir.length_squared() < 1e-12 {
            return;
        }
        let dir = dir.normalize();
        self.pitch = dir.y.asin().clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
        self.yaw = dir.z.atan2(dir.x);
        self.view_cache.set(None);
    }

    /// Viewing direction derived from yaw and pitch.
    pub fn front(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    /// Right direction (perpendicular to front and world up).
    pub fn right(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize()
    }

    /// Up direction completing the camera basis.
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.front()).normalize()
    }

    /// The view matrix, recomputed only if a setter invalidated the cache.
    pub fn view_matrix(&self) -> Mat4 {
        if let Some(view) = self.view_cache.get() {
            return view;
        }
        let view = Mat4::look_at_rh(self.position, self.position + self.front(), self.up());
        self.view_cache.set(Some(view));
        view
    }

    /// The projection matrix, recomputed only if a setter invalidated the
    /// cache.
    pub fn projection_matrix(&self) -> Mat4 {
        if let Some(projection) = self.projection_cache.get() {
            return projection;
        }
        let projection = self.projection.matrix();
        self.projection_cache.set(Some(projection));
        projection
    }

    /// Combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Build camera uniform data for shaders.
    pub fn uniform_data(&self) -> CameraUniformData {
        let view = self.view_matrix();
        let proj = self.projection_matrix();

        CameraUniformData {
            view,
            proj,
            view_proj: proj * view,
            inv_view: view.inverse(),
            inv_proj: proj.inverse(),
            position: self.position.extend(1.0),
            near_far: Vec4::new(self.projection.near(), self.projection.far(), 0.0, 0.0),
        }
    }
}

/// Camera uniform data for GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniformData {
    pub view: Mat4,
    pub proj: Mat4,
    pub view_proj: Mat4,
    pub inv_view: Mat4,
    pub inv_proj: Mat4,
    pub position: Vec4,
    pub near_far: Vec4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_looks_down_negative_z() {
        let camera = Camera::new(Vec3::ZERO);
        assert!((camera.front() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.set_pitch(2.0);
        assert!(camera.pitch() <= Camera::MAX_PITCH + 1e-6);
        camera.set_pitch(-2.0);
        assert!(camera.pitch() >= -Camera::MAX_PITCH - 1e-6);
    }

    #[test]
    fn view_matrix_follows_position_change() {
        let mut camera = Camera::new(Vec3::ZERO);
        let before = camera.view_matrix();

        camera.set_position(Vec3::new(0.0, 0.0, 10.0));
        let after = camera.view_matrix();

        assert_ne!(before, after);
        let expected = Mat4::look_at_rh(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, 9.0),
            Vec3::Y,
        );
        assert!((after.to_cols_array().iter())
            .zip(expected.to_cols_array().iter())
            .all(|(a, b)| (a - b).abs() < 1e-5));
    }

    #[test]
    fn cached_view_is_stable_across_reads() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.view_matrix(), camera.view_matrix());
    }

    #[test]
    fn set_aspect_invalidates_projection() {
        let mut camera = Camera::new(Vec3::ZERO);
        let before = camera.projection_matrix();
        camera.set_aspect(1000.0, 500.0);
        assert_ne!(before, camera.projection_matrix());
    }

    #[test]
    fn look_at_turns_front_toward_target() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.look_at(Vec3::new(10.0, 0.0, 0.0));
        assert!((camera.front() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn uniform_data_is_consistent() {
        let camera = Camera::new(Vec3::new(0.0, 1.0, 5.0));
        let data = camera.uniform_data();
        let product = data.proj * data.view;
        assert!((product.to_cols_array().iter())
            .zip(data.view_proj.to_cols_array().iter())
            .all(|(a, b)| (a - b).abs() < 1e-5));
        assert_eq!(data.near_far.x, 0.1);
    }
}
