//! Math helpers shared across the scene and render layers.
//!
//! Everything is `f32` and built on [`glam`]. The Euler-angle helpers use the
//! Y-X-Z (yaw, pitch, roll) convention used throughout the scene graph.

use glam::{EulerRot, Mat3, Quat, Vec3};

/// Tolerance used for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

/// Check whether two floats are approximately equal (within [`EPSILON`]).
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Check whether a float is approximately zero (within [`EPSILON`]).
#[inline]
pub fn approx_zero(a: f32) -> bool {
    a.abs() < EPSILON
}

/// Normalize an angle in radians to the half-open range `(-PI, PI]`.
pub fn normalize_angle(radians: f32) -> f32 {
    use std::f32::consts::PI;
    let mut a = radians % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a <= -PI {
        a += 2.0 * PI;
    }
    a
}

/// Build a quaternion from Euler angles in Y-X-Z order.
///
/// `euler.y` is yaw (about +Y), `euler.x` is pitch (about +X), and `euler.z`
/// is roll (about +Z), all in radians.
#[inline]
pub fn quat_from_euler_yxz(euler: Vec3) -> Quat {
    Quat::from_euler(EulerRot::YXZ, euler.y, euler.x, euler.z)
}

/// Decompose a quaternion into Y-X-Z Euler angles (radians).
///
/// Returns a vector with `x` = pitch, `y` = yaw, `z` = roll. Pitch is clamped
/// to ±90° at the gimbal-lock boundary (`|sin pitch| >= 1`), where yaw and
/// roll become coupled and only their sum is recoverable.
pub fn quat_to_euler_yxz(q: Quat) -> Vec3 {
    use std::f32::consts::FRAC_PI_2;

    // yaw (about Y)
    let siny_cosp = 2.0 * (q.w * q.y + q.z * q.x);
    let cosy_cosp = 1.0 - 2.0 * (q.x * q.x + q.y * q.y);
    let yaw = siny_cosp.atan2(cosy_cosp);

    // pitch (about X), clamped at the poles
    let sinp = 2.0 * (q.w * q.x - q.y * q.z);
    let pitch = if sinp.abs() >= 1.0 {
        FRAC_PI_2.copysign(sinp)
    } else {
        sinp.asin()
    };

    // roll (about Z)
    let sinr_cosp = 2.0 * (q.w * q.z + q.x * q.y);
    let cosr_cosp = 1.0 - 2.0 * (q.x * q.x + q.z * q.z);
    let roll = sinr_cosp.atan2(cosr_cosp);

    Vec3::new(pitch, yaw, roll)
}

/// Build a rotation whose +Z axis points along `forward`.
///
/// `forward` does not need to be normalized. When `forward` is parallel to
/// `up` (|dot| > 0.9999 after normalization), `up` falls back to +X to avoid
/// a degenerate cross product.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let forward = forward.normalize();
    let up = if forward.dot(up).abs() > 0.9999 {
        Vec3::X
    } else {
        up
    };

    let right = up.cross(forward).normalize();
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}

/// Build the shortest-arc rotation taking `from` to `to`.
///
/// Both inputs are normalized internally. Opposite directions rotate 180°
/// about an arbitrary perpendicular axis.
pub fn from_to_rotation(from: Vec3, to: Vec3) -> Quat {
    use std::f32::consts::PI;

    let from = from.normalize();
    let to = to.normalize();
    let dot = from.dot(to);

    if dot >= 1.0 - EPSILON {
        return Quat::IDENTITY;
    }

    if dot <= -1.0 + EPSILON {
        let mut axis = Vec3::X.cross(from);
        if axis.length_squared() < EPSILON {
            axis = Vec3::Y.cross(from);
        }
        return Quat::from_axis_angle(axis.normalize(), PI);
    }

    let cross = from.cross(to);
    let w = ((1.0 + dot) * 2.0).sqrt();
    let inv_w = 1.0 / w;
    Quat::from_xyzw(cross.x * inv_w, cross.y * inv_w, cross.z * inv_w, w * 0.5)
}

/// Angle in radians between two rotations.
pub fn angle_between(a: Quat, b: Quat) -> f32 {
    let dot = a.dot(b);
    dot.abs().min(1.0).acos() * 2.0
}
