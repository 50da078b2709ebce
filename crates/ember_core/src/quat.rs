//! Quaternion for 3D rotations

use crate::vec3::Vec3;

/// Quaternion for representing 3D rotations
///
/// Used for emitter orientation: initial particle velocities are sampled
/// around the local +Y axis and rotated into world space by a `Quat`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create from axis-angle representation
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let half_angle = angle * 0.5;
        let s = half_angle.sin();
        let len = axis.length();

        if len < 1e-6 {
            return Self::IDENTITY;
        }

        let inv_len = 1.0 / len;
        Self {
            x: axis.x * inv_len * s,
            y: axis.y * inv_len * s,
            z: axis.z * inv_len * s,
            w: half_angle.cos(),
        }
    }

    /// Normalize the quaternion
    pub fn normalize(&self) -> Self {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len < 1e-6 {
            return Self::IDENTITY;
        }
        let inv_len = 1.0 / len;
        Self {
            x: self.x * inv_len,
            y: self.y * inv_len,
            z: self.z * inv_len,
            w: self.w * inv_len,
        }
    }

    /// Get the conjugate (inverse for unit quaternions)
    pub fn conjugate(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Multiply two quaternions
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
        }
    }

    /// Rotate a vector by this quaternion
    pub fn rotate_vec3(&self, v: Vec3) -> Vec3 {
        let qv = Self::new(v.x, v.y, v.z, 0.0);
        let result = self.mul(&qv).mul(&self.conjugate());
        Vec3::new(result.x, result.y, result.z)
    }
}

impl std::ops::Mul for Quat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Quat::mul(&self, &rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_identity() {
        let q = Quat::IDENTITY;
        let v = Vec3::new(1.0, 2.0, 3.0);
        let rotated = q.rotate_vec3(v);

        assert!((rotated.x - v.x).abs() < 1e-5);
        assert!((rotated.y - v.y).abs() < 1e-5);
        assert!((rotated.z - v.z).abs() < 1e-5);
    }

    #[test]
    fn test_from_axis_angle() {
        // Rotate 90 degrees around Y axis
        let q = Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), PI / 2.0);
        let v = Vec3::new(1.0, 0.0, 0.0);
        let rotated = q.rotate_vec3(v);

        assert!((rotated.x - 0.0).abs() < 1e-5);
        assert!((rotated.y - 0.0).abs() < 1e-5);
        assert!((rotated.z - (-1.0)).abs() < 1e-5);
    }

    #[test]
    fn test_tilt_up_axis() {
        // Rotating +Y a quarter turn around Z lands on -X
        let q = Quat::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), PI / 2.0);
        let rotated = q.rotate_vec3(Vec3::UP);

        assert!((rotated.x - (-1.0)).abs() < 1e-5);
        assert!((rotated.y - 0.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_axis_is_identity() {
        let q = Quat::from_axis_angle(Vec3::ZERO, 1.0);
        assert_eq!(q, Quat::IDENTITY);
    }
}
