//! Interpolatable value types
//!
//! Curves are generic over any channel type that supports linear
//! interpolation: scalars, vectors, and colors.

use ember_core::{Color, Vec3};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(*self, *other, t)
    }
}

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(self, other, t)
    }
}
