//! Particle emitter shapes

use crate::particle::Particle;
use ember_core::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Spawn-position policy for an emitter
///
/// Each variant produces a freshly constructed particle with its position
/// set and zero velocity; the emitter layers the initial velocity on top.
/// New spawn distributions are added as new variants.
#[derive(Clone, Debug)]
pub enum EmitterShape {
    /// Point with optional spherical position variance
    Point(PointShape),
}

impl Default for EmitterShape {
    fn default() -> Self {
        Self::Point(PointShape::default())
    }
}

impl EmitterShape {
    /// Spawn a particle according to the shape
    pub fn emit<R: Rng>(&self, rng: &mut R) -> Particle {
        match self {
            EmitterShape::Point(point) => point.emit(rng),
        }
    }

    /// Base position of the shape
    pub fn position(&self) -> Vec3 {
        match self {
            EmitterShape::Point(point) => point.position,
        }
    }

    /// Move the shape, e.g. to track a particle from an `on_step` hook
    pub fn set_position(&mut self, position: Vec3) {
        match self {
            EmitterShape::Point(point) => point.position = position,
        }
    }
}

/// Point emitter with a spherical radius variance
#[derive(Clone, Debug, Default)]
pub struct PointShape {
    /// Base spawn position
    pub position: Vec3,
    /// Maximum radius of the random offset around the base position
    pub radius_variance: f32,
}

impl PointShape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            radius_variance: 0.0,
        }
    }

    pub fn with_radius_variance(mut self, variance: f32) -> Self {
        self.radius_variance = variance;
        self
    }

    /// Spawn a particle at the base position plus a random offset
    ///
    /// Azimuth is drawn uniformly in `[0, 2pi)`, polar angle in `[0, pi)`
    /// and radius in `[0, radius_variance)`, three draws in that order.
    /// This is intentionally not volume-uniform over the sphere; effect
    /// tuning depends on the density bias toward the poles and center.
    pub fn emit<R: Rng>(&self, rng: &mut R) -> Particle {
        let phi = rng.gen::<f32>() * TAU;
        let theta = rng.gen::<f32>() * PI;
        let radius = rng.gen::<f32>() * self.radius_variance;

        let dir = Vec3::new(
            theta.sin() * phi.cos(),
            theta.cos(),
            theta.sin() * phi.sin(),
        );

        Particle::at(self.position + dir * radius)
    }
}
