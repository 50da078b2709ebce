//! Individual particle data

use crate::context::EmitterId;
use ember_core::Vec3;

/// A single simulated point
///
/// Owned exclusively by its emitter for its lifetime. The invariant
/// `0 <= life <= max_life` is maintained by the integration step, which
/// clamps `life` at `max_life`; a particle is expired exactly when
/// `life == max_life`.
#[derive(Clone, Debug)]
pub struct Particle {
    /// Current position
    pub position: Vec3,
    /// Current velocity
    pub velocity: Vec3,
    /// Seconds lived so far
    pub life: f32,
    /// Total lifetime in seconds
    pub max_life: f32,
    /// Non-owning handle to a linked child emitter, set by hooks
    ///
    /// The owning [`ParticleSystem`](crate::ParticleSystem) holds the
    /// emitter itself; hooks resolve this handle through the effect
    /// context.
    pub attached_emitter: Option<EmitterId>,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            life: 0.0,
            max_life: 5.0,
            attached_emitter: None,
        }
    }
}

impl Particle {
    /// Create a fresh particle at a position, with zero velocity
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Get normalized life (0 = just spawned, 1 = expired)
    pub fn normalized_life(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    /// Check whether the particle has reached the end of its life
    pub fn is_expired(&self) -> bool {
        self.life >= self.max_life
    }
}
