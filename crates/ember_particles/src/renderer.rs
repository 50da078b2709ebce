//! Point-sprite buffer adapter for the external rendering stage

use crate::error::{EffectError, Result};
use crate::particle::Particle;

/// Shader uniform values published alongside the vertex buffers
///
/// `time` is total elapsed simulation time in seconds and only moves
/// forward; `spin_speed` is constant per emitter, in radians per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpriteUniforms {
    pub time: f32,
    pub spin_speed: f32,
}

/// Fixed-capacity mirror of an emitter's live particle list
///
/// Maintains parallel arrays of positions (3 floats each) and normalized
/// life (1 float each) plus a draw range equal to the live count. The
/// adapter is render-target agnostic: the external stage reads the
/// buffers and uniforms, uploads them, and draws. Capacity must cover
/// the owning emitter's `max_particles`, which
/// [`Emitter::new`](crate::Emitter::new) enforces.
#[derive(Debug)]
pub struct PointSpriteRenderer {
    capacity: usize,
    positions: Vec<f32>,
    lives: Vec<f32>,
    draw_count: usize,
    uniforms: SpriteUniforms,
    disposed: bool,
}

impl PointSpriteRenderer {
    /// Create an adapter able to mirror up to `capacity` particles
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(EffectError::InvalidConfig(
                "renderer capacity must be at least 1".into(),
            ));
        }
        Ok(Self {
            capacity,
            positions: vec![0.0; capacity * 3],
            lives: vec![0.0; capacity],
            draw_count: 0,
            uniforms: SpriteUniforms::default(),
            disposed: false,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live particles to draw this frame
    pub fn draw_count(&self) -> usize {
        self.draw_count
    }

    /// Position buffer, 3 floats per slot, live data in the prefix
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Normalized life buffer, live data in the prefix
    pub fn lives(&self) -> &[f32] {
        &self.lives
    }

    pub fn uniforms(&self) -> SpriteUniforms {
        self.uniforms
    }

    /// Position buffer bytes for upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Life buffer bytes for upload
    pub fn life_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.lives)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Overwrite the buffer prefix from the live particle list, in order
    ///
    /// Sets the draw range to the list length and publishes the frame's
    /// uniform values.
    pub fn update_from_particles(
        &mut self,
        particles: &[Particle],
        spin_speed: f32,
        time: f32,
    ) -> Result<()> {
        if self.disposed {
            return Err(EffectError::Disposed("point sprite renderer"));
        }
        // Emitter construction guarantees capacity >= max_particles
        debug_assert!(particles.len() <= self.capacity);

        for (i, p) in particles.iter().enumerate() {
            self.positions[i * 3] = p.position.x;
            self.positions[i * 3 + 1] = p.position.y;
            self.positions[i * 3 + 2] = p.position.z;
            self.lives[i] = p.life / p.max_life;
        }

        self.draw_count = particles.len();
        self.uniforms.time = time;
        self.uniforms.spin_speed = spin_speed;
        Ok(())
    }

    /// Release the buffers; further updates fail fast
    pub fn dispose(&mut self) {
        self.positions = Vec::new();
        self.lives = Vec::new();
        self.draw_count = 0;
        self.disposed = true;
    }
}
