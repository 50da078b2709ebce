//! # Ember Particles
//!
//! CPU-side particle simulation driving GPU-rendered point sprites for
//! fire, smoke, and firework effects.
//!
//! A [`ParticleSystem`] owns a set of [`Emitter`]s; each emitter owns a
//! bounded particle pool, emits on a timer, integrates gravity and drag,
//! and mirrors its live particles into a [`PointSpriteRenderer`] that
//! the external rendering stage reads. Optional hooks fire at particle
//! creation, step, and destruction, and can chain emitters together
//! (a firework rocket trailing smoke, popping into a burst).
//!
//! The simulation is single-threaded and deterministic given a seed: all
//! state changes happen inside [`ParticleSystem::step`], once per frame.
//!
//! # Example
//!
//! ```
//! use ember_particles::{Emitter, EmitterParams, ParticleSystem};
//!
//! let params = EmitterParams::new()
//!     .with_emission_rate(10.0)
//!     .with_max_life(2.0)
//!     .with_velocity_magnitude(5.0)
//!     .with_gravity(1.0);
//!
//! let mut system = ParticleSystem::with_seed(1);
//! system.add_emitter(Emitter::new(params)?);
//!
//! system.step(0.1, 0.1)?;
//! assert!(system.still_active());
//! # Ok::<(), ember_particles::EffectError>(())
//! ```

pub mod context;
pub mod emitter;
pub mod error;
pub mod particle;
pub mod renderer;
pub mod shape;
pub mod system;

pub use context::{EffectContext, EmitterId};
pub use emitter::{Emitter, EmitterParams, ParticleHook, DEFAULT_DRAG, GRAVITY};
pub use error::{EffectError, Result};
pub use particle::Particle;
pub use renderer::{PointSpriteRenderer, SpriteUniforms};
pub use shape::{EmitterShape, PointShape};
pub use system::ParticleSystem;
