//! Error types for ember_particles

use thiserror::Error;

/// Errors that can occur while building or stepping particle effects
#[derive(Error, Debug)]
pub enum EffectError {
    /// Emitter or renderer configuration rejected at construction
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Attached renderer cannot hold the emitter's particle pool
    #[error("renderer capacity {capacity} cannot hold {required} particles")]
    RendererTooSmall {
        /// Renderer capacity in particles
        capacity: usize,
        /// The emitter's `max_particles`
        required: usize,
    },

    /// Lifecycle fault: the object was already disposed
    #[error("{0} used after dispose")]
    Disposed(&'static str),
}

/// Result type for ember_particles operations
pub type Result<T> = std::result::Result<T, EffectError>;
