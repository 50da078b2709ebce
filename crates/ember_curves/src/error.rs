//! Error types for ember_curves

use thiserror::Error;

/// Errors raised when constructing a curve from keyframes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// A curve needs at least one keyframe
    #[error("curve has no keyframes")]
    Empty,

    /// Keyframe times must be strictly ascending
    #[error("keyframe {index} is not after its predecessor")]
    NonAscending {
        /// Index of the offending keyframe
        index: usize,
    },

    /// Keyframe times must be finite
    #[error("keyframe {index} has a non-finite time")]
    NonFiniteTime {
        /// Index of the offending keyframe
        index: usize,
    },
}

/// Result type for ember_curves operations
pub type Result<T> = std::result::Result<T, CurveError>;
