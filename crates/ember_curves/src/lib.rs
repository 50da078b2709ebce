//! # Ember Curves
//!
//! Time-keyed piecewise-linear curves for particle shading.
//!
//! A curve is built once from keyframes, evaluated with clamped linear
//! interpolation, and optionally baked into a fixed-resolution lookup
//! table that the (external) shading stage samples as a 1D texture.
//! Baking happens at effect setup, never per frame.
//!
//! # Example
//!
//! ```
//! use ember_curves::{FloatInterpolant, Keyframe};
//!
//! let size_over_life = FloatInterpolant::new(vec![
//!     Keyframe::new(0.0, 2.0),
//!     Keyframe::new(0.1, 5.0),
//!     Keyframe::new(5.0, 0.0),
//! ])
//! .unwrap();
//!
//! assert_eq!(size_over_life.evaluate(0.1), 5.0);
//! let table = size_over_life.bake();
//! assert_eq!(table.channels, 1);
//! ```

pub mod error;
pub mod interpolant;
pub mod lookup;
pub mod values;

pub use error::{CurveError, Result};
pub use interpolant::{ColorInterpolant, FloatInterpolant, Interpolant, Keyframe, Vec3Interpolant};
pub use lookup::LookupTable;
pub use values::Interpolate;
