//! # Ember Core
//!
//! Shared value types for the ember particle effects engine.
//!
//! This crate provides:
//! - **Vec3** with the arithmetic operators the simulation loop needs
//! - **Quat** for emitter orientation and velocity-cone rotation
//! - **Color** in linear RGBA with interpolation and HSL construction

pub mod color;
pub mod quat;
pub mod vec3;

pub use color::Color;
pub use quat::Quat;
pub use vec3::Vec3;
