#![deny(unsafe_code)]
//! Core of the fog spotlight engine.
//!
//! Holds everything that is pure computation: the [`EngineConfig`] and its
//! validation, the deterministic [`NoiseField`], the [`SpotlightField`]
//! shared by both backends, the [`ParticleSwarm`] simulation, the CPU
//! [`FogShader`] with its GLSL twin, and the [`Surface`] paint abstraction.
//! GL program handling lives behind the `render` feature.

pub mod color;
pub mod config;
pub mod error;
pub mod noise_field;
pub mod prng;
pub mod shader;
pub mod spotlight;
pub mod surface;
pub mod swarm;
pub mod viewport;

#[cfg(feature = "render")]
pub mod render;

pub use color::{Rgba, Srgb};
pub use config::{Backend, EdgePolicy, EngineConfig, InactiveFog};
pub use error::EngineError;
pub use noise_field::{NoiseField, NoiseKind};
pub use prng::Xorshift64;
pub use shader::FogShader;
pub use spotlight::{SpotlightField, SpotlightState};
pub use surface::{GradientStop, PixelSurface, RadialEllipse, Surface};
pub use swarm::{ParticleSwarm, Puff};
pub use viewport::Viewport;
