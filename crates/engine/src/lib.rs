#![deny(unsafe_code)]
//! Renderers, animation driver and frame scheduling for the fog engine.
//!
//! This crate sits between `fog-core` (simulation and shading) and the hosts
//! (`fog-cli`, `fog-wasm`). Hosts pick a [`Renderer`], wrap it in an
//! [`AnimationDriver`], and drive it from a [`FrameLoop`] over their own
//! [`Scheduler`], feeding spotlight changes through a [`SpotlightInput`].

pub mod backend;
pub mod driver;
pub mod input;
pub mod pixel;
pub mod renderer;
pub mod scheduler;

#[cfg(feature = "png")]
pub mod snapshot;

pub use backend::RendererKind;
pub use driver::{AnimationDriver, FrameOutcome, NOMINAL_FPS};
pub use input::SpotlightInput;
pub use renderer::{
    CpuFogPass, FogPass, Frame, NoopRenderer, ParticleRenderer, Renderer, ShaderRenderer,
};
pub use scheduler::{FrameHandle, FrameLoop, ManualScheduler, Scheduler};
