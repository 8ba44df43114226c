//! Backend registry for CPU hosts.
//!
//! Maps backend names to renderers that paint into a [`PixelSurface`], so
//! the CLI and tests can read back exactly what a browser would show.

use fog_core::config::{Backend, EngineConfig};
use fog_core::error::EngineError;
use fog_core::surface::PixelSurface;
use fog_core::viewport::Viewport;

use crate::renderer::{CpuFogPass, Frame, ParticleRenderer, Renderer, ShaderRenderer};

/// All available backend names.
const BACKEND_NAMES: &[&str] = &["particle", "shader"];

/// A CPU-rendered backend.
pub enum RendererKind {
    Particle(ParticleRenderer<PixelSurface>),
    Shader(ShaderRenderer<CpuFogPass>),
}

impl RendererKind {
    /// Builds the backend selected by `config.backend`.
    pub fn from_config(config: &EngineConfig, viewport: Viewport) -> Self {
        match config.backend {
            Backend::Particle => RendererKind::Particle(ParticleRenderer::new(
                PixelSurface::new(viewport),
                config,
            )),
            Backend::Shader => {
                RendererKind::Shader(ShaderRenderer::new(CpuFogPass::new(config, viewport)))
            }
        }
    }

    /// Builds a backend by name, overriding `config.backend`.
    ///
    /// Returns `EngineError::UnknownBackend` if the name is not recognized.
    pub fn from_name(
        name: &str,
        config: &EngineConfig,
        viewport: Viewport,
    ) -> Result<Self, EngineError> {
        let config = EngineConfig {
            backend: Backend::from_name(name)?,
            ..config.clone()
        };
        Ok(Self::from_config(&config, viewport))
    }

    pub fn list_backends() -> &'static [&'static str] {
        BACKEND_NAMES
    }

    /// The painted pixels of the last frame.
    pub fn surface(&self) -> &PixelSurface {
        match self {
            RendererKind::Particle(r) => r.surface(),
            RendererKind::Shader(r) => r.pass().surface(),
        }
    }
}

impl Renderer for RendererKind {
    fn name(&self) -> &'static str {
        match self {
            RendererKind::Particle(r) => r.name(),
            RendererKind::Shader(r) => r.name(),
        }
    }

    fn viewport(&self) -> Viewport {
        match self {
            RendererKind::Particle(r) => r.viewport(),
            RendererKind::Shader(r) => r.viewport(),
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        match self {
            RendererKind::Particle(r) => r.resize(viewport),
            RendererKind::Shader(r) => r.resize(viewport),
        }
    }

    fn render(&mut self, frame: &Frame<'_>) {
        match self {
            RendererKind::Particle(r) => r.render(frame),
            RendererKind::Shader(r) => r.render(frame),
        }
    }
}
