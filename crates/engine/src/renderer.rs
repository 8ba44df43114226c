//! Renderer backends and the seams they are built on.
//!
//! Every backend implements [`Renderer`]. The particle backend paints puffs
//! onto any [`Surface`]; the shader backend delegates to a [`FogPass`], which
//! is either the CPU reference ([`CpuFogPass`]) or a host's GPU pass.
//! [`NoopRenderer`] stands in when a rendering context could not be created.

use fog_core::color::Srgb;
use fog_core::config::EngineConfig;
use fog_core::shader::FogShader;
use fog_core::spotlight::SpotlightState;
use fog_core::surface::{GradientStop, PixelSurface, RadialEllipse, Surface};
use fog_core::swarm::Puff;
use fog_core::viewport::Viewport;
use glam::DVec2;

/// Everything a backend needs to paint one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Swarm state after this tick's update. Empty for the shader backend.
    pub puffs: &'a [Puff],
    /// Seconds of animation time.
    pub time: f64,
    pub spotlight: SpotlightState,
    /// When false the target is cleared and nothing is drawn.
    pub visible: bool,
}

pub trait Renderer {
    /// Backend name as listed by the CLI.
    fn name(&self) -> &'static str;

    fn viewport(&self) -> Viewport;

    /// Resizes the draw target to exactly `viewport`.
    fn resize(&mut self, viewport: Viewport);

    /// Clears the target and paints `frame`.
    fn render(&mut self, frame: &Frame<'_>);
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn viewport(&self) -> Viewport {
        (**self).viewport()
    }

    fn resize(&mut self, viewport: Viewport) {
        (**self).resize(viewport)
    }

    fn render(&mut self, frame: &Frame<'_>) {
        (**self).render(frame)
    }
}

// -- particle backend --

/// `(offset, darkening of each channel in 8-bit steps, alpha factor)`.
const PUFF_GRADIENT: [(f64, [f64; 3], f64); 4] = [
    (0.0, [0.0, 0.0, 0.0], 1.0),
    (0.3, [10.0, 8.0, 5.0], 0.7),
    (0.7, [20.0, 18.0, 10.0], 0.3),
    (1.0, [20.0, 18.0, 10.0], 0.0),
];

/// Radial stops for one puff: `tint` at `opacity` in the middle, fading to
/// transparent at the rim.
pub fn puff_gradient(tint: Srgb, opacity: f64) -> [GradientStop; 4] {
    PUFF_GRADIENT.map(|(offset, [dr, dg, db], alpha)| {
        let shade = Srgb {
            r: tint.r - dr / 255.0,
            g: tint.g - dg / 255.0,
            b: tint.b - db / 255.0,
        };
        GradientStop::new(offset, shade.with_alpha(opacity * alpha))
    })
}

/// Paints each puff as a rotated, flattened radial-gradient ellipse.
pub struct ParticleRenderer<S: Surface> {
    surface: S,
    tint: Srgb,
    flatten: f64,
}

impl<S: Surface> ParticleRenderer<S> {
    pub fn new(surface: S, config: &EngineConfig) -> Self {
        Self {
            surface,
            tint: config.fog_tint,
            flatten: config.ellipse_flatten,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: Surface> Renderer for ParticleRenderer<S> {
    fn name(&self) -> &'static str {
        "particle"
    }

    fn viewport(&self) -> Viewport {
        self.surface.size()
    }

    fn resize(&mut self, viewport: Viewport) {
        self.surface.resize(viewport);
    }

    fn render(&mut self, frame: &Frame<'_>) {
        self.surface.clear();
        if !frame.visible {
            return;
        }
        for puff in frame.puffs {
            if puff.opacity() <= 0.0 {
                continue;
            }
            let ellipse = RadialEllipse {
                center: puff.position(),
                radius: puff.radius(),
                rotation: puff.rotation(),
                flatten: self.flatten,
            };
            self.surface
                .fill_radial_ellipse(&ellipse, &puff_gradient(self.tint, puff.opacity()));
        }
    }
}

// -- shader backend --

/// A full-viewport fog pass.
pub trait FogPass {
    fn viewport(&self) -> Viewport;
    fn resize(&mut self, viewport: Viewport);
    fn clear(&mut self);
    fn draw(&mut self, time: f64, spot: &SpotlightState);
}

/// Evaluates [`FogShader::shade`] for every pixel of a [`PixelSurface`].
pub struct CpuFogPass {
    shader: FogShader,
    surface: PixelSurface,
}

impl CpuFogPass {
    pub fn new(config: &EngineConfig, viewport: Viewport) -> Self {
        Self {
            shader: FogShader::from_config(config),
            surface: PixelSurface::new(viewport),
        }
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }
}

impl FogPass for CpuFogPass {
    fn viewport(&self) -> Viewport {
        self.surface.size()
    }

    fn resize(&mut self, viewport: Viewport) {
        self.surface.resize(viewport);
    }

    fn clear(&mut self) {
        self.surface.clear();
    }

    fn draw(&mut self, time: f64, spot: &SpotlightState) {
        let viewport = self.surface.size();
        for y in 0..viewport.height {
            for x in 0..viewport.width {
                let pixel = DVec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let color = self.shader.shade(pixel, viewport, time, spot);
                self.surface.set_pixel(x, y, color);
            }
        }
    }
}

/// Runs a [`FogPass`] each frame; the swarm is not used.
pub struct ShaderRenderer<P: FogPass> {
    pass: P,
}

impl<P: FogPass> ShaderRenderer<P> {
    pub fn new(pass: P) -> Self {
        Self { pass }
    }

    pub fn pass(&self) -> &P {
        &self.pass
    }
}

impl<P: FogPass> Renderer for ShaderRenderer<P> {
    fn name(&self) -> &'static str {
        "shader"
    }

    fn viewport(&self) -> Viewport {
        self.pass.viewport()
    }

    fn resize(&mut self, viewport: Viewport) {
        self.pass.resize(viewport);
    }

    fn render(&mut self, frame: &Frame<'_>) {
        if frame.visible {
            self.pass.draw(frame.time, &frame.spotlight);
        } else {
            self.pass.clear();
        }
    }
}

// -- fallback --

/// Draws nothing. Used when the host could not provide a rendering context.
#[derive(Debug, Default)]
pub struct NoopRenderer {
    viewport: Viewport,
}

impl NoopRenderer {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }
}

impl Renderer for NoopRenderer {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn render(&mut self, _frame: &Frame<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use fog_core::config::EngineConfig;

    fn spot(active: bool) -> SpotlightState {
        SpotlightState {
            center: DVec2::new(20.0, 15.0),
            radius: 10.0,
            active,
        }
    }

    fn frame<'a>(puffs: &'a [Puff], visible: bool) -> Frame<'a> {
        Frame {
            puffs,
            time: 0.5,
            spotlight: spot(true),
            visible,
        }
    }

    #[test]
    fn puff_gradient_matches_default_tint_stops() {
        let stops = puff_gradient(EngineConfig::default().fog_tint, 0.1);
        let rgb8 = |s: &GradientStop| {
            Srgb {
                r: s.color.r,
                g: s.color.g,
                b: s.color.b,
            }
            .to_rgb8()
        };
        assert_eq!(rgb8(&stops[0]), [210, 218, 230]);
        assert_eq!(rgb8(&stops[1]), [200, 210, 225]);
        assert_eq!(rgb8(&stops[2]), [190, 200, 220]);
        assert!((stops[0].color.a - 0.1).abs() < 1e-12);
        assert!((stops[1].color.a - 0.07).abs() < 1e-12);
        assert!((stops[2].color.a - 0.03).abs() < 1e-12);
        assert_eq!(stops[3].color.a, 0.0);
        assert_eq!(stops.map(|s| s.offset), [0.0, 0.3, 0.7, 1.0]);
    }

    #[test]
    fn particle_renderer_paints_visible_puffs() {
        let config = EngineConfig::default();
        let mut r = ParticleRenderer::new(PixelSurface::new(Viewport::new(40, 30)), &config);
        let puffs = vec![Puff::new(DVec2::new(20.0, 15.0), 12.0, 0.5).unwrap()];
        r.render(&frame(&puffs, true));
        assert!(r.surface().pixel(20, 15).unwrap().a > 0.4);
        assert_eq!(r.surface().pixel(0, 0).unwrap().a, 0.0);
    }

    #[test]
    fn particle_renderer_clears_between_frames() {
        let config = EngineConfig::default();
        let mut r = ParticleRenderer::new(PixelSurface::new(Viewport::new(40, 30)), &config);
        let puffs = vec![Puff::new(DVec2::new(20.0, 15.0), 12.0, 0.5).unwrap()];
        r.render(&frame(&puffs, true));
        let first = r.surface().pixel(20, 15).unwrap().a;
        r.render(&frame(&puffs, true));
        let second = r.surface().pixel(20, 15).unwrap().a;
        assert!((first - second).abs() < 1e-9, "trail: {first} then {second}");
    }

    #[test]
    fn hidden_frame_clears_target() {
        let config = EngineConfig::default();
        let mut r = ParticleRenderer::new(PixelSurface::new(Viewport::new(40, 30)), &config);
        let puffs = vec![Puff::new(DVec2::new(20.0, 15.0), 12.0, 0.5).unwrap()];
        r.render(&frame(&puffs, true));
        r.render(&frame(&puffs, false));
        assert_eq!(r.surface().max_alpha(), 0.0);
    }

    #[test]
    fn resize_is_exact() {
        let config = EngineConfig::default();
        let mut r = ParticleRenderer::new(PixelSurface::new(Viewport::new(4, 4)), &config);
        r.resize(Viewport::new(33, 17));
        assert_eq!(r.viewport(), Viewport::new(33, 17));
        assert_eq!(r.surface().data().len(), 33 * 17);
    }

    #[test]
    fn shader_renderer_draws_every_pixel_and_clears_when_hidden() {
        let config = EngineConfig::default();
        let mut r = ShaderRenderer::new(CpuFogPass::new(&config, Viewport::new(24, 16)));
        r.render(&frame(&[], true));
        assert!(r.pass().surface().max_alpha() > 0.0);
        r.render(&frame(&[], false));
        assert_eq!(r.pass().surface().max_alpha(), 0.0);
    }

    #[test]
    fn noop_renderer_tracks_viewport_only() {
        let mut r = NoopRenderer::default();
        r.resize(Viewport::new(5, 6));
        r.render(&frame(&[], true));
        assert_eq!(r.viewport(), Viewport::new(5, 6));
        assert_eq!(r.name(), "noop");
    }

    #[test]
    fn boxed_renderer_is_object_safe() {
        let mut boxed: Box<dyn Renderer> = Box::new(NoopRenderer::new(Viewport::new(1, 1)));
        boxed.resize(Viewport::new(2, 3));
        assert_eq!(boxed.viewport(), Viewport::new(2, 3));
    }
}
