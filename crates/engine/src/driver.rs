//! Per-frame orchestration: resize, simulate, draw.
//!
//! [`AnimationDriver::tick`] is the whole frame. It takes the host clock and
//! a spotlight snapshot as plain arguments, so it can be driven by a browser
//! refresh callback, by the CLI's synthetic clock, or directly from tests.

use fog_core::config::{Backend, EngineConfig, InactiveFog};
use fog_core::error::EngineError;
use fog_core::spotlight::SpotlightState;
use fog_core::swarm::ParticleSwarm;
use fog_core::viewport::Viewport;

use crate::renderer::{Frame, Renderer};

/// Nominal frames per second the per-frame tunables are calibrated for.
pub const NOMINAL_FPS: f64 = 60.0;

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn,
    /// Zero-area viewport: nothing simulated or drawn.
    Skipped,
}

pub struct AnimationDriver<R: Renderer> {
    config: EngineConfig,
    renderer: R,
    /// Only the particle backend simulates puffs.
    swarm: Option<ParticleSwarm>,
    viewport: Viewport,
    pending_resize: Option<Viewport>,
    last_frame_s: Option<f64>,
    /// Animation time in seconds, advanced by clamped frame deltas.
    clock_s: f64,
    frames: u64,
}

impl<R: Renderer> AnimationDriver<R> {
    /// Validates `config` and sizes `renderer` to `viewport`.
    pub fn new(
        config: EngineConfig,
        mut renderer: R,
        viewport: Viewport,
        seed: u64,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let swarm = match config.backend {
            Backend::Particle => Some(ParticleSwarm::new(&config, viewport, seed)?),
            Backend::Shader => None,
        };
        renderer.resize(viewport);
        log::debug!(
            "driver ready: backend {}, renderer {}, {}x{}, seed {seed}",
            config.backend.name(),
            renderer.name(),
            viewport.width,
            viewport.height
        );
        Ok(Self {
            config,
            renderer,
            swarm,
            viewport,
            pending_resize: None,
            last_frame_s: None,
            clock_s: 0.0,
            frames: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn swarm(&self) -> Option<&ParticleSwarm> {
        self.swarm.as_ref()
    }

    /// Viewport in effect for the last tick.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clock(&self) -> f64 {
        self.clock_s
    }

    /// Queues a viewport change, applied at the start of the next tick.
    pub fn resize(&mut self, viewport: Viewport) {
        self.pending_resize = Some(viewport);
    }

    /// Forgets the previous frame time so the next tick integrates nothing.
    /// Called when the loop restarts after a pause.
    pub fn reset_clock(&mut self) {
        self.last_frame_s = None;
    }

    /// Runs one frame at host time `now_s` (seconds) against `spot`.
    pub fn tick(&mut self, now_s: f64, spot: SpotlightState) -> FrameOutcome {
        if let Some(viewport) = self.pending_resize.take() {
            self.apply_resize(viewport);
        }

        let elapsed = match self.last_frame_s {
            Some(last) if now_s.is_finite() => (now_s - last).max(0.0),
            _ => 0.0,
        };
        if now_s.is_finite() {
            self.last_frame_s = Some(now_s);
        }
        let dt = (elapsed * NOMINAL_FPS).min(self.config.max_frame_delta);
        self.clock_s += dt / NOMINAL_FPS;
        log::trace!("frame {}: elapsed {elapsed:.4}s, dt {dt:.3}", self.frames);

        if self.viewport.is_empty() {
            return FrameOutcome::Skipped;
        }

        let visible = spot.active || self.config.inactive_fog == InactiveFog::Visible;
        // Hidden fog is frozen, not just unpainted.
        if visible {
            if let Some(swarm) = self.swarm.as_mut() {
                swarm.tick(&spot, dt);
            }
        }
        let frame = Frame {
            puffs: self.swarm.as_ref().map(ParticleSwarm::puffs).unwrap_or_default(),
            time: self.clock_s,
            spotlight: spot,
            visible,
        };
        self.renderer.render(&frame);
        self.frames += 1;
        FrameOutcome::Drawn
    }

    fn apply_resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        log::debug!(
            "resize {}x{} -> {}x{}",
            self.viewport.width,
            self.viewport.height,
            viewport.width,
            viewport.height
        );
        self.renderer.resize(viewport);
        if let Some(swarm) = self.swarm.as_mut() {
            swarm.resize(viewport);
        }
        self.viewport = viewport;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RendererKind;
    use crate::renderer::NoopRenderer;
    use glam::DVec2;

    fn spot(active: bool) -> SpotlightState {
        SpotlightState {
            center: DVec2::new(40.0, 30.0),
            radius: 20.0,
            active,
        }
    }

    fn small_config() -> EngineConfig {
        EngineConfig {
            particle_count: 12,
            puff_radius_min: 8.0,
            puff_radius_max: 16.0,
            ..Default::default()
        }
    }

    fn cpu_driver(config: EngineConfig) -> AnimationDriver<RendererKind> {
        let viewport = Viewport::new(80, 60);
        let renderer = RendererKind::from_config(&config, viewport);
        AnimationDriver::new(config, renderer, viewport, 9).unwrap()
    }

    /// Records every call so tests can check ordering.
    #[derive(Default)]
    struct Recorder {
        viewport: Viewport,
        log: Vec<String>,
    }

    impl Renderer for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }
        fn viewport(&self) -> Viewport {
            self.viewport
        }
        fn resize(&mut self, viewport: Viewport) {
            self.viewport = viewport;
            self.log.push(format!("resize {}x{}", viewport.width, viewport.height));
        }
        fn render(&mut self, frame: &Frame<'_>) {
            self.log.push(format!(
                "render {}x{} visible={}",
                self.viewport.width, self.viewport.height, frame.visible
            ));
        }
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = EngineConfig {
            spotlight_radius: -1.0,
            ..Default::default()
        };
        let result = AnimationDriver::new(config, NoopRenderer::default(), Viewport::new(8, 8), 1);
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn shader_backend_has_no_swarm() {
        let config = EngineConfig {
            backend: Backend::Shader,
            ..small_config()
        };
        let driver = cpu_driver(config);
        assert!(driver.swarm().is_none());
    }

    #[test]
    fn resize_applies_before_draw_of_next_tick() {
        let mut driver =
            AnimationDriver::new(small_config(), Recorder::default(), Viewport::new(80, 60), 1)
                .unwrap();
        driver.resize(Viewport::new(120, 90));
        assert_eq!(driver.renderer().viewport(), Viewport::new(80, 60), "resize must wait for tick");
        driver.tick(0.0, spot(true));
        assert_eq!(
            driver.renderer().log,
            vec!["resize 80x60", "resize 120x90", "render 120x90 visible=true"]
        );
        assert_eq!(driver.viewport(), Viewport::new(120, 90));
    }

    #[test]
    fn zero_area_viewport_skips_then_resumes() {
        let mut driver = cpu_driver(small_config());
        driver.resize(Viewport::new(0, 60));
        assert_eq!(driver.tick(0.0, spot(true)), FrameOutcome::Skipped);
        assert_eq!(driver.frames(), 0);
        driver.resize(Viewport::new(80, 60));
        assert_eq!(driver.tick(0.016, spot(true)), FrameOutcome::Drawn);
        assert_eq!(driver.frames(), 1);
    }

    #[test]
    fn first_tick_integrates_nothing() {
        let mut driver = cpu_driver(small_config());
        let before: Vec<_> = driver.swarm().unwrap().puffs().iter().map(|p| p.position()).collect();
        driver.tick(123.0, spot(false));
        let after: Vec<_> = driver.swarm().unwrap().puffs().iter().map(|p| p.position()).collect();
        assert_eq!(before, after);
        assert_eq!(driver.clock(), 0.0);
    }

    #[test]
    fn long_pause_is_clamped() {
        let mut driver = cpu_driver(small_config());
        driver.tick(0.0, spot(true));
        driver.tick(30.0, spot(true));
        let max = driver.config().max_frame_delta / NOMINAL_FPS;
        assert!((driver.clock() - max).abs() < 1e-12, "clock {}", driver.clock());
    }

    #[test]
    fn backwards_clock_is_treated_as_no_time() {
        let mut driver = cpu_driver(small_config());
        driver.tick(5.0, spot(true));
        driver.tick(4.0, spot(true));
        assert_eq!(driver.clock(), 0.0);
    }

    #[test]
    fn inactive_spotlight_keeps_fog_visible_by_default() {
        let mut driver =
            AnimationDriver::new(small_config(), Recorder::default(), Viewport::new(8, 8), 1)
                .unwrap();
        driver.tick(0.0, spot(false));
        assert_eq!(driver.renderer().log.last().map(String::as_str), Some("render 8x8 visible=true"));
    }

    #[test]
    fn inactive_spotlight_hides_fog_when_configured() {
        let config = EngineConfig {
            inactive_fog: InactiveFog::Hidden,
            ..small_config()
        };
        let mut driver =
            AnimationDriver::new(config, Recorder::default(), Viewport::new(8, 8), 1).unwrap();
        driver.tick(0.0, spot(false));
        assert_eq!(driver.renderer().log.last().map(String::as_str), Some("render 8x8 visible=false"));
        driver.tick(0.1, spot(true));
        assert_eq!(driver.renderer().log.last().map(String::as_str), Some("render 8x8 visible=true"));
    }

    #[test]
    fn hidden_fog_freezes_the_swarm() {
        let config = EngineConfig {
            inactive_fog: InactiveFog::Hidden,
            ..small_config()
        };
        let mut driver = cpu_driver(config);
        let positions = |d: &AnimationDriver<RendererKind>| -> Vec<DVec2> {
            d.swarm().unwrap().puffs().iter().map(|p| p.position()).collect()
        };
        let before = positions(&driver);
        for i in 0..30 {
            driver.tick(f64::from(i) / 60.0, spot(false));
        }
        assert_eq!(positions(&driver), before, "puffs moved while hidden");
        assert_eq!(driver.renderer().surface().max_alpha(), 0.0);

        driver.tick(31.0 / 60.0, spot(true));
        assert_ne!(positions(&driver), before, "puffs stay frozen once visible");
    }

    #[test]
    fn particle_frames_paint_pixels() {
        let mut driver = cpu_driver(small_config());
        for i in 0..3 {
            driver.tick(f64::from(i) / 60.0, spot(true));
        }
        assert!(driver.renderer().surface().max_alpha() > 0.0);
        assert_eq!(driver.frames(), 3);
    }

    #[test]
    fn same_seed_same_frames() {
        let mut a = cpu_driver(small_config());
        let mut b = cpu_driver(small_config());
        for i in 0..10 {
            let t = f64::from(i) / 60.0;
            a.tick(t, spot(true));
            b.tick(t, spot(true));
        }
        assert_eq!(a.renderer().surface(), b.renderer().surface());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn irregular_timing_and_resizes_keep_invariants(
                gaps in prop::collection::vec(0.0_f64..0.5, 1..30),
                w in 0_u32..120,
                h in 0_u32..90,
            ) {
                let mut driver = cpu_driver(small_config());
                driver.resize(Viewport::new(w, h));
                let mut now = 0.0;
                for gap in gaps {
                    now += gap;
                    driver.tick(now, spot(true));
                    prop_assert_eq!(driver.renderer().viewport(), Viewport::new(w, h));
                    for p in driver.swarm().unwrap().puffs() {
                        prop_assert!(p.opacity() >= 0.0 && p.opacity() <= p.base_opacity());
                    }
                }
            }
        }
    }
}
