//! The puff swarm: soft fog blobs driven by drift, spotlight, homing and damping.
//!
//! Each tick runs, for every puff and in this order: noise drift, spotlight
//! repulsion with swirl, homing toward the anchor, damping, integration,
//! the edge policy, and the opacity fade. All increments are scaled by the
//! frame delta `dt`, measured in nominal 60 Hz frames, so `dt == 1.0` is
//! exactly one step of the per-frame formulas and irregular frame timing
//! integrates the same motion.

use crate::config::{EdgePolicy, EngineConfig};
use crate::error::EngineError;
use crate::noise_field::NoiseField;
use crate::prng::Xorshift64;
use crate::spotlight::{SpotlightField, SpotlightState};
use crate::viewport::Viewport;
use glam::DVec2;

/// Vertical drift relative to horizontal; fog wisps drift mostly sideways.
const VERTICAL_DRIFT_RATIO: f64 = 2.0 / 3.0;
/// Full span of initial horizontal velocity.
const INITIAL_SPEED_X: f64 = 0.4;
/// Full span of initial vertical velocity.
const INITIAL_SPEED_Y: f64 = 0.2;
/// Noise phases are drawn from [0, NOISE_PHASE_SPAN)².
const NOISE_PHASE_SPAN: f64 = 100.0;

/// One soft fog blob.
///
/// `radius` and `base_opacity` are fixed at creation. Only position,
/// velocity, rotation and the derived `opacity` change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Puff {
    position: DVec2,
    velocity: DVec2,
    home: DVec2,
    radius: f64,
    base_opacity: f64,
    rotation: f64,
    rotation_speed: f64,
    noise_phase: DVec2,
    opacity: f64,
}

impl Puff {
    /// A resting puff anchored at `home`.
    ///
    /// Returns `EngineError::InvalidConfig` unless `radius > 0` and
    /// `base_opacity` lies in (0, 1).
    pub fn new(home: DVec2, radius: f64, base_opacity: f64) -> Result<Self, EngineError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(EngineError::config(
                "puff radius",
                format!("must be finite and > 0, got {radius}"),
            ));
        }
        if !(base_opacity > 0.0 && base_opacity < 1.0) {
            return Err(EngineError::config(
                "puff base opacity",
                format!("must be in (0, 1), got {base_opacity}"),
            ));
        }
        Ok(Self {
            position: home,
            velocity: DVec2::ZERO,
            home,
            radius,
            base_opacity,
            rotation: 0.0,
            rotation_speed: 0.0,
            noise_phase: DVec2::ZERO,
            opacity: base_opacity,
        })
    }

    pub fn with_velocity(mut self, velocity: DVec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_rotation(mut self, rotation: f64, rotation_speed: f64) -> Self {
        self.rotation = rotation;
        self.rotation_speed = rotation_speed;
        self
    }

    pub fn with_noise_phase(mut self, phase: DVec2) -> Self {
        self.noise_phase = phase;
        self
    }

    /// Moves the puff away from its anchor without changing the anchor.
    pub fn displaced_to(mut self, position: DVec2) -> Self {
        self.position = position;
        self
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn home(&self) -> DVec2 {
        self.home
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn base_opacity(&self) -> f64 {
        self.base_opacity
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn rotation_speed(&self) -> f64 {
        self.rotation_speed
    }

    pub fn noise_phase(&self) -> DVec2 {
        self.noise_phase
    }

    /// Opacity computed by the latest tick, in [0, base_opacity].
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Same puff re-laid for a viewport scaled by `ratio` per axis.
    fn rescaled(&self, ratio: DVec2) -> Self {
        Self {
            position: self.position * ratio,
            velocity: self.velocity * ratio,
            home: self.home * ratio,
            ..self.clone()
        }
    }
}

/// The full set of puffs plus everything needed to advance them.
#[derive(Debug, Clone)]
pub struct ParticleSwarm {
    config: EngineConfig,
    field: SpotlightField,
    noise: NoiseField,
    puffs: Vec<Puff>,
    viewport: Viewport,
    /// Last non-empty viewport the puffs were laid out for.
    layout: Viewport,
    time: f64,
    seed: u64,
}

impl ParticleSwarm {
    /// Validates `config` and scatters `config.particle_count` puffs across
    /// `viewport`.
    ///
    /// With an empty viewport the swarm stays unpopulated until the first
    /// resize to a non-empty one.
    pub fn new(config: &EngineConfig, viewport: Viewport, seed: u64) -> Result<Self, EngineError> {
        config.validate()?;
        let mut swarm = Self::bare(config, viewport, seed);
        if !viewport.is_empty() {
            swarm.populate();
        }
        Ok(swarm)
    }

    /// Builds a swarm from hand-placed puffs, laid out for `viewport`.
    pub fn from_puffs(
        config: &EngineConfig,
        viewport: Viewport,
        puffs: Vec<Puff>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let mut swarm = Self::bare(config, viewport, 0);
        swarm.puffs = puffs;
        swarm.layout = viewport;
        Ok(swarm)
    }

    fn bare(config: &EngineConfig, viewport: Viewport, seed: u64) -> Self {
        Self {
            config: config.clone(),
            field: SpotlightField::from_config(config),
            noise: NoiseField::new(config.noise, config.octaves, seed as u32),
            puffs: Vec::new(),
            viewport,
            layout: Viewport::default(),
            time: 0.0,
            seed,
        }
    }

    pub fn puffs(&self) -> &[Puff] {
        &self.puffs
    }

    pub fn len(&self) -> usize {
        self.puffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puffs.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Noise time, advanced by `time_step` per nominal frame.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Advances every puff by `dt` nominal frames against `spot`.
    ///
    /// `dt` is clamped to `[0, max_frame_delta]`. Does nothing while the
    /// viewport is empty.
    pub fn tick(&mut self, spot: &SpotlightState, dt: f64) {
        if self.viewport.is_empty() {
            return;
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_frame_delta)
        } else {
            0.0
        };
        self.time += self.config.time_step * dt;

        let t = self.time;
        let drift = self.config.drift_strength;
        let homing = self.config.homing_strength;
        let retention = self.config.damping.powf(dt);
        let edge = self.config.edge;
        let size = self.viewport.size();

        for puff in &mut self.puffs {
            if drift > 0.0 {
                let phase = puff.noise_phase;
                let nx = self.noise.noise(phase.x + t, phase.y, t * 0.5);
                let ny = self.noise.noise(phase.x, phase.y + t, t * 0.5);
                puff.velocity += DVec2::new(nx * drift, ny * drift * VERTICAL_DRIFT_RATIO) * dt;
            }

            let sample = self.field.sample(puff.position, spot);
            puff.velocity += sample.force * dt;
            puff.velocity += (puff.home - puff.position) * (homing * dt);
            puff.velocity *= retention;

            puff.position += puff.velocity * dt;
            puff.rotation += puff.rotation_speed * dt;

            if edge == EdgePolicy::Wrap {
                puff.position = wrap_position(puff.position, puff.radius, size);
            }

            puff.opacity = puff.base_opacity * sample.opacity;
        }
    }

    /// Follows a viewport change.
    ///
    /// Puffs are re-laid proportionally from the last non-empty layout. The
    /// first non-empty viewport populates the swarm from scratch. An empty
    /// viewport leaves the puffs untouched so they resume where they were.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        if viewport.is_empty() {
            log::debug!("swarm paused for empty viewport {}x{}", viewport.width, viewport.height);
            return;
        }
        if self.layout.is_empty() {
            self.populate();
            return;
        }
        let ratio = viewport.size() / self.layout.size();
        self.puffs = self.puffs.iter().map(|p| p.rescaled(ratio)).collect();
        self.layout = viewport;
        log::debug!(
            "redistributed {} puffs to {}x{}",
            self.puffs.len(),
            viewport.width,
            viewport.height
        );
    }

    /// Scatters a fresh set of puffs over the current viewport.
    fn populate(&mut self) {
        let c = &self.config;
        let size = self.viewport.size();
        let mut rng = Xorshift64::new(self.seed);
        self.puffs = (0..c.particle_count)
            .map(|_| {
                let home = rng.next_point_in(size.x, size.y);
                let velocity = DVec2::new(
                    rng.next_signed(INITIAL_SPEED_X),
                    rng.next_signed(INITIAL_SPEED_Y),
                );
                let radius = rng.next_range(c.puff_radius_min, c.puff_radius_max);
                let base_opacity = rng.next_range(c.opacity_min, c.opacity_max);
                let phase = DVec2::new(
                    rng.next_range(0.0, NOISE_PHASE_SPAN),
                    rng.next_range(0.0, NOISE_PHASE_SPAN),
                );
                let rotation = rng.next_angle();
                let rotation_speed = rng.next_signed(c.rotation_speed_max);
                Puff {
                    position: home,
                    velocity,
                    home,
                    radius,
                    base_opacity,
                    rotation,
                    rotation_speed,
                    noise_phase: phase,
                    opacity: base_opacity,
                }
            })
            .collect();
        self.layout = self.viewport;
        log::debug!(
            "populated {} puffs over {}x{} (seed {})",
            self.puffs.len(),
            self.viewport.width,
            self.viewport.height,
            self.seed
        );
    }
}

/// Re-enters a puff from the opposite edge once it is fully outside.
fn wrap_position(p: DVec2, radius: f64, size: DVec2) -> DVec2 {
    let wrap_axis = |v: f64, extent: f64| {
        if v < -radius {
            extent + radius
        } else if v > extent + radius {
            -radius
        } else {
            v
        }
    };
    DVec2::new(wrap_axis(p.x, size.x), wrap_axis(p.y, size.y))
}
