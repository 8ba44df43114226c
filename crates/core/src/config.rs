//! Engine configuration: every tunable of the fog engine in one plain struct.
//!
//! An [`EngineConfig`] is immutable for the lifetime of an engine. It can be
//! built in Rust (`EngineConfig { particle_count: 40, ..Default::default() }`)
//! or from a JSON params object with [`EngineConfig::from_json`]. Either way,
//! [`EngineConfig::validate`] runs before an engine accepts it, so
//! out-of-range values fail at construction and never mid-animation.
//!
//! The JSON reader is lenient per key: a missing key or a value of the wrong
//! JSON type falls back to the default. A string that names no known variant
//! (e.g. `"backend": "raytrace"`) is an error.

use crate::color::Srgb;
use crate::error::EngineError;
use crate::noise_field::{NoiseKind, DEFAULT_OCTAVES, MAX_OCTAVES};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// What happens to a puff that drifts past the viewport edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Re-enter from the opposite edge, offset by the puff radius.
    Wrap,
    /// Leave it; homing pulls it back.
    #[default]
    None,
}

impl EdgePolicy {
    pub const ALL: [EdgePolicy; 2] = [EdgePolicy::Wrap, EdgePolicy::None];

    pub fn name(self) -> &'static str {
        match self {
            EdgePolicy::Wrap => "wrap",
            EdgePolicy::None => "none",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// Renderer implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Gradient-filled puffs painted one by one.
    #[default]
    Particle,
    /// Per-pixel domain-warped fbm.
    Shader,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Particle, Backend::Shader];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Particle => "particle",
            Backend::Shader => "shader",
        }
    }

    /// Returns `EngineError::UnknownBackend` for unrecognized names.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        Self::ALL
            .into_iter()
            .find(|b| b.name() == name)
            .ok_or_else(|| EngineError::UnknownBackend(name.to_string()))
    }
}

/// How the fog behaves while the spotlight is inactive ("lights on").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InactiveFog {
    /// Keep animating and painting, just without the spotlight hole.
    #[default]
    Visible,
    /// Freeze the swarm and paint an empty frame.
    Hidden,
}

impl InactiveFog {
    pub const ALL: [InactiveFog; 2] = [InactiveFog::Visible, InactiveFog::Hidden];

    pub fn name(self) -> &'static str {
        match self {
            InactiveFog::Visible => "visible",
            InactiveFog::Hidden => "hidden",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

const DEFAULT_PARTICLE_COUNT: usize = 80;
pub const DEFAULT_SPOTLIGHT_RADIUS: f64 = 280.0;
const DEFAULT_REPULSION_MULTIPLIER: f64 = 1.8;
const DEFAULT_REPULSION_STRENGTH: f64 = 4.0;
const DEFAULT_REPULSION_SHARPNESS: f64 = 1.5;
const DEFAULT_FALLOFF_EXPONENT: f64 = 2.0;
const DEFAULT_SWIRL_STRENGTH: f64 = 0.8;
const DEFAULT_HOMING_STRENGTH: f64 = 0.0006;
const DEFAULT_DAMPING: f64 = 0.96;
const DEFAULT_DRIFT_STRENGTH: f64 = 0.06;
const DEFAULT_PUFF_RADIUS_MIN: f64 = 140.0;
const DEFAULT_PUFF_RADIUS_MAX: f64 = 360.0;
const DEFAULT_OPACITY_MIN: f64 = 0.04;
const DEFAULT_OPACITY_MAX: f64 = 0.13;
const DEFAULT_ROTATION_SPEED_MAX: f64 = 0.003;
const DEFAULT_ELLIPSE_FLATTEN: f64 = 0.55;
const DEFAULT_TIME_STEP: f64 = 0.008;
const DEFAULT_MAX_FRAME_DELTA: f64 = 4.0;
const DEFAULT_SHADER_SCALE: f64 = 3.0;
const DEFAULT_SHADER_WARP: f64 = 0.35;
const DEFAULT_MASK_EXPONENT: f64 = 2.0;
const DEFAULT_BASE_ALPHA: f64 = 0.85;
const DEFAULT_FOG_TINT: &str = "#d2dae6";
const DEFAULT_TONE_LOW: &str = "#8a94a6";
const DEFAULT_TONE_HIGH: &str = "#e6ecf4";

/// All tunables of one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of puffs in the swarm.
    pub particle_count: usize,
    /// Radius of the fully cleared zone, in pixels.
    pub spotlight_radius: f64,
    /// Repulsion zone radius as a multiple of the spotlight radius.
    pub repulsion_multiplier: f64,
    /// Peak repulsion force, reached at the spotlight center.
    pub repulsion_strength: f64,
    /// Exponent `p` of the repulsion falloff `(1 - dist/zone)^p`.
    pub repulsion_sharpness: f64,
    /// Exponent `q` of the opacity fade `(dist/radius)^q`.
    pub falloff_exponent: f64,
    /// Tangential force as a fraction of the radial force.
    pub swirl_strength: f64,
    /// Spring constant pulling puffs toward their home position.
    pub homing_strength: f64,
    /// Per-tick velocity retention in (0, 1).
    pub damping: f64,
    /// Fraction of the noise sample added to velocity each tick.
    pub drift_strength: f64,
    pub noise: NoiseKind,
    pub edge: EdgePolicy,
    pub backend: Backend,
    pub inactive_fog: InactiveFog,
    pub puff_radius_min: f64,
    pub puff_radius_max: f64,
    pub opacity_min: f64,
    pub opacity_max: f64,
    pub rotation_speed_max: f64,
    /// Vertical scale applied to each puff ellipse.
    pub ellipse_flatten: f64,
    /// Noise time advanced per nominal 60 Hz frame.
    pub time_step: f64,
    /// Largest frame delta (in nominal frames) a single tick will integrate.
    pub max_frame_delta: f64,
    /// fbm octaves, shared by drift noise and the shader.
    pub octaves: u32,
    pub shader_scale: f64,
    /// Tangential uv offset applied at the spotlight center by the shader.
    pub shader_warp: f64,
    /// Exponent `k` of the shader density mask `1 - falloff^k`.
    pub mask_exponent: f64,
    /// Shader alpha at full fog density.
    pub base_alpha: f64,
    pub fog_tint: Srgb,
    pub shader_tone_low: Srgb,
    pub shader_tone_high: Srgb,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            spotlight_radius: DEFAULT_SPOTLIGHT_RADIUS,
            repulsion_multiplier: DEFAULT_REPULSION_MULTIPLIER,
            repulsion_strength: DEFAULT_REPULSION_STRENGTH,
            repulsion_sharpness: DEFAULT_REPULSION_SHARPNESS,
            falloff_exponent: DEFAULT_FALLOFF_EXPONENT,
            swirl_strength: DEFAULT_SWIRL_STRENGTH,
            homing_strength: DEFAULT_HOMING_STRENGTH,
            damping: DEFAULT_DAMPING,
            drift_strength: DEFAULT_DRIFT_STRENGTH,
            noise: NoiseKind::default(),
            edge: EdgePolicy::default(),
            backend: Backend::default(),
            inactive_fog: InactiveFog::default(),
            puff_radius_min: DEFAULT_PUFF_RADIUS_MIN,
            puff_radius_max: DEFAULT_PUFF_RADIUS_MAX,
            opacity_min: DEFAULT_OPACITY_MIN,
            opacity_max: DEFAULT_OPACITY_MAX,
            rotation_speed_max: DEFAULT_ROTATION_SPEED_MAX,
            ellipse_flatten: DEFAULT_ELLIPSE_FLATTEN,
            time_step: DEFAULT_TIME_STEP,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            octaves: DEFAULT_OCTAVES,
            shader_scale: DEFAULT_SHADER_SCALE,
            shader_warp: DEFAULT_SHADER_WARP,
            mask_exponent: DEFAULT_MASK_EXPONENT,
            base_alpha: DEFAULT_BASE_ALPHA,
            fog_tint: Srgb::from_rgb8(0xd2, 0xda, 0xe6),
            shader_tone_low: Srgb::from_rgb8(0x8a, 0x94, 0xa6),
            shader_tone_high: Srgb::from_rgb8(0xe6, 0xec, 0xf4),
        }
    }
}

impl EngineConfig {
    /// Reads a config from a JSON params object and validates it.
    pub fn from_json(params: &Value) -> Result<Self, EngineError> {
        let d = Self::default();
        let config = Self {
            particle_count: read_usize(params, "particle_count", d.particle_count),
            spotlight_radius: read_f64(params, "spotlight_radius", d.spotlight_radius),
            repulsion_multiplier: read_f64(params, "repulsion_multiplier", d.repulsion_multiplier),
            repulsion_strength: read_f64(params, "repulsion_strength", d.repulsion_strength),
            repulsion_sharpness: read_f64(params, "repulsion_sharpness", d.repulsion_sharpness),
            falloff_exponent: read_f64(params, "falloff_exponent", d.falloff_exponent),
            swirl_strength: read_f64(params, "swirl_strength", d.swirl_strength),
            homing_strength: read_f64(params, "homing_strength", d.homing_strength),
            damping: read_f64(params, "damping", d.damping),
            drift_strength: read_f64(params, "drift_strength", d.drift_strength),
            noise: read_variant(params, "noise", d.noise, NoiseKind::from_name)?,
            edge: read_variant(params, "edge", d.edge, EdgePolicy::from_name)?,
            backend: match params.get("backend").and_then(Value::as_str) {
                Some(name) => Backend::from_name(name)?,
                None => d.backend,
            },
            inactive_fog: read_variant(params, "inactive_fog", d.inactive_fog, InactiveFog::from_name)?,
            puff_radius_min: read_f64(params, "puff_radius_min", d.puff_radius_min),
            puff_radius_max: read_f64(params, "puff_radius_max", d.puff_radius_max),
            opacity_min: read_f64(params, "opacity_min", d.opacity_min),
            opacity_max: read_f64(params, "opacity_max", d.opacity_max),
            rotation_speed_max: read_f64(params, "rotation_speed_max", d.rotation_speed_max),
            ellipse_flatten: read_f64(params, "ellipse_flatten", d.ellipse_flatten),
            time_step: read_f64(params, "time_step", d.time_step),
            max_frame_delta: read_f64(params, "max_frame_delta", d.max_frame_delta),
            octaves: read_u32(params, "octaves", d.octaves),
            shader_scale: read_f64(params, "shader_scale", d.shader_scale),
            shader_warp: read_f64(params, "shader_warp", d.shader_warp),
            mask_exponent: read_f64(params, "mask_exponent", d.mask_exponent),
            base_alpha: read_f64(params, "base_alpha", d.base_alpha),
            fog_tint: read_color(params, "fog_tint", d.fog_tint)?,
            shader_tone_low: read_color(params, "shader_tone_low", d.shader_tone_low)?,
            shader_tone_high: read_color(params, "shader_tone_high", d.shader_tone_high)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks every value against its accepted range.
    ///
    /// Returns the first violation as `EngineError::InvalidConfig`.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.particle_count == 0 {
            return Err(EngineError::config("particle_count", "must be > 0"));
        }
        positive("spotlight_radius", self.spotlight_radius)?;
        positive("repulsion_multiplier", self.repulsion_multiplier)?;
        non_negative("repulsion_strength", self.repulsion_strength)?;
        positive("repulsion_sharpness", self.repulsion_sharpness)?;
        positive("falloff_exponent", self.falloff_exponent)?;
        non_negative("swirl_strength", self.swirl_strength)?;
        non_negative("homing_strength", self.homing_strength)?;
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(EngineError::config(
                "damping",
                format!("must be in (0, 1), got {}", self.damping),
            ));
        }
        non_negative("drift_strength", self.drift_strength)?;
        positive("puff_radius_min", self.puff_radius_min)?;
        positive("puff_radius_max", self.puff_radius_max)?;
        if self.puff_radius_min > self.puff_radius_max {
            return Err(EngineError::config(
                "puff_radius_min",
                format!(
                    "must not exceed puff_radius_max ({} > {})",
                    self.puff_radius_min, self.puff_radius_max
                ),
            ));
        }
        positive("opacity_min", self.opacity_min)?;
        if !(self.opacity_max < 1.0) {
            return Err(EngineError::config(
                "opacity_max",
                format!("must be < 1, got {}", self.opacity_max),
            ));
        }
        if self.opacity_min > self.opacity_max {
            return Err(EngineError::config(
                "opacity_min",
                format!(
                    "must not exceed opacity_max ({} > {})",
                    self.opacity_min, self.opacity_max
                ),
            ));
        }
        non_negative("rotation_speed_max", self.rotation_speed_max)?;
        if !(self.ellipse_flatten > 0.0 && self.ellipse_flatten <= 1.0) {
            return Err(EngineError::config(
                "ellipse_flatten",
                format!("must be in (0, 1], got {}", self.ellipse_flatten),
            ));
        }
        non_negative("time_step", self.time_step)?;
        positive("max_frame_delta", self.max_frame_delta)?;
        if !(1..=MAX_OCTAVES).contains(&self.octaves) {
            return Err(EngineError::config(
                "octaves",
                format!("must be in 1..={MAX_OCTAVES}, got {}", self.octaves),
            ));
        }
        positive("shader_scale", self.shader_scale)?;
        non_negative("shader_warp", self.shader_warp)?;
        positive("mask_exponent", self.mask_exponent)?;
        if !(0.0..=1.0).contains(&self.base_alpha) {
            return Err(EngineError::config(
                "base_alpha",
                format!("must be in [0, 1], got {}", self.base_alpha),
            ));
        }
        Ok(())
    }

    /// Current values as a JSON object, keyed like [`Self::from_json`].
    pub fn to_json(&self) -> Value {
        json!({
            "particle_count": self.particle_count,
            "spotlight_radius": self.spotlight_radius,
            "repulsion_multiplier": self.repulsion_multiplier,
            "repulsion_strength": self.repulsion_strength,
            "repulsion_sharpness": self.repulsion_sharpness,
            "falloff_exponent": self.falloff_exponent,
            "swirl_strength": self.swirl_strength,
            "homing_strength": self.homing_strength,
            "damping": self.damping,
            "drift_strength": self.drift_strength,
            "noise": self.noise.name(),
            "edge": self.edge.name(),
            "backend": self.backend.name(),
            "inactive_fog": self.inactive_fog.name(),
            "puff_radius_min": self.puff_radius_min,
            "puff_radius_max": self.puff_radius_max,
            "opacity_min": self.opacity_min,
            "opacity_max": self.opacity_max,
            "rotation_speed_max": self.rotation_speed_max,
            "ellipse_flatten": self.ellipse_flatten,
            "time_step": self.time_step,
            "max_frame_delta": self.max_frame_delta,
            "octaves": self.octaves,
            "shader_scale": self.shader_scale,
            "shader_warp": self.shader_warp,
            "mask_exponent": self.mask_exponent,
            "base_alpha": self.base_alpha,
            "fog_tint": self.fog_tint.to_hex(),
            "shader_tone_low": self.shader_tone_low.to_hex(),
            "shader_tone_high": self.shader_tone_high.to_hex(),
        })
    }

    /// Type, default, range and description of every parameter.
    pub fn param_schema() -> Value {
        json!({
            "particle_count": {
                "type": "integer", "default": DEFAULT_PARTICLE_COUNT, "min": 1,
                "description": "Number of fog puffs"
            },
            "spotlight_radius": number(DEFAULT_SPOTLIGHT_RADIUS, 1.0, 2000.0,
                "Radius of the fully cleared zone in pixels"),
            "repulsion_multiplier": number(DEFAULT_REPULSION_MULTIPLIER, 1.0, 3.0,
                "Repulsion zone radius as a multiple of the spotlight radius (typically 1.1-1.8)"),
            "repulsion_strength": number(DEFAULT_REPULSION_STRENGTH, 0.0, 20.0,
                "Peak push-away force at the spotlight center"),
            "repulsion_sharpness": number(DEFAULT_REPULSION_SHARPNESS, 1.0, 1.5,
                "Exponent p of the repulsion falloff (1 - dist/zone)^p"),
            "falloff_exponent": number(DEFAULT_FALLOFF_EXPONENT, 1.0, 2.0,
                "Exponent q of the opacity fade (dist/radius)^q"),
            "swirl_strength": number(DEFAULT_SWIRL_STRENGTH, 0.0, 2.0,
                "Tangential force as a fraction of the radial force"),
            "homing_strength": number(DEFAULT_HOMING_STRENGTH, 0.0, 0.01,
                "Spring constant pulling puffs back to their anchor"),
            "damping": number(DEFAULT_DAMPING, 0.9, 0.999,
                "Velocity retained per tick"),
            "drift_strength": number(DEFAULT_DRIFT_STRENGTH, 0.0, 0.5,
                "Fraction of the noise sample added to velocity (0 disables drift)"),
            "noise": choice(NoiseKind::default().name(),
                &NoiseKind::ALL.map(NoiseKind::name), "Base noise for puff drift"),
            "edge": choice(EdgePolicy::default().name(),
                &EdgePolicy::ALL.map(EdgePolicy::name), "Edge behavior for puffs leaving the viewport"),
            "backend": choice(Backend::default().name(),
                &Backend::ALL.map(Backend::name), "Renderer implementation"),
            "inactive_fog": choice(InactiveFog::default().name(),
                &InactiveFog::ALL.map(InactiveFog::name), "Fog behavior while the spotlight is off"),
            "puff_radius_min": number(DEFAULT_PUFF_RADIUS_MIN, 1.0, 1000.0, "Smallest puff radius"),
            "puff_radius_max": number(DEFAULT_PUFF_RADIUS_MAX, 1.0, 1000.0, "Largest puff radius"),
            "opacity_min": number(DEFAULT_OPACITY_MIN, 0.001, 0.999, "Smallest puff base opacity"),
            "opacity_max": number(DEFAULT_OPACITY_MAX, 0.001, 0.999, "Largest puff base opacity"),
            "rotation_speed_max": number(DEFAULT_ROTATION_SPEED_MAX, 0.0, 0.1,
                "Full span of per-puff rotation speed in radians per tick"),
            "ellipse_flatten": number(DEFAULT_ELLIPSE_FLATTEN, 0.05, 1.0,
                "Vertical squash of each puff ellipse"),
            "time_step": number(DEFAULT_TIME_STEP, 0.0, 0.1, "Noise time advanced per frame"),
            "max_frame_delta": number(DEFAULT_MAX_FRAME_DELTA, 0.1, 60.0,
                "Largest frame gap (in 60 Hz frames) integrated by one tick"),
            "octaves": {
                "type": "integer", "default": DEFAULT_OCTAVES, "min": 1, "max": MAX_OCTAVES,
                "description": "fbm octave count"
            },
            "shader_scale": number(DEFAULT_SHADER_SCALE, 0.1, 20.0, "Shader noise frequency"),
            "shader_warp": number(DEFAULT_SHADER_WARP, 0.0, 2.0,
                "Tangential uv warp at the spotlight center"),
            "mask_exponent": number(DEFAULT_MASK_EXPONENT, 0.1, 8.0,
                "Exponent k of the shader density mask 1 - falloff^k"),
            "base_alpha": number(DEFAULT_BASE_ALPHA, 0.0, 1.0, "Shader alpha at full density"),
            "fog_tint": color(DEFAULT_FOG_TINT, "Core tint of particle puffs"),
            "shader_tone_low": color(DEFAULT_TONE_LOW, "Shader color at thin fog"),
            "shader_tone_high": color(DEFAULT_TONE_HIGH, "Shader color at dense fog"),
        })
    }
}

fn number(default: f64, min: f64, max: f64, description: &str) -> Value {
    json!({"type": "number", "default": default, "min": min, "max": max, "description": description})
}

fn choice(default: &str, options: &[&str], description: &str) -> Value {
    json!({"type": "string", "default": default, "options": options, "description": description})
}

fn color(default: &str, description: &str) -> Value {
    json!({"type": "color", "default": default, "description": description})
}

fn positive(name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::config(name, format!("must be finite and > 0, got {value}")))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::config(name, format!("must be finite and >= 0, got {value}")))
    }
}

fn read_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

fn read_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

fn read_u32(params: &Value, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(default)
}

fn read_variant<T>(
    params: &Value,
    name: &str,
    default: T,
    parse: fn(&str) -> Option<T>,
) -> Result<T, EngineError> {
    match params.get(name).and_then(Value::as_str) {
        Some(value) => parse(value).ok_or_else(|| EngineError::UnknownVariant {
            name: name.to_string(),
            value: value.to_string(),
        }),
        None => Ok(default),
    }
}

fn read_color(params: &Value, name: &str, default: Srgb) -> Result<Srgb, EngineError> {
    match params.get(name).and_then(Value::as_str) {
        Some(hex) => Srgb::from_hex(hex),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn default_tints_match_hex_constants() {
        let d = EngineConfig::default();
        assert_eq!(d.fog_tint.to_hex(), DEFAULT_FOG_TINT);
        assert_eq!(d.shader_tone_low.to_hex(), DEFAULT_TONE_LOW);
        assert_eq!(d.shader_tone_high.to_hex(), DEFAULT_TONE_HIGH);
    }

    #[test]
    fn empty_json_gives_defaults() {
        let config = EngineConfig::from_json(&json!({})).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn json_overrides_are_applied() {
        let config = EngineConfig::from_json(&json!({
            "particle_count": 12,
            "repulsion_multiplier": 1.6,
            "edge": "wrap",
            "backend": "shader",
            "noise": "gradient",
            "fog_tint": "#ffffff",
        }))
        .unwrap();
        assert_eq!(config.particle_count, 12);
        assert!((config.repulsion_multiplier - 1.6).abs() < f64::EPSILON);
        assert_eq!(config.edge, EdgePolicy::Wrap);
        assert_eq!(config.backend, Backend::Shader);
        assert_eq!(config.noise, NoiseKind::Gradient);
        assert_eq!(config.fog_tint.to_rgb8(), [255, 255, 255]);
    }

    #[test]
    fn wrongly_typed_keys_fall_back_to_default() {
        let config = EngineConfig::from_json(&json!({
            "particle_count": "lots",
            "damping": null,
            "edge": 3,
        }))
        .unwrap();
        assert_eq!(config.particle_count, DEFAULT_PARTICLE_COUNT);
        assert!((config.damping - DEFAULT_DAMPING).abs() < f64::EPSILON);
        assert_eq!(config.edge, EdgePolicy::None);
    }

    #[test]
    fn unknown_backend_fails_fast() {
        let err = EngineConfig::from_json(&json!({"backend": "raytrace"})).unwrap_err();
        assert!(matches!(err, EngineError::UnknownBackend(ref n) if n == "raytrace"));
    }

    #[test]
    fn unknown_edge_policy_fails_fast() {
        let err = EngineConfig::from_json(&json!({"edge": "bounce"})).unwrap_err();
        assert!(matches!(err, EngineError::UnknownVariant { ref name, .. } if name == "edge"));
    }

    #[test]
    fn bad_color_fails_fast() {
        let err = EngineConfig::from_json(&json!({"fog_tint": "grey"})).unwrap_err();
        assert!(matches!(err, EngineError::InvalidColor(_)));
    }

    #[test]
    fn zero_particle_count_is_rejected() {
        let err = EngineConfig::from_json(&json!({"particle_count": 0})).unwrap_err();
        assert!(err.to_string().contains("particle_count"));
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        for radius in [0.0, -280.0, f64::NAN, f64::INFINITY] {
            let config = EngineConfig {
                spotlight_radius: radius,
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert!(
                err.to_string().contains("spotlight_radius"),
                "radius {radius} gave: {err}"
            );
        }
    }

    #[test]
    fn damping_must_be_below_one() {
        for damping in [0.0, 1.0, 1.2] {
            let config = EngineConfig {
                damping,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "damping {damping} accepted");
        }
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let radii = EngineConfig {
            puff_radius_min: 400.0,
            puff_radius_max: 100.0,
            ..Default::default()
        };
        assert!(radii.validate().is_err());

        let opacity = EngineConfig {
            opacity_min: 0.5,
            opacity_max: 0.2,
            ..Default::default()
        };
        assert!(opacity.validate().is_err());

        let opaque = EngineConfig {
            opacity_max: 1.0,
            ..Default::default()
        };
        assert!(opaque.validate().is_err());
    }

    #[test]
    fn octaves_out_of_range_are_rejected() {
        assert!(EngineConfig::from_json(&json!({"octaves": 0})).is_err());
        assert!(EngineConfig::from_json(&json!({"octaves": 9})).is_err());
        assert!(EngineConfig::from_json(&json!({"octaves": 8})).is_ok());
    }

    #[test]
    fn to_json_round_trips_through_from_json() {
        let config = EngineConfig {
            particle_count: 33,
            edge: EdgePolicy::Wrap,
            inactive_fog: InactiveFog::Hidden,
            ..Default::default()
        };
        let back = EngineConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn schema_covers_every_json_key() {
        let schema = EngineConfig::param_schema();
        let values = EngineConfig::default().to_json();
        let keys = values.as_object().unwrap();
        for key in keys.keys() {
            assert!(schema.get(key).is_some(), "schema missing '{key}'");
        }
        assert_eq!(schema.as_object().unwrap().len(), keys.len());
        assert_eq!(schema["backend"]["options"], json!(["particle", "shader"]));
    }

    #[test]
    fn serde_uses_snake_case_variants() {
        let config = EngineConfig {
            backend: Backend::Shader,
            ..Default::default()
        };
        let v = serde_json::to_value(&config).unwrap();
        assert_eq!(v["backend"], "shader");
        assert_eq!(v["fog_tint"], "#d2dae6");
        let back: EngineConfig = serde_json::from_value(v).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn backend_from_name() {
        assert_eq!(Backend::from_name("particle").unwrap(), Backend::Particle);
        assert_eq!(Backend::from_name("shader").unwrap(), Backend::Shader);
        assert!(Backend::from_name("webgpu").is_err());
    }
}
