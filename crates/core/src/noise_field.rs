//! Deterministic scalar noise for puff drift and the fog shader.
//!
//! Every function here is pure: the same inputs always give the same output,
//! and nothing is cached between calls. Base noise is bounded in [-1, 1];
//! [`NoiseField::fbm`] and [`fbm_value`] stay within [`octave_bound`].

use glam::DVec2;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// Frequency multiplier between successive fbm octaves.
pub const FREQUENCY_GAIN: f64 = 2.1;
/// Amplitude multiplier between successive fbm octaves.
pub const AMPLITUDE_GAIN: f64 = 0.5;
/// Amplitude of the first fbm octave.
pub const INITIAL_AMPLITUDE: f64 = 0.5;
/// Default number of fbm octaves.
pub const DEFAULT_OCTAVES: u32 = 5;
/// Largest octave count accepted by configs and the shader loop.
pub const MAX_OCTAVES: u32 = 8;

/// Which base noise drives puff drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Products of sinusoids over an integer lattice wrapped at 256.
    #[default]
    Lattice,
    /// 3D Perlin gradient noise.
    Gradient,
    /// Hash-based 2D value noise, identical to the shader's noise.
    Value,
}

impl NoiseKind {
    pub const ALL: [NoiseKind; 3] = [NoiseKind::Lattice, NoiseKind::Gradient, NoiseKind::Value];

    pub fn name(self) -> &'static str {
        match self {
            NoiseKind::Lattice => "lattice",
            NoiseKind::Gradient => "gradient",
            NoiseKind::Value => "value",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Noise generator with a fixed base kind and octave count.
#[derive(Debug, Clone)]
pub struct NoiseField {
    kind: NoiseKind,
    octaves: u32,
    perlin: Perlin,
}

impl NoiseField {
    /// `seed` only affects [`NoiseKind::Gradient`]; the other kinds are seedless.
    pub fn new(kind: NoiseKind, octaves: u32, seed: u32) -> Self {
        Self {
            kind,
            octaves: octaves.clamp(1, MAX_OCTAVES),
            perlin: Perlin::new(seed),
        }
    }

    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    /// Base noise in [-1, 1].
    pub fn noise(&self, x: f64, y: f64, t: f64) -> f64 {
        match self.kind {
            NoiseKind::Lattice => lattice_noise(x, y, t),
            NoiseKind::Gradient => self.perlin.get([x, y, t]).clamp(-1.0, 1.0),
            NoiseKind::Value => value_noise(DVec2::new(x + t, y)),
        }
    }

    /// Fractal sum of [`Self::noise`] octaves, bounded by [`octave_bound`].
    pub fn fbm(&self, x: f64, y: f64, t: f64) -> f64 {
        let mut sum = 0.0;
        let mut amplitude = INITIAL_AMPLITUDE;
        let mut frequency = 1.0;
        for _ in 0..self.octaves {
            sum += amplitude * self.noise(x * frequency, y * frequency, t);
            frequency *= FREQUENCY_GAIN;
            amplitude *= AMPLITUDE_GAIN;
        }
        sum
    }
}

/// Upper bound on `|fbm|` for the given octave count: `Σ 0.5^(i+1)`.
///
/// 5 octaves give 0.96875.
pub fn octave_bound(octaves: u32) -> f64 {
    (0..octaves)
        .map(|i| INITIAL_AMPLITUDE * AMPLITUDE_GAIN.powi(i as i32))
        .sum()
}

/// Sinusoids of lattice-quantized inputs.
///
/// Piecewise constant between integer lattice points, so drift driven by it
/// changes in steps rather than jittering every frame.
pub fn lattice_noise(x: f64, y: f64, t: f64) -> f64 {
    let lx = lattice(x);
    let ly = lattice(y);
    let lt = lattice(t);
    (lx * 0.1 + lt * 0.05).sin()
        * (ly * 0.1 + lt * 0.03).cos()
        * ((lx + ly) * 0.07 + lt * 0.04).sin()
}

fn lattice(v: f64) -> f64 {
    ((v.floor() as i64) & 255) as f64
}

/// Pseudo-random value in [0, 1) for a lattice cell.
///
/// Same constants as the fog fragment shader's `hash21`.
pub fn hash21(cell: DVec2) -> f64 {
    let h = (cell.dot(DVec2::new(127.1, 311.7))).sin() * 43_758.545_3;
    h - h.floor()
}

/// Smoothly interpolated 2D value noise in [-1, 1].
pub fn value_noise(p: DVec2) -> f64 {
    let i = p.floor();
    let f = p - i;
    let u = f * f * (DVec2::splat(3.0) - 2.0 * f);

    let a = hash21(i);
    let b = hash21(i + DVec2::X);
    let c = hash21(i + DVec2::Y);
    let d = hash21(i + DVec2::ONE);

    let top = a + (b - a) * u.x;
    let bottom = c + (d - c) * u.x;
    (top + (bottom - top) * u.y) * 2.0 - 1.0
}

/// Value-noise fbm over a 2D domain, the CPU twin of the shader's `fbm`.
pub fn fbm_value(p: DVec2, octaves: u32) -> f64 {
    let mut sum = 0.0;
    let mut amplitude = INITIAL_AMPLITUDE;
    let mut q = p;
    for _ in 0..octaves.clamp(1, MAX_OCTAVES) {
        sum += amplitude * value_noise(q);
        q *= FREQUENCY_GAIN;
        amplitude *= AMPLITUDE_GAIN;
    }
    sum
}
