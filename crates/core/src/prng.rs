//! Seedable Xorshift64 generator used to scatter puffs.
//!
//! Swarm population must be reproducible (same seed and viewport, same fog),
//! so the engine never reaches for an OS-seeded RNG.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Xorshift64 with the (13, 7, 17) shift triple.
///
/// A zero seed is the algorithm's fixed point and is swapped for a
/// non-zero constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const ZERO_SEED_FALLBACK: u64 = 0x9E37_79B9_7F4A_7C15;

    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 {
                Self::ZERO_SEED_FALLBACK
            } else {
                seed
            },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in [0, 1), built from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [min, max). Returns `min` when the range is empty.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        min + self.next_f64() * (max - min)
    }

    /// Uniform in [-span/2, span/2).
    pub fn next_signed(&mut self, span: f64) -> f64 {
        (self.next_f64() - 0.5) * span
    }

    /// Uniform angle in [0, 2π).
    pub fn next_angle(&mut self) -> f64 {
        self.next_f64() * TAU
    }

    /// Uniform point inside the `width` x `height` rectangle anchored at the origin.
    pub fn next_point_in(&mut self, width: f64, height: f64) -> DVec2 {
        let x = self.next_f64() * width;
        let y = self.next_f64() * height;
        DVec2::new(x, y)
    }
}
