//! Spotlight geometry shared by both renderer backends.
//!
//! [`SpotlightField`] turns a point and the current [`SpotlightState`] into a
//! repulsion force and visibility terms. The particle swarm calls it per puff;
//! the CPU fog shader calls it per pixel, and the GLSL fog shader carries a
//! line-for-line port (`spot_*` functions in
//! [`FOG_FRAGMENT_SHADER`](crate::shader::FOG_FRAGMENT_SHADER)). Keep the two
//! in step when changing a formula here.
//!
//! With `active == false` every term is the identity: zero force, opacity
//! multiplier 1, no swirl, full density.

use crate::config::EngineConfig;
use crate::error::EngineError;
use glam::DVec2;

/// Caller-owned spotlight input, read once at the start of each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotlightState {
    /// Center in render-space pixels. May lie outside the viewport.
    pub center: DVec2,
    /// Radius of the fully cleared zone in pixels, > 0.
    pub radius: f64,
    pub active: bool,
}

impl SpotlightState {
    /// Returns `EngineError::InvalidConfig` unless `radius` is finite and positive.
    pub fn new(center: DVec2, radius: f64, active: bool) -> Result<Self, EngineError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(EngineError::config(
                "spotlight_radius",
                format!("must be finite and > 0, got {radius}"),
            ));
        }
        Ok(Self {
            center,
            radius,
            active,
        })
    }

    /// Active spotlight at `center` with the configured radius.
    pub fn from_config(config: &EngineConfig, center: DVec2) -> Self {
        Self {
            center,
            radius: config.spotlight_radius,
            active: true,
        }
    }
}

/// Per-point output of [`SpotlightField::sample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotlightSample {
    /// Radial push plus tangential swirl.
    pub force: DVec2,
    /// Multiplier applied to a puff's base opacity, in [0, 1].
    pub opacity: f64,
    /// Distance from the spotlight center.
    pub distance: f64,
}

impl SpotlightSample {
    const IDENTITY: SpotlightSample = SpotlightSample {
        force: DVec2::ZERO,
        opacity: 1.0,
        distance: f64::INFINITY,
    };
}

/// The spotlight tunables of an [`EngineConfig`], as a stateless mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotlightField {
    repulsion_multiplier: f64,
    repulsion_strength: f64,
    repulsion_sharpness: f64,
    falloff_exponent: f64,
    swirl_strength: f64,
    mask_exponent: f64,
}

impl SpotlightField {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            repulsion_multiplier: config.repulsion_multiplier,
            repulsion_strength: config.repulsion_strength,
            repulsion_sharpness: config.repulsion_sharpness,
            falloff_exponent: config.falloff_exponent,
            swirl_strength: config.swirl_strength,
            mask_exponent: config.mask_exponent,
        }
    }

    /// Radius of the disc inside which points are pushed and warped.
    pub fn repel_zone(&self, spot: &SpotlightState) -> f64 {
        self.repulsion_multiplier * spot.radius
    }

    /// Force and opacity multiplier at `point`.
    pub fn sample(&self, point: DVec2, spot: &SpotlightState) -> SpotlightSample {
        if !spot.active {
            return SpotlightSample::IDENTITY;
        }
        let distance = point.distance(spot.center);
        SpotlightSample {
            force: self.force_at(point - spot.center, distance, spot),
            opacity: self.fade(distance, spot),
            distance,
        }
    }

    pub fn repulsion(&self, point: DVec2, spot: &SpotlightState) -> DVec2 {
        self.sample(point, spot).force
    }

    pub fn opacity_multiplier(&self, point: DVec2, spot: &SpotlightState) -> f64 {
        self.sample(point, spot).opacity
    }

    /// `1 - dist/zone` inside the repulsion zone, 0 outside or when inactive.
    pub fn swirl_weight(&self, point: DVec2, spot: &SpotlightState) -> f64 {
        if !spot.active {
            return 0.0;
        }
        let zone = self.repel_zone(spot);
        let distance = point.distance(spot.center);
        if distance < zone {
            1.0 - distance / zone
        } else {
            0.0
        }
    }

    /// Unit tangent (radial direction rotated +90°) at `point`.
    ///
    /// Zero at the exact center, where the direction is undefined.
    pub fn tangent(&self, point: DVec2, spot: &SpotlightState) -> DVec2 {
        (point - spot.center).normalize_or_zero().perp()
    }

    /// Shader density mask `1 - falloff^k`, where
    /// `falloff = 1 - smoothstep(0, zone, dist)`.
    ///
    /// 0 at the center, rising to 1 at the zone edge and beyond.
    pub fn density_mask(&self, point: DVec2, spot: &SpotlightState) -> f64 {
        if !spot.active {
            return 1.0;
        }
        let falloff = 1.0 - smoothstep(0.0, self.repel_zone(spot), point.distance(spot.center));
        1.0 - falloff.powf(self.mask_exponent)
    }

    fn force_at(&self, offset: DVec2, distance: f64, spot: &SpotlightState) -> DVec2 {
        let zone = self.repel_zone(spot);
        if !(distance > 0.0 && distance < zone) {
            return DVec2::ZERO;
        }
        let magnitude =
            (1.0 - distance / zone).powf(self.repulsion_sharpness) * self.repulsion_strength;
        let radial = offset / distance;
        radial * magnitude + radial.perp() * (self.swirl_strength * magnitude)
    }

    fn fade(&self, distance: f64, spot: &SpotlightState) -> f64 {
        if distance >= spot.radius {
            1.0
        } else {
            (distance / spot.radius).powf(self.falloff_exponent)
        }
    }
}

/// Hermite step matching GLSL `smoothstep`.
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn field_with_multiplier(multiplier: f64) -> SpotlightField {
        SpotlightField::from_config(&EngineConfig {
            repulsion_multiplier: multiplier,
            ..Default::default()
        })
    }

    fn spot_at(x: f64, y: f64) -> SpotlightState {
        SpotlightState::new(DVec2::new(x, y), 280.0, true).unwrap()
    }

    #[test]
    fn new_rejects_non_positive_radius() {
        assert!(SpotlightState::new(DVec2::ZERO, 0.0, true).is_err());
        assert!(SpotlightState::new(DVec2::ZERO, -5.0, true).is_err());
        assert!(SpotlightState::new(DVec2::ZERO, f64::NAN, true).is_err());
    }

    #[test]
    fn center_point_is_fully_transparent_and_unpushed() {
        let field = field_with_multiplier(1.6);
        let spot = spot_at(400.0, 300.0);
        let s = field.sample(DVec2::new(400.0, 300.0), &spot);
        assert_eq!(s.opacity, 0.0);
        assert_eq!(s.force, DVec2::ZERO);
    }

    #[test]
    fn point_beyond_zone_is_untouched() {
        let field = field_with_multiplier(1.6);
        let spot = spot_at(400.0, 300.0);
        assert!((field.repel_zone(&spot) - 448.0).abs() < EPS);
        let s = field.sample(DVec2::new(400.0, 860.0), &spot);
        assert!((s.distance - 560.0).abs() < EPS);
        assert_eq!(s.force, DVec2::ZERO);
        assert_eq!(s.opacity, 1.0);
    }

    #[test]
    fn force_is_exactly_zero_at_zone_edge() {
        let field = field_with_multiplier(1.6);
        let spot = spot_at(0.0, 0.0);
        let zone = field.repel_zone(&spot);
        assert_eq!(field.repulsion(DVec2::new(zone, 0.0), &spot), DVec2::ZERO);
        assert_ne!(field.repulsion(DVec2::new(zone - 1.0, 0.0), &spot), DVec2::ZERO);
    }

    #[test]
    fn force_points_away_with_counter_clockwise_swirl() {
        let field = SpotlightField::from_config(&EngineConfig {
            repulsion_multiplier: 1.0,
            repulsion_strength: 1.0,
            repulsion_sharpness: 1.0,
            swirl_strength: 0.5,
            ..Default::default()
        });
        let spot = spot_at(0.0, 0.0);
        let f = field.repulsion(DVec2::new(140.0, 0.0), &spot);
        // (1 - 140/280)^1 * 1 = 0.5 radially, 0.25 tangentially
        assert!((f.x - 0.5).abs() < EPS, "radial = {}", f.x);
        assert!((f.y - 0.25).abs() < EPS, "tangential = {}", f.y);
    }

    #[test]
    fn opacity_follows_power_law_inside_radius() {
        let field = SpotlightField::from_config(&EngineConfig {
            falloff_exponent: 2.0,
            ..Default::default()
        });
        let spot = spot_at(0.0, 0.0);
        let o = field.opacity_multiplier(DVec2::new(0.0, 140.0), &spot);
        assert!((o - 0.25).abs() < EPS);
    }

    #[test]
    fn inactive_spotlight_is_identity_everywhere() {
        let field = field_with_multiplier(1.8);
        let spot = SpotlightState {
            active: false,
            ..spot_at(100.0, 100.0)
        };
        for p in [DVec2::new(100.0, 100.0), DVec2::new(110.0, 90.0), DVec2::new(900.0, 0.0)] {
            let s = field.sample(p, &spot);
            assert_eq!(s.force, DVec2::ZERO);
            assert_eq!(s.opacity, 1.0);
            assert_eq!(field.swirl_weight(p, &spot), 0.0);
            assert_eq!(field.density_mask(p, &spot), 1.0);
        }
    }

    #[test]
    fn density_mask_recedes_toward_center() {
        let field = field_with_multiplier(1.5);
        let spot = spot_at(0.0, 0.0);
        assert!(field.density_mask(DVec2::ZERO, &spot).abs() < EPS);
        assert!((field.density_mask(DVec2::new(420.0, 0.0), &spot) - 1.0).abs() < EPS);
        let mid = field.density_mask(DVec2::new(210.0, 0.0), &spot);
        assert!(mid > 0.0 && mid < 1.0, "mid mask = {mid}");
    }

    #[test]
    fn swirl_weight_is_linear_in_zone() {
        let field = field_with_multiplier(1.0);
        let spot = spot_at(0.0, 0.0);
        assert!((field.swirl_weight(DVec2::new(70.0, 0.0), &spot) - 0.75).abs() < EPS);
        assert_eq!(field.swirl_weight(DVec2::new(300.0, 0.0), &spot), 0.0);
    }

    #[test]
    fn tangent_is_unit_and_perpendicular() {
        let field = field_with_multiplier(1.0);
        let spot = spot_at(10.0, 10.0);
        let p = DVec2::new(13.0, 14.0);
        let t = field.tangent(p, &spot);
        assert!((t.length() - 1.0).abs() < EPS);
        assert!(t.dot(p - spot.center).abs() < EPS);
        assert_eq!(field.tangent(spot.center, &spot), DVec2::ZERO);
    }

    #[test]
    fn smoothstep_matches_glsl_shape() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < EPS);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn opacity_multiplier_is_in_unit_interval(
                x in -2000.0_f64..2000.0,
                y in -2000.0_f64..2000.0,
                q in 1.0_f64..2.0,
            ) {
                let field = SpotlightField::from_config(&EngineConfig {
                    falloff_exponent: q,
                    ..Default::default()
                });
                let o = field.opacity_multiplier(DVec2::new(x, y), &spot_at(0.0, 0.0));
                prop_assert!((0.0..=1.0).contains(&o), "opacity = {o}");
            }

            #[test]
            fn opacity_fades_monotonically_toward_center(
                d1 in 0.0_f64..280.0,
                d2 in 0.0_f64..280.0,
                q in 1.0_f64..2.0,
            ) {
                let (near, far) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
                let field = SpotlightField::from_config(&EngineConfig {
                    falloff_exponent: q,
                    ..Default::default()
                });
                let spot = spot_at(0.0, 0.0);
                let o_near = field.opacity_multiplier(DVec2::new(near, 0.0), &spot);
                let o_far = field.opacity_multiplier(DVec2::new(0.0, far), &spot);
                prop_assert!(o_near <= o_far + EPS, "o({near}) = {o_near} > o({far}) = {o_far}");
            }

            #[test]
            fn force_strictly_decreases_inside_zone(
                a in 1.0_f64..447.0,
                gap in 0.5_f64..100.0,
                p in 1.0_f64..1.5,
            ) {
                let b = a + gap;
                prop_assume!(b < 448.0);
                let field = SpotlightField::from_config(&EngineConfig {
                    repulsion_multiplier: 1.6,
                    repulsion_sharpness: p,
                    ..Default::default()
                });
                let spot = spot_at(0.0, 0.0);
                let fa = field.repulsion(DVec2::new(a, 0.0), &spot).length();
                let fb = field.repulsion(DVec2::new(-b, 0.0), &spot).length();
                prop_assert!(fa > fb, "|f({a})| = {fa} <= |f({b})| = {fb}");
            }

            #[test]
            fn force_is_zero_outside_zone(d in 448.5_f64..5000.0, angle in 0.0_f64..6.28) {
                let field = field_with_multiplier(1.6);
                let p = DVec2::from_angle(angle) * d;
                prop_assert_eq!(field.repulsion(p, &spot_at(0.0, 0.0)), DVec2::ZERO);
            }
        }
    }
}
