//! Domain-warped fbm fog: GLSL sources and the CPU reference shader.
//!
//! [`FOG_FRAGMENT_SHADER`] runs on the GPU through `render::GlFogPass`.
//! [`FogShader::shade`] evaluates the same function for one pixel on the
//! CPU. The two are kept formula-for-formula identical so the CLI and the
//! tests can stand in for a GPU.
//!
//! The shader is stateless: each pixel depends only on its position, the
//! viewport, the time and the spotlight.

use crate::color::{Rgba, Srgb};
use crate::config::EngineConfig;
use crate::noise_field::{fbm_value, octave_bound};
use crate::spotlight::{SpotlightField, SpotlightState};
use crate::viewport::Viewport;
use glam::DVec2;

/// uv drift per unit of noise time.
pub const DRIFT_VELOCITY: DVec2 = DVec2::new(0.03, 0.012);
/// Offset of the second `q` sample.
pub const Q_OFFSET: DVec2 = DVec2::new(5.2, 1.3);
/// Offset of the second `r` sample.
pub const R_OFFSET: DVec2 = DVec2::new(8.3, 2.8);
/// Fixed phase added before the second warp.
pub const WARP_PHASE: DVec2 = DVec2::new(1.7, 9.2);
/// Strength of each domain-warp step.
pub const WARP_GAIN: f64 = 4.0;

/// GLSL ES 3.0 vertex shader that renders a fullscreen triangle.
///
/// Positions come from `gl_VertexID` alone, so draw 3 vertices with an
/// empty VAO bound.
pub const FULLSCREEN_VERTEX_SHADER: &str = r#"#version 300 es
out vec2 v_uv;
void main() {
    v_uv = vec2((gl_VertexID << 1) & 2, gl_VertexID & 2);
    gl_Position = vec4(v_uv * 2.0 - 1.0, 0.0, 1.0);
}
"#;

/// GLSL ES 3.0 fog fragment shader. Outputs premultiplied alpha.
pub const FOG_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec2 v_uv;
out vec4 frag_color;

uniform vec2 u_resolution;
uniform float u_time;
uniform vec2 u_spot_center;
uniform float u_spot_radius;
uniform float u_spot_active;
uniform float u_repel_multiplier;
uniform float u_mask_exponent;
uniform float u_scale;
uniform float u_warp;
uniform float u_base_alpha;
uniform int u_octaves;
uniform vec3 u_tone_low;
uniform vec3 u_tone_high;

const int MAX_OCTAVES = 8;
const vec2 DRIFT_VELOCITY = vec2(0.03, 0.012);
const vec2 Q_OFFSET = vec2(5.2, 1.3);
const vec2 R_OFFSET = vec2(8.3, 2.8);
const vec2 WARP_PHASE = vec2(1.7, 9.2);
const float WARP_GAIN = 4.0;

float hash21(vec2 p) {
    return fract(sin(dot(p, vec2(127.1, 311.7))) * 43758.5453);
}

float value_noise(vec2 p) {
    vec2 i = floor(p);
    vec2 f = p - i;
    vec2 u = f * f * (3.0 - 2.0 * f);
    float a = hash21(i);
    float b = hash21(i + vec2(1.0, 0.0));
    float c = hash21(i + vec2(0.0, 1.0));
    float d = hash21(i + vec2(1.0, 1.0));
    float top = mix(a, b, u.x);
    float bottom = mix(c, d, u.x);
    return mix(top, bottom, u.y) * 2.0 - 1.0;
}

float fbm(vec2 p) {
    float sum = 0.0;
    float amplitude = 0.5;
    for (int i = 0; i < MAX_OCTAVES; i++) {
        if (i >= u_octaves) break;
        sum += amplitude * value_noise(p);
        p *= 2.1;
        amplitude *= 0.5;
    }
    return sum;
}

float octave_bound() {
    float bound = 0.0;
    float amplitude = 0.5;
    for (int i = 0; i < MAX_OCTAVES; i++) {
        if (i >= u_octaves) break;
        bound += amplitude;
        amplitude *= 0.5;
    }
    return bound;
}

float spot_zone() {
    return u_repel_multiplier * u_spot_radius;
}

float spot_swirl_weight(vec2 px) {
    if (u_spot_active < 0.5) return 0.0;
    float zone = spot_zone();
    float d = distance(px, u_spot_center);
    return d < zone ? 1.0 - d / zone : 0.0;
}

vec2 spot_tangent(vec2 px) {
    vec2 offset = px - u_spot_center;
    float len = length(offset);
    if (len <= 0.0) return vec2(0.0);
    vec2 n = offset / len;
    return vec2(-n.y, n.x);
}

float spot_density_mask(vec2 px) {
    if (u_spot_active < 0.5) return 1.0;
    float falloff = 1.0 - smoothstep(0.0, spot_zone(), distance(px, u_spot_center));
    return 1.0 - pow(falloff, u_mask_exponent);
}

void main() {
    // Top-left origin, matching the particle renderer and spotlight input.
    vec2 px = vec2(gl_FragCoord.x, u_resolution.y - gl_FragCoord.y);
    float side = min(u_resolution.x, u_resolution.y);
    vec2 uv = px / side + spot_tangent(px) * (u_warp * spot_swirl_weight(px));

    vec2 p = uv * u_scale;
    vec2 drift = DRIFT_VELOCITY * u_time;
    vec2 q = vec2(fbm(p + drift), fbm(p + drift + Q_OFFSET));
    vec2 w = p + WARP_GAIN * q + WARP_PHASE + drift;
    vec2 r = vec2(fbm(w), fbm(w + R_OFFSET));
    float f = fbm(p + WARP_GAIN * r);

    float bound = octave_bound();
    f = clamp((f + bound) / (2.0 * bound), 0.0, 1.0);

    vec3 color = mix(u_tone_low, u_tone_high, f);
    float alpha = clamp(f * u_base_alpha * spot_density_mask(px), 0.0, 1.0);
    frag_color = vec4(color * alpha, alpha);
}
"#;

/// Uniform values for one draw of [`FOG_FRAGMENT_SHADER`], in GL-ready types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub spot_center: [f32; 2],
    pub spot_radius: f32,
    pub spot_active: f32,
    pub repel_multiplier: f32,
    pub mask_exponent: f32,
    pub scale: f32,
    pub warp: f32,
    pub base_alpha: f32,
    pub octaves: i32,
    pub tone_low: [f32; 3],
    pub tone_high: [f32; 3],
}

/// CPU evaluation of the fog fragment shader.
#[derive(Debug, Clone)]
pub struct FogShader {
    field: SpotlightField,
    repulsion_multiplier: f64,
    mask_exponent: f64,
    scale: f64,
    warp: f64,
    base_alpha: f64,
    octaves: u32,
    tone_low: Srgb,
    tone_high: Srgb,
}

impl FogShader {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            field: SpotlightField::from_config(config),
            repulsion_multiplier: config.repulsion_multiplier,
            mask_exponent: config.mask_exponent,
            scale: config.shader_scale,
            warp: config.shader_warp,
            base_alpha: config.base_alpha,
            octaves: config.octaves,
            tone_low: config.shader_tone_low,
            tone_high: config.shader_tone_high,
        }
    }

    /// Fog density `f` in [0, 1] at `pixel`, before the spotlight mask.
    pub fn density(&self, pixel: DVec2, viewport: Viewport, time: f64, spot: &SpotlightState) -> f64 {
        let side = viewport.min_side().max(1.0);
        let swirl = self.field.tangent(pixel, spot) * (self.warp * self.field.swirl_weight(pixel, spot));
        let uv = pixel / side + swirl;

        let p = uv * self.scale;
        let drift = DRIFT_VELOCITY * time;
        let fbm = |v: DVec2| fbm_value(v, self.octaves);
        let q = DVec2::new(fbm(p + drift), fbm(p + drift + Q_OFFSET));
        let w = p + WARP_GAIN * q + WARP_PHASE + drift;
        let r = DVec2::new(fbm(w), fbm(w + R_OFFSET));
        let f = fbm(p + WARP_GAIN * r);

        let bound = octave_bound(self.octaves);
        ((f + bound) / (2.0 * bound)).clamp(0.0, 1.0)
    }

    /// Straight-alpha fog color at `pixel` (pixel-center coordinates,
    /// top-left origin).
    pub fn shade(&self, pixel: DVec2, viewport: Viewport, time: f64, spot: &SpotlightState) -> Rgba {
        let f = self.density(pixel, viewport, time, spot);
        let mask = self.field.density_mask(pixel, spot);
        self.tone_low
            .mix(self.tone_high, f)
            .with_alpha(f * self.base_alpha * mask)
    }

    /// Uniforms reproducing [`Self::shade`] on the GPU.
    pub fn uniforms(&self, viewport: Viewport, time: f64, spot: &SpotlightState) -> FogUniforms {
        let rgb = |c: Srgb| [c.r as f32, c.g as f32, c.b as f32];
        FogUniforms {
            resolution: [viewport.width as f32, viewport.height as f32],
            time: time as f32,
            spot_center: [spot.center.x as f32, spot.center.y as f32],
            spot_radius: spot.radius as f32,
            spot_active: if spot.active { 1.0 } else { 0.0 },
            repel_multiplier: self.repulsion_multiplier as f32,
            mask_exponent: self.mask_exponent as f32,
            scale: self.scale as f32,
            warp: self.warp as f32,
            base_alpha: self.base_alpha as f32,
            octaves: self.octaves as i32,
            tone_low: rgb(self.tone_low),
            tone_high: rgb(self.tone_high),
        }
    }
}
