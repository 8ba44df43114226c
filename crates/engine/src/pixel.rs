//! Conversion of a [`PixelSurface`] to 8-bit RGBA.
//!
//! Always available (no feature gate) so the PNG path and any host that
//! uploads raw pixels share one conversion.

use fog_core::color::Srgb;
use fog_core::surface::PixelSurface;

/// Straight-alpha RGBA8, `width * height * 4` bytes.
pub fn surface_to_rgba(surface: &PixelSurface) -> Vec<u8> {
    surface
        .pixels()
        .flat_map(|c| {
            let [r, g, b] = Srgb {
                r: c.r,
                g: c.g,
                b: c.b,
            }
            .to_rgb8();
            [r, g, b, (c.a.clamp(0.0, 1.0) * 255.0).round() as u8]
        })
        .collect()
}

/// Opaque RGBA8 of the surface composited over a solid `background`.
pub fn surface_over_background(surface: &PixelSurface, background: Srgb) -> Vec<u8> {
    let bg = [background.r, background.g, background.b];
    surface
        .data()
        .iter()
        .flat_map(|px| {
            let k = 1.0 - f64::from(px[3]);
            let [r, g, b] = Srgb {
                r: f64::from(px[0]) + bg[0] * k,
                g: f64::from(px[1]) + bg[1] * k,
                b: f64::from(px[2]) + bg[2] * k,
            }
            .to_rgb8();
            [r, g, b, 255u8]
        })
        .collect()
}
