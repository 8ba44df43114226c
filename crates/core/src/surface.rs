//! 2D paint targets for the particle backend.
//!
//! A [`Surface`] only needs to clear itself and fill rotated, flattened
//! ellipses with a radial gradient; that is the whole vocabulary of the
//! particle renderer. [`PixelSurface`] rasterizes on the CPU and backs the
//! CLI and tests. The wasm crate implements the trait over a browser 2D
//! canvas context.

use crate::color::Rgba;
use crate::viewport::Viewport;
use glam::DVec2;

/// One color stop of a radial gradient. `offset` is in [0, 1], measured from
/// the center outward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba,
}

impl GradientStop {
    pub fn new(offset: f64, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// Geometry of a radial-gradient ellipse.
///
/// The gradient runs from `center` to `radius` along the major axis. The
/// minor axis is `radius * flatten`, and the whole shape is rotated by
/// `rotation` radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialEllipse {
    pub center: DVec2,
    pub radius: f64,
    pub rotation: f64,
    pub flatten: f64,
}

impl RadialEllipse {
    /// Gradient coordinate of `point`: 0 at the center, 1 on the rim.
    pub fn gradient_position(&self, point: DVec2) -> f64 {
        let local = DVec2::from_angle(-self.rotation).rotate(point - self.center);
        let local = DVec2::new(local.x, local.y / self.flatten);
        local.length() / self.radius
    }

    /// Conservative pixel-space bounding box as `(min, max)`.
    pub fn bounds(&self) -> (DVec2, DVec2) {
        let r = DVec2::splat(self.radius);
        (self.center - r, self.center + r)
    }
}

/// A paint target the particle renderer can draw onto.
pub trait Surface {
    fn size(&self) -> Viewport;

    /// Resizes the backing store. Contents are undefined afterwards; callers
    /// clear before drawing.
    fn resize(&mut self, viewport: Viewport);

    /// Clears every pixel to fully transparent.
    fn clear(&mut self);

    /// Source-over fills `ellipse` with a radial gradient through `stops`.
    /// Nothing is painted outside the rim.
    fn fill_radial_ellipse(&mut self, ellipse: &RadialEllipse, stops: &[GradientStop]);
}

/// Samples a stop list at `t`, interpolating linearly between neighbours.
///
/// `stops` must be sorted by offset. Values before the first or after the
/// last stop take that stop's color. An empty list is transparent.
pub fn sample_gradient(stops: &[GradientStop], t: f64) -> Rgba {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Rgba::TRANSPARENT,
    };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let f = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return Rgba {
                r: a.color.r + (b.color.r - a.color.r) * f,
                g: a.color.g + (b.color.g - a.color.g) * f,
                b: a.color.b + (b.color.b - a.color.b) * f,
                a: a.color.a + (b.color.a - a.color.a) * f,
            };
        }
    }
    last.color
}

/// CPU surface storing premultiplied RGBA, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSurface {
    viewport: Viewport,
    data: Vec<[f32; 4]>,
}

impl PixelSurface {
    /// A transparent surface. Zero-area sizes are allowed.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            data: vec![[0.0; 4]; viewport.area()],
        }
    }

    /// Read-only premultiplied pixels.
    pub fn data(&self) -> &[[f32; 4]] {
        &self.data
    }

    /// Straight-alpha color at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let idx = self.index(x, y)?;
        Some(unpremultiply(self.data[idx]))
    }

    /// Overwrites `(x, y)` with `color`, ignoring out-of-range coordinates.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(idx) = self.index(x, y) {
            self.data[idx] = premultiply(color);
        }
    }

    /// Composites `color` over `(x, y)`.
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(idx) = self.index(x, y) {
            self.data[idx] = source_over(premultiply(color), self.data[idx]);
        }
    }

    /// Iterates straight-alpha colors row by row.
    pub fn pixels(&self) -> impl Iterator<Item = Rgba> + '_ {
        self.data.iter().map(|&px| unpremultiply(px))
    }

    /// Highest alpha on the surface.
    pub fn max_alpha(&self) -> f32 {
        self.data.iter().map(|px| px[3]).fold(0.0, f32::max)
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.viewport.width && y < self.viewport.height {
            Some(y as usize * self.viewport.width as usize + x as usize)
        } else {
            None
        }
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.data = vec![[0.0; 4]; viewport.area()];
    }

    fn clear(&mut self) {
        self.data.fill([0.0; 4]);
    }

    fn fill_radial_ellipse(&mut self, ellipse: &RadialEllipse, stops: &[GradientStop]) {
        if self.viewport.is_empty() || !(ellipse.radius > 0.0 && ellipse.flatten > 0.0) {
            return;
        }
        let (min, max) = ellipse.bounds();
        let size = self.viewport.size();
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = max.x.ceil().min(size.x) as u32;
        let y1 = max.y.ceil().min(size.y) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                // Sample at pixel centers, like canvas rasterization.
                let p = DVec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let t = ellipse.gradient_position(p);
                if t > 1.0 {
                    continue;
                }
                let color = sample_gradient(stops, t);
                if color.a > 0.0 {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }
}

fn premultiply(c: Rgba) -> [f32; 4] {
    let a = c.a.clamp(0.0, 1.0);
    [
        (c.r * a) as f32,
        (c.g * a) as f32,
        (c.b * a) as f32,
        a as f32,
    ]
}

fn unpremultiply(px: [f32; 4]) -> Rgba {
    let a = f64::from(px[3]);
    if a <= 0.0 {
        return Rgba::TRANSPARENT;
    }
    Rgba {
        r: f64::from(px[0]) / a,
        g: f64::from(px[1]) / a,
        b: f64::from(px[2]) / a,
        a,
    }
}

fn source_over(src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
    let k = 1.0 - src[3];
    [
        src[0] + dst[0] * k,
        src[1] + dst[1] * k,
        src[2] + dst[2] * k,
        src[3] + dst[3] * k,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Srgb;

    fn white(a: f64) -> Rgba {
        Srgb::from_rgb8(255, 255, 255).with_alpha(a)
    }

    fn fade_stops() -> Vec<GradientStop> {
        vec![
            GradientStop::new(0.0, white(0.8)),
            GradientStop::new(1.0, white(0.0)),
        ]
    }

    fn disc(center: DVec2, radius: f64) -> RadialEllipse {
        RadialEllipse {
            center,
            radius,
            rotation: 0.0,
            flatten: 1.0,
        }
    }

    #[test]
    fn new_surface_is_transparent() {
        let s = PixelSurface::new(Viewport::new(4, 3));
        assert_eq!(s.data().len(), 12);
        assert_eq!(s.max_alpha(), 0.0);
        assert_eq!(s.pixel(3, 2), Some(Rgba::TRANSPARENT));
        assert_eq!(s.pixel(4, 0), None);
    }

    #[test]
    fn zero_area_surface_accepts_draws() {
        let mut s = PixelSurface::new(Viewport::new(0, 10));
        s.fill_radial_ellipse(&disc(DVec2::ZERO, 5.0), &fade_stops());
        assert!(s.data().is_empty());
    }

    #[test]
    fn resize_sets_exact_dimensions() {
        let mut s = PixelSurface::new(Viewport::new(4, 4));
        s.resize(Viewport::new(7, 2));
        assert_eq!(s.size(), Viewport::new(7, 2));
        assert_eq!(s.data().len(), 14);
    }

    #[test]
    fn sample_gradient_interpolates_between_stops() {
        let stops = fade_stops();
        assert!((sample_gradient(&stops, 0.5).a - 0.4).abs() < 1e-12);
        assert_eq!(sample_gradient(&stops, -1.0).a, 0.8);
        assert_eq!(sample_gradient(&stops, 2.0).a, 0.0);
        assert_eq!(sample_gradient(&[], 0.5), Rgba::TRANSPARENT);
    }

    #[test]
    fn radial_fill_is_strongest_at_center_and_empty_outside() {
        let mut s = PixelSurface::new(Viewport::new(41, 41));
        s.fill_radial_ellipse(&disc(DVec2::new(20.5, 20.5), 15.0), &fade_stops());
        let center = s.pixel(20, 20).unwrap().a;
        let mid = s.pixel(28, 20).unwrap().a;
        let corner = s.pixel(0, 0).unwrap().a;
        assert!((center - 0.8).abs() < 1e-6, "center alpha, got: {center}");
        assert!(mid > 0.0 && mid < center);
        assert_eq!(corner, 0.0);
    }

    #[test]
    fn flatten_squashes_vertical_extent() {
        let mut s = PixelSurface::new(Viewport::new(41, 41));
        let ellipse = RadialEllipse {
            flatten: 0.5,
            ..disc(DVec2::new(20.5, 20.5), 16.0)
        };
        s.fill_radial_ellipse(&ellipse, &fade_stops());
        assert!(s.pixel(32, 20).unwrap().a > 0.0, "major axis painted");
        assert_eq!(s.pixel(20, 32).unwrap().a, 0.0, "minor axis clipped");
    }

    #[test]
    fn rotation_turns_major_axis() {
        let mut s = PixelSurface::new(Viewport::new(41, 41));
        let ellipse = RadialEllipse {
            flatten: 0.5,
            rotation: std::f64::consts::FRAC_PI_2,
            ..disc(DVec2::new(20.5, 20.5), 16.0)
        };
        s.fill_radial_ellipse(&ellipse, &fade_stops());
        assert!(s.pixel(20, 32).unwrap().a > 0.0);
        assert_eq!(s.pixel(32, 20).unwrap().a, 0.0);
    }

    #[test]
    fn overlapping_fills_accumulate_source_over() {
        let mut s = PixelSurface::new(Viewport::new(1, 1));
        s.blend_pixel(0, 0, white(0.5));
        s.blend_pixel(0, 0, white(0.5));
        let px = s.pixel(0, 0).unwrap();
        assert!((px.a - 0.75).abs() < 1e-6);
        assert!((px.r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn clear_resets_all_pixels() {
        let mut s = PixelSurface::new(Viewport::new(3, 3));
        s.set_pixel(1, 1, white(1.0));
        s.clear();
        assert_eq!(s.max_alpha(), 0.0);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut s = PixelSurface::new(Viewport::new(2, 2));
        s.set_pixel(5, 5, white(1.0));
        s.blend_pixel(2, 0, white(1.0));
        assert_eq!(s.max_alpha(), 0.0);
    }
}
