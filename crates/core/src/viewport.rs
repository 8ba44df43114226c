//! Render-target dimensions.

use glam::DVec2;

/// Pixel size of the draw target. Zero-area viewports are legal and simply
/// render nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(f64::from(self.width), f64::from(self.height))
    }

    /// Number of pixels, `width * height`.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Shorter side, used to keep shader uv aspect-correct.
    pub fn min_side(&self) -> f64 {
        f64::from(self.width.min(self.height))
    }
}
