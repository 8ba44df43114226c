//! PNG snapshots of a rendered frame.
//!
//! Feature-gated behind `png` (default on) so the wasm build does not pull in
//! the `image` crate.

use fog_core::color::Srgb;
use fog_core::error::EngineError;
use fog_core::surface::{PixelSurface, Surface};
use std::path::Path;

use crate::pixel::{surface_over_background, surface_to_rgba};

/// Writes `surface` as a PNG. With a `background` the image is opaque,
/// otherwise the fog's own alpha is kept.
///
/// Returns `EngineError::Io` for an empty surface or a failed write.
pub fn write_png(
    surface: &PixelSurface,
    background: Option<Srgb>,
    path: &Path,
) -> Result<(), EngineError> {
    let size = surface.size();
    if size.is_empty() {
        return Err(EngineError::Io(format!(
            "cannot write {}x{} snapshot",
            size.width, size.height
        )));
    }
    let rgba = match background {
        Some(bg) => surface_over_background(surface, bg),
        None => surface_to_rgba(surface),
    };
    let img = image::RgbaImage::from_raw(size.width, size.height, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    log::debug!("wrote {}x{} snapshot to {}", size.width, size.height, path.display());
    Ok(())
}
