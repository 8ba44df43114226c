#![deny(unsafe_code)]
//! Browser bindings for the fog spotlight engine.
//!
//! Exposes [`FogLayer`], which owns one canvas, one renderer and a
//! `requestAnimationFrame` loop. Only the params parser builds natively.

pub mod params;

#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod layer;
#[cfg(target_arch = "wasm32")]
mod raf;

#[cfg(target_arch = "wasm32")]
pub use layer::FogLayer;

/// Installs the panic hook and console logger once per page.
#[cfg(target_arch = "wasm32")]
fn init_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::debug!("logger already installed");
        }
    });
}
