//! WebGL2 fog rendering, available with the `render` feature.
//!
//! - [`program`]: shader compilation with line-numbered error reports.
//! - [`fog_pass`]: the fullscreen fog pass driven by [`crate::shader`].

pub mod fog_pass;
pub mod program;

pub use fog_pass::GlFogPass;
pub use program::{compile_program, compile_shader, format_shader_error, ShaderError, Stage};
