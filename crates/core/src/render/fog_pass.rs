//! GPU fog pass: one fullscreen triangle running the fog fragment shader.

use std::collections::HashMap;

use glow::HasContext;

use super::program::{compile_program, ShaderError};
use crate::config::EngineConfig;
use crate::shader::{FogShader, FogUniforms, FOG_FRAGMENT_SHADER, FULLSCREEN_VERTEX_SHADER};
use crate::spotlight::SpotlightState;
use crate::viewport::Viewport;

const UNIFORM_NAMES: [&str; 13] = [
    "u_resolution",
    "u_time",
    "u_spot_center",
    "u_spot_radius",
    "u_spot_active",
    "u_repel_multiplier",
    "u_mask_exponent",
    "u_scale",
    "u_warp",
    "u_base_alpha",
    "u_octaves",
    "u_tone_low",
    "u_tone_high",
];

/// Owns the GL context, the linked fog program and an empty VAO.
pub struct GlFogPass {
    gl: glow::Context,
    program: glow::Program,
    vao: glow::VertexArray,
    uniforms: HashMap<&'static str, glow::UniformLocation>,
    shader: FogShader,
    viewport: Viewport,
}

impl GlFogPass {
    /// Compiles the fog program on `gl`.
    ///
    /// Fails with the driver log when the program does not build; callers
    /// fall back to a no-op renderer.
    #[allow(unsafe_code)]
    pub fn new(gl: glow::Context, config: &EngineConfig) -> Result<Self, ShaderError> {
        let program = compile_program(&gl, FULLSCREEN_VERTEX_SHADER, FOG_FRAGMENT_SHADER)?;

        // SAFETY: `program` was just linked on this context.
        let vao = match unsafe { gl.create_vertex_array() } {
            Ok(vao) => vao,
            Err(e) => {
                unsafe { gl.delete_program(program) };
                return Err(ShaderError::LinkError(format!("vertex array: {e}")));
            }
        };

        let uniforms = UNIFORM_NAMES
            .iter()
            .filter_map(|&name| {
                // SAFETY: querying a linked program; unused uniforms yield None.
                unsafe { gl.get_uniform_location(program, name) }.map(|loc| (name, loc))
            })
            .collect::<HashMap<_, _>>();
        log::debug!("fog program linked with {} active uniforms", uniforms.len());

        Ok(Self {
            gl,
            program,
            vao,
            uniforms,
            shader: FogShader::from_config(config),
            viewport: Viewport::default(),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Records the drawable size. The canvas itself is resized by the host.
    #[allow(unsafe_code)]
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        // SAFETY: plain state call with non-negative dimensions.
        unsafe {
            self.gl
                .viewport(0, 0, viewport.width as i32, viewport.height as i32);
        }
    }

    /// Clears the drawing buffer to transparent.
    #[allow(unsafe_code)]
    pub fn clear(&mut self) {
        // SAFETY: plain state calls on the owned context.
        unsafe {
            self.gl.clear_color(0.0, 0.0, 0.0, 0.0);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    /// Clears and redraws the whole target for `time` and `spot`.
    #[allow(unsafe_code)]
    pub fn draw(&mut self, time: f64, spot: &SpotlightState) {
        if self.viewport.is_empty() {
            return;
        }
        self.clear();
        let u = self.shader.uniforms(self.viewport, time, spot);
        // SAFETY: program and VAO are owned by this pass and outlive the
        // call; uniform locations come from the same program.
        unsafe {
            self.gl.use_program(Some(self.program));
            self.upload(&u);
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_arrays(glow::TRIANGLES, 0, 3);
            self.gl.bind_vertex_array(None);
        }
    }

    #[allow(unsafe_code)]
    unsafe fn upload(&self, u: &FogUniforms) {
        let gl = &self.gl;
        let loc = |name: &str| self.uniforms.get(name);
        gl.uniform_2_f32(loc("u_resolution"), u.resolution[0], u.resolution[1]);
        gl.uniform_1_f32(loc("u_time"), u.time);
        gl.uniform_2_f32(loc("u_spot_center"), u.spot_center[0], u.spot_center[1]);
        gl.uniform_1_f32(loc("u_spot_radius"), u.spot_radius);
        gl.uniform_1_f32(loc("u_spot_active"), u.spot_active);
        gl.uniform_1_f32(loc("u_repel_multiplier"), u.repel_multiplier);
        gl.uniform_1_f32(loc("u_mask_exponent"), u.mask_exponent);
        gl.uniform_1_f32(loc("u_scale"), u.scale);
        gl.uniform_1_f32(loc("u_warp"), u.warp);
        gl.uniform_1_f32(loc("u_base_alpha"), u.base_alpha);
        gl.uniform_1_i32(loc("u_octaves"), u.octaves);
        let [r, g, b] = u.tone_low;
        gl.uniform_3_f32(loc("u_tone_low"), r, g, b);
        let [r, g, b] = u.tone_high;
        gl.uniform_3_f32(loc("u_tone_high"), r, g, b);
    }
}

impl Drop for GlFogPass {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        // SAFETY: both handles were created on `self.gl` and are dropped once.
        unsafe {
            self.gl.delete_vertex_array(self.vao);
            self.gl.delete_program(self.program);
        }
    }
}
