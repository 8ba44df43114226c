//! GLSL program compilation with readable diagnostics.
//!
//! Driver logs reference lines as `0:LINE:`; [`format_shader_error`] prints
//! the numbered source and flags those lines so a failing fog shader can be
//! read straight from the browser console.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    #[error("shader compile error ({stage}):\n{log}")]
    CompileError { stage: String, log: String },
    #[error("shader link error:\n{0}")]
    LinkError(String),
}

/// Shader pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        }
    }

    fn gl_enum(self) -> u32 {
        match self {
            Stage::Vertex => glow::VERTEX_SHADER,
            Stage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

/// Line numbers a driver log points at, e.g. `ERROR: 0:12: ...` gives 12.
pub fn error_lines(log: &str) -> Vec<usize> {
    let mut lines: Vec<usize> = log
        .lines()
        .filter_map(|l| {
            let rest = l.split_once("0:")?.1;
            let (num, _) = rest.split_once(':')?;
            num.trim().parse().ok()
        })
        .collect();
    lines.sort_unstable();
    lines.dedup();
    lines
}

/// Numbered `source` followed by the driver `log`.
///
/// Lines named by the log get a `>` marker. Either input may be empty.
pub fn format_shader_error(source: &str, log: &str) -> String {
    let flagged = error_lines(log);
    let lines: Vec<&str> = source.lines().collect();
    let width = lines.len().max(1).to_string().len();

    let numbered = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let marker = if flagged.contains(&(i + 1)) { '>' } else { ' ' };
            format!("{marker}{:>width$}: {line}", i + 1)
        })
        .collect::<Vec<_>>()
        .join("\n");

    match (numbered.is_empty(), log.is_empty()) {
        (true, true) => String::new(),
        (true, false) => log.to_string(),
        (false, true) => numbered,
        (false, false) => format!("{numbered}\n\n{log}"),
    }
}

/// Compiles one stage, deleting the shader object on failure.
#[allow(unsafe_code)]
pub fn compile_shader(
    gl: &glow::Context,
    stage: Stage,
    source: &str,
) -> Result<glow::Shader, ShaderError> {
    use glow::HasContext;

    let failure = |log: String| ShaderError::CompileError {
        stage: stage.name().to_string(),
        log,
    };

    // SAFETY: glow marks all GL entry points unsafe. The stage enum is a
    // valid shader type and the handle is deleted on every error path.
    unsafe {
        let shader = gl.create_shader(stage.gl_enum()).map_err(failure)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if gl.get_shader_compile_status(shader) {
            Ok(shader)
        } else {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            Err(failure(format_shader_error(source, &log)))
        }
    }
}

/// Compiles both stages and links them. Intermediate shader objects are
/// always released; only the program survives.
#[allow(unsafe_code)]
pub fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<glow::Program, ShaderError> {
    use glow::HasContext;

    let vertex = compile_shader(gl, Stage::Vertex, vertex_src)?;
    let fragment = match compile_shader(gl, Stage::Fragment, fragment_src) {
        Ok(f) => f,
        Err(e) => {
            // SAFETY: `vertex` came from a successful compile above.
            unsafe { gl.delete_shader(vertex) };
            return Err(e);
        }
    };

    // SAFETY: both handles are live shaders from this context. They are
    // detached and deleted whether or not linking succeeds.
    unsafe {
        let result = match gl.create_program() {
            Ok(program) => {
                gl.attach_shader(program, vertex);
                gl.attach_shader(program, fragment);
                gl.link_program(program);
                gl.detach_shader(program, vertex);
                gl.detach_shader(program, fragment);
                if gl.get_program_link_status(program) {
                    Ok(program)
                } else {
                    let log = gl.get_program_info_log(program);
                    gl.delete_program(program);
                    Err(ShaderError::LinkError(log))
                }
            }
            Err(e) => Err(ShaderError::LinkError(e)),
        };
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);
        result
    }
}
