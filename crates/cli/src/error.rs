//! CLI errors and their exit codes.
//!
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: engine error (invalid config, unknown backend, scheduler)
//! - 11: I/O error (snapshot write)
//! - 12: input error (bad --params JSON, bad color)
//! - 13: serialization error

use fog_core::EngineError;
use std::fmt;

/// Failures of a CLI command, each with its own exit code.
pub enum CliError {
    /// Engine rejected the request: invalid config, unknown backend or variant.
    Engine(EngineError),
    /// Writing the PNG snapshot failed.
    Io(String),
    /// Bad user input: malformed `--params` JSON or an unparseable color.
    Input(String),
    /// Could not serialize `--json` output.
    Serialization(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }

    /// Short machine-readable category for `--json` output.
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::Engine(_) => "engine",
            CliError::Io(_) => "io",
            CliError::Input(_) => "input",
            CliError::Serialization(_) => "serialization",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Io(msg),
            EngineError::InvalidColor(_) => CliError::Input(e.to_string()),
            other => CliError::Engine(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
