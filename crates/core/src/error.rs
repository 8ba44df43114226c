//! Error types for the fog engine core.

use thiserror::Error;

/// Errors produced while building or driving a fog engine.
///
/// Only construction-time problems surface here. Transient conditions such as
/// a zero-area viewport or an off-screen spotlight are not errors and never
/// produce one of these.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A configuration value was outside its accepted range.
    #[error("invalid config '{name}': {reason}")]
    InvalidConfig { name: String, reason: String },

    /// A renderer backend name was not recognized.
    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    /// A string-valued option did not name one of its variants.
    #[error("unknown value '{value}' for '{name}'")]
    UnknownVariant { name: String, value: String },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// The host frame scheduler refused a request.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// Writing a snapshot or other output failed.
    #[error("io error: {0}")]
    Io(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidConfig`].
    pub fn config(name: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_names_the_parameter() {
        let err = EngineError::config("spotlight_radius", "must be > 0, got -1");
        let msg = format!("{err}");
        assert!(msg.contains("spotlight_radius"), "missing name in: {msg}");
        assert!(msg.contains("must be > 0"), "missing reason in: {msg}");
    }

    #[test]
    fn unknown_backend_includes_name() {
        let err = EngineError::UnknownBackend("raytrace".into());
        assert!(err.to_string().contains("raytrace"));
    }

    #[test]
    fn unknown_variant_includes_name_and_value() {
        let err = EngineError::UnknownVariant {
            name: "edge".into(),
            value: "bounce".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("edge"), "missing name in: {msg}");
        assert!(msg.contains("bounce"), "missing value in: {msg}");
    }

    #[test]
    fn scheduler_and_io_carry_message() {
        assert!(EngineError::Scheduler("no window".into())
            .to_string()
            .contains("no window"));
        assert!(EngineError::Io("disk full".into())
            .to_string()
            .contains("disk full"));
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
