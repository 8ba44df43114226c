//! Parsing of the `params_json` string handed to `FogLayer`.

use fog_core::config::EngineConfig;
use fog_core::error::EngineError;
use serde_json::Value;

/// Reads an engine config from a JSON object string. Blank input gives the
/// defaults.
pub fn parse_params(json: &str) -> Result<EngineConfig, EngineError> {
    if json.trim().is_empty() {
        return Ok(EngineConfig::default());
    }
    let value: Value =
        serde_json::from_str(json).map_err(|e| EngineError::config("params", e.to_string()))?;
    if !value.is_object() {
        return Err(EngineError::config("params", "expected a JSON object"));
    }
    EngineConfig::from_json(&value)
}
