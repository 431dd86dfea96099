//! Configuration module for the relay
//!
//! Holds the named constants of the wire contract (`defaults`), the
//! file-backed configuration schema and its validation.

pub mod defaults;
mod env;
mod error;
mod schema;
mod secrets;
mod validator;

pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{BackendConfig, RelayConfig, RequestDefaults, ServerConfig};
pub use secrets::SecretString;
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<RelayConfig> {
    let path = path.as_ref();
    let content = read_config(path)?;

    let config: RelayConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Syntax {
            path: path.to_string_lossy().to_string(),
            format: "YAML",
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<RelayConfig> {
    let path = path.as_ref();
    let content = read_config(path)?;

    let config: RelayConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::Syntax {
            path: path.to_string_lossy().to_string(),
            format: "JSON",
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

/// Load a configuration, picking the format from the file extension.
///
/// `.json` is parsed as JSON; anything else as YAML.
pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<RelayConfig> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_from_json(path),
        _ => load_from_yaml(path),
    }
}

/// Read a config file and interpolate `${VAR}` references
fn read_config(path: &Path) -> ConfigResult<String> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    env::interpolate_env_vars(&content)
}
