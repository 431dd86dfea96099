//! Environment variable interpolation for configuration files

use super::error::ConfigError;
use regex::{Captures, Regex};
use std::env;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
});

/// Replace every `${VAR}` reference in `content` with the variable's value.
///
/// Fails on the first variable that is not set, in document order.
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    interpolate_with(content, |name| env::var(name).ok())
}

/// Interpolation against an arbitrary lookup, used by tests to avoid
/// touching the process environment.
pub(crate) fn interpolate_with<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing: Option<String> = None;

    let result = ENV_VAR_PATTERN.replace_all(content, |cap: &Captures<'_>| {
        let var_name = &cap[1];
        match lookup(var_name) {
            Some(value) => value,
            None => {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var) => Err(ConfigError::MissingEnvVar { var }),
        None => Ok(result.into_owned()),
    }
}
