//! Configuration schema structures with serde support

use super::defaults;
use super::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure for the relay
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Schema version (required - no default)
    pub version: String,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Generative-language backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Values substituted when the caller leaves a field out
    #[serde(default)]
    pub defaults: RequestDefaults,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            version: defaults::CONFIG_VERSION.to_string(),
            server: ServerConfig::default(),
            backend: BackendConfig::default(),
            defaults: RequestDefaults::default(),
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the chat route
    #[serde(default = "default_route")]
    pub route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            route: default_route(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding a listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Backend connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the Generative Language API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier every request is sent to
    #[serde(default = "default_model")]
    pub model: String,

    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Deadline for a non-streaming call, and the longest idle gap tolerated mid-stream
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Per-request default values
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RequestDefaults {
    /// Persona used when the caller sends no system instruction
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,

    /// Temperature used when the caller sends none
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            system_instruction: default_system_instruction(),
            temperature: default_temperature(),
        }
    }
}

// Default value functions for serde
fn default_host() -> String { defaults::DEFAULT_HOST.to_string() }
fn default_port() -> u16 { defaults::DEFAULT_PORT }
fn default_route() -> String { defaults::DEFAULT_ROUTE.to_string() }
fn default_base_url() -> String { defaults::DEFAULT_BASE_URL.to_string() }
fn default_model() -> String { defaults::DEFAULT_MODEL.to_string() }
fn default_connect_timeout() -> u64 { defaults::DEFAULT_CONNECT_TIMEOUT_MS }
fn default_request_timeout() -> u64 { defaults::DEFAULT_REQUEST_TIMEOUT_MS }
fn default_system_instruction() -> String { defaults::DEFAULT_SYSTEM_INSTRUCTION.to_string() }
fn default_temperature() -> f64 { defaults::DEFAULT_TEMPERATURE }

impl RelayConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version.is_empty() {
            return Err(ValidationError::missing("version"));
        }

        if self.version != defaults::CONFIG_VERSION {
            return Err(ValidationError::unsupported_version(
                defaults::CONFIG_VERSION,
                self.version.as_str(),
            ));
        }

        self.server.validate("server")?;
        self.backend.validate("backend")?;
        self.defaults.validate("defaults")?;

        Ok(())
    }
}

impl ServerConfig {
    /// Validate listener settings
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.host.is_empty() {
            return Err(ValidationError::missing(format!("{}.host", path)));
        }

        if self.port == 0 {
            return Err(ValidationError::out_of_range(
                format!("{}.port", path),
                "must be greater than 0",
            ));
        }

        if !self.route.starts_with('/') {
            return Err(ValidationError::bad_format(
                format!("{}.route", path),
                format!("route must start with '/', got: {}", self.route),
            ));
        }

        Ok(())
    }
}

impl BackendConfig {
    /// Validate backend settings
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::missing(format!("{}.base_url", path)));
        }

        match url::Url::parse(&self.base_url) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(ValidationError::bad_url(
                        format!("{}.base_url", path),
                        format!("scheme must be http or https, got: {}", url.scheme()),
                    ));
                }
            }
            Err(e) => {
                return Err(ValidationError::bad_url(format!("{}.base_url", path), e.to_string()));
            }
        }

        if self.model.is_empty() {
            return Err(ValidationError::missing(format!("{}.model", path)));
        }

        if self.connect_timeout_ms == 0 {
            return Err(ValidationError::out_of_range(
                format!("{}.connect_timeout_ms", path),
                "must be greater than 0",
            ));
        }

        if self.request_timeout_ms < self.connect_timeout_ms {
            return Err(ValidationError::out_of_range(
                format!("{}.request_timeout_ms", path),
                "must be at least connect_timeout_ms",
            ));
        }

        Ok(())
    }
}

impl RequestDefaults {
    /// Validate per-request defaults
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.system_instruction.trim().is_empty() {
            return Err(ValidationError::missing(format!("{}.system_instruction", path))
                .with_hint("default persona must not be blank"));
        }

        if !(defaults::MIN_TEMPERATURE..=defaults::MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(ValidationError::out_of_range(
                format!("{}.temperature", path),
                "must be between 0.0 and 2.0",
            ));
        }

        Ok(())
    }
}
