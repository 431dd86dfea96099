//! Configuration validation utilities

use super::error::ValidationError;
use super::schema::RelayConfig;
use regex::Regex;

/// Configuration validator with rules that go beyond field-level checks
pub struct ConfigValidator {
    /// Model ids end up inside the request path (`models/{id}:generateContent`)
    model_id_pattern: Regex,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            model_id_pattern: Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$")
                .expect("model id pattern is a valid regex"),
        }
    }

    /// Validate a configuration with extended rules
    pub fn validate(&self, config: &RelayConfig) -> Result<(), ValidationError> {
        config.validate()?;

        self.validate_model_id(config)?;
        self.validate_base_url_shape(config)?;

        Ok(())
    }

    fn validate_model_id(&self, config: &RelayConfig) -> Result<(), ValidationError> {
        if !self.model_id_pattern.is_match(&config.backend.model) {
            return Err(ValidationError::bad_format(
                "backend.model",
                format!(
                    "model id may only contain letters, digits, '.', '_' and '-', got: {}",
                    config.backend.model
                ),
            ));
        }
        Ok(())
    }

    fn validate_base_url_shape(&self, config: &RelayConfig) -> Result<(), ValidationError> {
        // Already parsed successfully by RelayConfig::validate
        if let Ok(url) = url::Url::parse(&config.backend.base_url) {
            if url.query().is_some() || url.fragment().is_some() {
                return Err(ValidationError::bad_format(
                    "backend.base_url",
                    "base URL must not carry a query string or fragment",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes() {
        let validator = ConfigValidator::new();
        assert!(validator.validate(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_model_with_path_characters() {
        let mut config = RelayConfig::default();
        config.backend.model = "models/gemini:pro".to_string();

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field, "backend.model");
    }

    #[test]
    fn test_rejects_base_url_with_query() {
        let mut config = RelayConfig::default();
        config.backend.base_url = "https://example.com/v1beta?key=abc".to_string();

        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert_eq!(err.field, "backend.base_url");
    }
}
