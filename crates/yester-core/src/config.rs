//! Content pipeline configuration.
//!
//! Defaults mirror the values observed in production builds of the app.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest result set the prompt template and fallback synthesis support
pub const MAX_SUPPORTED_EVENTS: usize = 5;

/// Top-level configuration for the content pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Content generator settings
    pub generator: GeneratorConfig,

    /// Resolution orchestrator settings
    pub resolution: ResolutionConfig,
}

/// Content generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Events per result set (default: 3)
    pub max_events: usize,

    /// Model used for narrative text
    pub text_model: String,

    /// Model used for imagery
    pub image_model: String,

    /// Sampling temperature for image requests (default: 0.7)
    pub image_temperature: f32,

    /// Image budget for the primary event in ms (default: 15000)
    pub primary_image_timeout_ms: u64,

    /// Image budget for every other event in ms (default: 10000)
    pub secondary_image_timeout_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_events: 3,
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.0-flash-preview-image-generation".to_string(),
            image_temperature: 0.7,
            primary_image_timeout_ms: 15_000,
            secondary_image_timeout_ms: 10_000,
        }
    }
}

impl GeneratorConfig {
    /// Image timeout for the event at `index`; the primary card gets the longer budget.
    pub fn image_timeout(&self, index: usize) -> Duration {
        if index == 0 {
            Duration::from_millis(self.primary_image_timeout_ms)
        } else {
            Duration::from_millis(self.secondary_image_timeout_ms)
        }
    }
}

/// Resolution orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Quiet period before a request is resolved, in ms (default: 300)
    pub debounce_ms: u64,

    /// Minimum skeleton dwell on cache hits, in ms (default: 400)
    pub min_skeleton_ms: u64,

    /// Key under which the whole local cache is persisted
    pub cache_storage_key: String,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_skeleton_ms: 400,
            cache_storage_key: "yester-ai-content-cache".to_string(),
        }
    }
}

impl ResolutionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn min_skeleton(&self) -> Duration {
        Duration::from_millis(self.min_skeleton_ms)
    }
}

impl ContentConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let max = self.generator.max_events;
        if max == 0 || max > MAX_SUPPORTED_EVENTS {
            return Err(ConfigValidationError::InvalidValue {
                field: "generator.max_events".into(),
                message: format!("must be between 1 and {}", MAX_SUPPORTED_EVENTS),
            });
        }

        if self.generator.text_model.trim().is_empty() {
            return Err(ConfigValidationError::MissingModel("generator.text_model"));
        }

        if self.generator.image_model.trim().is_empty() {
            return Err(ConfigValidationError::MissingModel("generator.image_model"));
        }

        if self.generator.primary_image_timeout_ms == 0
            || self.generator.secondary_image_timeout_ms == 0
        {
            return Err(ConfigValidationError::InvalidValue {
                field: "generator.*_image_timeout_ms".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.resolution.cache_storage_key.trim().is_empty() {
            return Err(ConfigValidationError::InvalidValue {
                field: "resolution.cache_storage_key".into(),
                message: "must not be empty".into(),
            });
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("{0} is required")]
    MissingModel(&'static str),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ContentConfig::default();
        assert_eq!(config.generator.max_events, 3);
        assert_eq!(config.resolution.debounce_ms, 300);
        assert_eq!(config.resolution.min_skeleton_ms, 400);
        assert_eq!(config.generator.image_timeout(0), Duration::from_secs(15));
        assert_eq!(config.generator.image_timeout(2), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ContentConfig::default();
        for (max_events, valid) in [(0, false), (5, true), (6, false)] {
            config.generator.max_events = max_events;
            assert_eq!(config.validate().is_ok(), valid, "max_events = {}", max_events);
        }

        let mut config = ContentConfig::default();
        config.generator.text_model = " ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::MissingModel("generator.text_model"))
        ));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{ "resolution": { "debounce_ms": 150 } }"#;
        let config: ContentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.resolution.debounce_ms, 150);
        assert_eq!(config.resolution.min_skeleton_ms, 400);
        assert_eq!(config.generator.max_events, 3);
    }
}
