//! Runtime configuration.
//!
//! Every field has a default, so an empty YAML document is a valid config.
//!
//! ```yaml
//! provider:
//!   type: openai
//!   settings:
//!     base_url: https://api.openai.com/v1
//! completion:
//!   model: gpt-4o-mini
//!   max_tokens: 500
//!   temperature: 0.3
//! execution:
//!   mode: concurrent
//!   max_concurrency: 8
//!   timeout: 30s
//!   max_retries: 0
//!   retry_min_delay: 500ms
//! validation: permissive
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use pdfcheck_core::DecodeMode;

use crate::providers::CompletionConfig;

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML config: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// How rule evaluations are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// All evaluations launched together (bounded by `max_concurrency`)
    #[default]
    Concurrent,
    /// One rule fully evaluated before the next begins
    Sequential,
}

/// Which provider to build and its provider-specific settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Registry key, e.g. "openai"
    #[serde(rename = "type")]
    pub kind: String,

    /// Passed verbatim to the provider factory
    pub settings: JsonValue,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: "openai".to_string(),
            settings: JsonValue::Object(Default::default()),
        }
    }
}

/// Scheduling, timeout and retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionConfig {
    pub mode: ExecutionMode,

    /// Upper bound on in-flight model calls in concurrent mode
    pub max_concurrency: usize,

    /// Per-attempt bound on one model call
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,

    /// Extra attempts for transient failures; 0 disables retry
    pub max_retries: usize,

    /// First backoff delay; doubles per attempt
    #[serde(with = "humantime_duration")]
    pub retry_min_delay: Duration,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Concurrent,
            max_concurrency: 8,
            timeout: Duration::from_secs(30),
            max_retries: 0,
            retry_min_delay: Duration::from_millis(500),
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub provider: ProviderConfig,
    pub completion: CompletionConfig,
    pub execution: ExecutionConfig,
    pub validation: DecodeMode,
}

impl RuntimeConfig {
    /// Parse configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document for a struct; treat it as defaults
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check value ranges serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.max_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "execution.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.execution.timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "execution.timeout must be greater than zero".to_string(),
            ));
        }
        if self.completion.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "completion.max_tokens must be at least 1".to_string(),
            ));
        }
        if !self.provider.settings.is_object() {
            return Err(ConfigError::Invalid(
                "provider.settings must be a mapping".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serialize durations as humantime strings ("30s", "500ms").
mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
