//! API key handling.
//!
//! A key is looked up in the provider settings first, then in an
//! environment variable, and is held as a [`SecretString`] from then on.
//! Only [`ApiCredential::expose`] hands out the raw value; `Debug` and
//! `Display` print `[REDACTED]`.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Where a provider expects its key.
#[derive(Debug, Clone, Copy)]
pub struct KeySpec {
    /// Key inside the provider settings object
    pub setting: &'static str,
    /// Environment variable consulted when the setting is absent
    pub env_var: &'static str,
    /// Human-readable name used in error messages
    pub label: &'static str,
}

impl KeySpec {
    fn in_settings(&self, settings: &JsonValue) -> Option<String> {
        non_blank(settings.get(self.setting)?.as_str()?)
    }

    fn in_env(&self) -> Option<String> {
        non_blank(&std::env::var(self.env_var).ok()?)
    }

    fn missing(&self) -> ProviderError {
        ProviderError::NotConfigured(format!(
            "{} required: set '{}' in provider settings or the {} environment variable",
            self.label, self.setting, self.env_var
        ))
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Where a credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Settings,
    Environment,
    /// Passed directly by the caller
    Explicit,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CredentialSource::Settings => "settings",
            CredentialSource::Environment => "environment",
            CredentialSource::Explicit => "explicit",
        })
    }
}

/// An API key that never shows up in logs.
pub struct ApiCredential {
    secret: SecretString,
    source: CredentialSource,
}

impl ApiCredential {
    /// Wrap a key supplied by the caller.
    pub fn explicit(key: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(key.into()),
            source: CredentialSource::Explicit,
        }
    }

    /// Settings value if present and non-blank, else the environment.
    pub fn resolve(settings: &JsonValue, spec: &KeySpec) -> Result<Self, ProviderError> {
        let (key, source) = spec
            .in_settings(settings)
            .map(|k| (k, CredentialSource::Settings))
            .or_else(|| spec.in_env().map(|k| (k, CredentialSource::Environment)))
            .ok_or_else(|| spec.missing())?;

        Ok(Self {
            secret: SecretString::from(key),
            source,
        })
    }

    /// The raw key. Use only where the key is sent.
    pub fn expose(&self) -> &str {
        self.secret.expose_secret()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiCredential([REDACTED], {})", self.source)
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED] ({})", self.source)
    }
}
