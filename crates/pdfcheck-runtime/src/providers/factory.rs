//! Provider selection by name.
//!
//! `provider.type` in the runtime config names a [`ProviderFactory`]; the
//! factory turns `provider.settings` into a ready [`LlmProvider`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{LlmProvider, ProviderError};

/// Builds one kind of provider from its settings object.
pub trait ProviderFactory: Send + Sync {
    /// Registry key, e.g. "openai".
    fn provider_type(&self) -> &'static str;

    /// One-line summary shown by `pdfcheck providers`.
    fn description(&self) -> &'static str;

    /// Check settings without building anything.
    fn validate_config(&self, settings: &JsonValue) -> Result<(), ProviderError>;

    /// Build a provider.
    fn create(&self, settings: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError>;
}

/// Known provider factories, keyed and listed by type name.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<&'static str, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every provider compiled into this build.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "openai")]
        registry.register(Arc::new(super::OpenAiProviderFactory));
        registry
    }

    /// Add a factory. A later registration under the same name wins.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories.insert(factory.provider_type(), factory);
    }

    fn lookup(&self, provider_type: &str) -> Result<&Arc<dyn ProviderFactory>, ProviderError> {
        self.factories.get(provider_type).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "unknown provider type '{}' (known: {})",
                provider_type,
                self.available_types().join(", ")
            ))
        })
    }

    /// Validate settings for `provider_type`.
    pub fn validate(&self, provider_type: &str, settings: &JsonValue) -> Result<(), ProviderError> {
        self.lookup(provider_type)?.validate_config(settings)
    }

    /// Build a provider of `provider_type` from `settings`.
    pub fn create(
        &self,
        provider_type: &str,
        settings: &JsonValue,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        let provider = self.lookup(provider_type)?.create(settings)?;
        tracing::debug!(provider_type, name = provider.name(), "Provider created");
        Ok(provider)
    }

    pub fn available_types(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    pub fn has_provider(&self, provider_type: &str) -> bool {
        self.factories.contains_key(provider_type)
    }

    /// Factories in name order.
    pub fn factories(&self) -> impl Iterator<Item = &Arc<dyn ProviderFactory>> {
        self.factories.values()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}
