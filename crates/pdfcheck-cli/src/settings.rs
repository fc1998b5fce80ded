//! Loading the runtime configuration and building an orchestrator from it.

use std::path::Path;

use anyhow::Context;
use pdfcheck_runtime::{Orchestrator, ProviderRegistry, RuntimeConfig};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log filter from `RUST_LOG`, defaulting to `info`. `verbose` adds a
/// global debug directive on top.
pub fn log_filter(verbose: bool) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_for(rust_log.as_deref(), verbose)
}

fn filter_for(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    let filter = rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    if verbose {
        filter.add_directive(Level::DEBUG.into())
    } else {
        filter
    }
}

/// Load the YAML config at `path`, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RuntimeConfig> {
    let config = match path {
        Some(path) => RuntimeConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RuntimeConfig::default(),
    };

    config.validate()?;
    tracing::debug!(
        provider = %config.provider.kind,
        model = %config.completion.model,
        mode = ?config.execution.mode,
        "Configuration loaded"
    );
    Ok(config)
}

/// Create an orchestrator using the built-in provider registry.
pub fn orchestrator(config: &RuntimeConfig) -> anyhow::Result<Orchestrator> {
    let registry = ProviderRegistry::with_defaults();
    Orchestrator::from_config(config, &registry)
        .with_context(|| format!("failed to set up provider '{}'", config.provider.kind))
}
