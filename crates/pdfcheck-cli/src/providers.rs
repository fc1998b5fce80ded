//! # Providers Subcommand
//!
//! List the provider types the registry knows about.

use pdfcheck_runtime::ProviderRegistry;

/// Render one line per registered provider, sorted by type name.
pub fn listing(registry: &ProviderRegistry) -> String {
    let mut rows: Vec<(&str, &str)> = registry
        .factories()
        .map(|f| (f.provider_type(), f.description()))
        .collect();
    rows.sort_by_key(|(kind, _)| *kind);

    let width = rows.iter().map(|(kind, _)| kind.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(kind, description)| format!("{kind:<width$}  {description}\n"))
        .collect()
}

pub fn run() {
    print!("{}", listing(&ProviderRegistry::with_defaults()));
}
