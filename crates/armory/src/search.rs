//! Search entry point that hides the session wiring.

use std::sync::Arc;

use armory_config::SearchConfig;
use armory_core::{Catalog, Result};
use armory_search::{SearchManager, SearchReport, SearchRequest};
use tracing::debug;

/// Configuration file read by [`run_search`], relative to the working
/// directory.
pub const CONFIG_FILE: &str = "armory.toml";

/// Runs one search with the configuration from [`CONFIG_FILE`], or the
/// defaults when the file is missing or unreadable.
///
/// Blocks until the search ends; do not call from within an async runtime.
pub fn run_search(catalog: Arc<Catalog>, request: SearchRequest) -> Result<SearchReport> {
    let config = match SearchConfig::load(CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => {
            debug!(event = "config_defaulted", file = CONFIG_FILE, reason = %e);
            SearchConfig::default()
        }
    };
    run_search_with(catalog, request, config)
}

/// Runs one search with an explicit configuration.
///
/// The configured time limit applies. Blocks until the search ends.
pub fn run_search_with(
    catalog: Arc<Catalog>,
    request: SearchRequest,
    config: SearchConfig,
) -> Result<SearchReport> {
    #[cfg(feature = "console")]
    crate::console::init();

    let mut manager = SearchManager::new(catalog, config);
    manager.start(request, None)?.wait()
}
