//! Application state shared across handlers

use crate::config::Settings;
use crate::engines::EngineRegistry;
use crate::search::Search;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Engine registry
    pub registry: Arc<EngineRegistry>,
    /// Search executor
    pub search: Arc<Search>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings, registry: EngineRegistry) -> Self {
        let registry = Arc::new(registry);
        // `Settings::validate` rejects unusable timeouts before this point
        let timeout = Duration::try_from_secs_f64(settings.search.timeout)
            .unwrap_or(Duration::from_secs(crate::DEFAULT_TIMEOUT));
        let search = Search::new(registry.clone()).with_timeout(timeout);

        Self {
            settings: Arc::new(settings),
            registry,
            search: Arc::new(search),
        }
    }
}
