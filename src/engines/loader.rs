//! Engine loader: the table of built-in engines

use super::registry::EngineRegistry;
use super::traits::Engine;
use super::{
    annasarchive, bing, brave, duckduckgo, google, mojeek, mullvad_leta, wikipedia, yahoo,
    yahoo_news, yandex,
};
use crate::config::Settings;
use crate::error::SearchError;
use crate::network::HttpClient;
use crate::results::Category;
use std::sync::Arc;
use tracing::{info, warn};

/// Every built-in engine, by category and name
const BUILTIN: &[(Category, &str)] = &[
    (Category::Text, "wikipedia"),
    (Category::Text, "bing"),
    (Category::Text, "yahoo"),
    (Category::Text, "duckduckgo"),
    (Category::Text, "brave"),
    (Category::Text, "google"),
    (Category::Text, "mojeek"),
    (Category::Text, "yandex"),
    (Category::Text, "mullvad_brave"),
    (Category::Text, "mullvad_google"),
    (Category::Images, "duckduckgo"),
    (Category::News, "duckduckgo"),
    (Category::News, "yahoo"),
    (Category::Videos, "duckduckgo"),
    (Category::Books, "annasarchive"),
];

/// Loader for initializing engines from configuration
pub struct EngineLoader;

impl EngineLoader {
    /// Register every built-in engine, then apply per-engine settings
    pub fn load(settings: &Settings, client: HttpClient) -> EngineRegistry {
        let mut registry = Self::builtin(client);

        for config in &settings.engines {
            if registry.set_disabled(&config.name, config.category, config.disabled) {
                info!(
                    "Engine {} ({}) {}",
                    config.name,
                    config.category,
                    if config.disabled { "disabled" } else { "enabled" }
                );
            } else {
                warn!(
                    "Ignoring settings for unknown engine: {} ({})",
                    config.name, config.category
                );
            }
        }

        info!("Registered {} engines", registry.len());
        registry
    }

    /// Registry holding every built-in engine with its default flags.
    /// Instances are built on first use.
    pub fn builtin(client: HttpClient) -> EngineRegistry {
        let mut registry = EngineRegistry::new();
        for &(category, name) in BUILTIN {
            let client = client.clone();
            registry.register(name, category, move || {
                Self::create_engine(category, name, client.clone()).ok_or_else(|| {
                    SearchError::Configuration(format!("unknown {} engine: {}", category, name))
                })
            });
        }
        registry
    }

    /// Create an engine instance by category and name
    fn create_engine(category: Category, name: &str, client: HttpClient) -> Option<Arc<dyn Engine>> {
        let engine: Arc<dyn Engine> = match (category, name) {
            (Category::Text, "wikipedia") => Arc::new(wikipedia::Wikipedia::new(client)),
            (Category::Text, "bing") => Arc::new(bing::Bing::new(client)),
            (Category::Text, "yahoo") => Arc::new(yahoo::Yahoo::new(client)),
            (Category::Text, "duckduckgo") => Arc::new(duckduckgo::DuckDuckGo::new(client)),
            (Category::Text, "brave") => Arc::new(brave::Brave::new(client)),
            (Category::Text, "google") => Arc::new(google::Google::new(client)),
            (Category::Text, "mojeek") => Arc::new(mojeek::Mojeek::new(client)),
            (Category::Text, "yandex") => Arc::new(yandex::Yandex::new(client)),
            (Category::Text, "mullvad_brave") => Arc::new(mullvad_leta::MullvadLeta::brave(client)),
            (Category::Text, "mullvad_google") => {
                Arc::new(mullvad_leta::MullvadLeta::google(client))
            }
            (Category::Images, "duckduckgo") => {
                Arc::new(duckduckgo::DuckDuckGoVertical::images(client))
            }
            (Category::News, "duckduckgo") => Arc::new(duckduckgo::DuckDuckGoVertical::news(client)),
            (Category::News, "yahoo") => Arc::new(yahoo_news::YahooNews::new(client)),
            (Category::Videos, "duckduckgo") => {
                Arc::new(duckduckgo::DuckDuckGoVertical::videos(client))
            }
            (Category::Books, "annasarchive") => Arc::new(annasarchive::AnnasArchive::new(client)),
            _ => return None,
        };
        Some(engine)
    }

    /// Get list of built-in engines
    pub fn available_engines() -> &'static [(Category, &'static str)] {
        BUILTIN
    }
}
