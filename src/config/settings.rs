//! Settings structures for metasearch-rs configuration

use crate::results::Category;
use crate::search::SafeSearch;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Shorthand proxy value for a local Tor Browser
pub const TOR_BROWSER_PROXY: &str = "socks5h://127.0.0.1:9150";

/// Main settings structure, as read from settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    /// Per-engine overrides
    pub engines: Vec<EngineConfig>,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (METASEARCH_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("METASEARCH_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if self.outgoing.proxy.is_none() {
            if let Some(val) = var("METASEARCH_PROXY") {
                self.outgoing.proxy = Some(val);
            }
        }
        if let Some(timeout) = var("METASEARCH_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.search.timeout = timeout;
        }
        if let Some(port) = var("METASEARCH_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("METASEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
    }

    /// Check values that cannot be expressed in the types
    pub fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("search.timeout", self.search.timeout),
            ("outgoing.request_timeout", self.outgoing.request_timeout),
        ] {
            match Duration::try_from_secs_f64(secs) {
                Ok(duration) if !duration.is_zero() => {}
                _ => bail!("{} must be a positive number of seconds, got {}", name, secs),
            }
        }
        Ok(())
    }
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
}

/// Default search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Region code, `country-lang`
    pub region: String,
    pub safesearch: SafeSearch,
    /// Engine selector: `auto`, `all` or comma-separated names
    pub backend: String,
    /// Result budget, 0 for unbounded
    pub max_results: usize,
    /// Per-wave wait in seconds
    pub timeout: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            region: "us-en".to_string(),
            safesearch: SafeSearch::Moderate,
            backend: "auto".to_string(),
            max_results: 10,
            timeout: 5.0,
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8888,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Per-request timeout in seconds
    pub request_timeout: f64,
    /// Proxy URL for all requests; `tb` means the Tor Browser socks proxy
    pub proxy: Option<String>,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Max idle connections per host
    pub pool_maxsize: usize,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 5.0,
            proxy: None,
            verify_ssl: true,
            pool_maxsize: 20,
            extra_headers: HashMap::new(),
        }
    }
}

impl OutgoingSettings {
    /// Proxy URL with the `tb` shorthand expanded
    pub fn proxy_url(&self) -> Option<&str> {
        match self.proxy.as_deref() {
            Some("tb") => Some(TOR_BROWSER_PROXY),
            Some("") | None => None,
            Some(url) => Some(url),
        }
    }
}

/// Per-engine override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub disabled: bool,
}
