//! Metasearch-RS: a concurrent metasearch aggregator
//!
//! Sends one query to several search providers at once, merges the answers,
//! removes duplicates and ranks the rest.

pub mod config;
pub mod engines;
pub mod error;
pub mod network;
pub mod results;
pub mod search;
pub mod web;

pub use config::Settings;
pub use engines::{Engine, EngineRegistry};
pub use error::{EngineError, SearchError};
pub use results::{Category, SearchResult};
pub use search::{Search, SearchQuery};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default wave timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 5;
