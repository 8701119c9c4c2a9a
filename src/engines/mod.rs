//! Search engine module
//!
//! Defines the Engine trait, the registry that resolves engine selectors and
//! the built-in engine implementations.

mod loader;
mod registry;
mod scrape;
mod traits;

// Engine implementations
pub mod annasarchive;
pub mod bing;
pub mod brave;
pub mod duckduckgo;
pub mod google;
pub mod mojeek;
pub mod mullvad_leta;
pub mod wikipedia;
pub mod yahoo;
pub mod yahoo_news;
pub mod yandex;

pub use loader::EngineLoader;
pub use registry::{EngineFactory, EngineRegistry};
pub use traits::*;
