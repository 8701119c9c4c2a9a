//! Search orchestration module
//!
//! Fans a query out to the resolved engines in bounded waves, then
//! deduplicates and ranks what came back.

mod executor;
mod models;

pub use executor::{max_workers, Search};
pub use models::*;
