//! Result model, aggregation and ranking
//!
//! Typed records per search category with field-level normalization, the
//! cross-provider [`Aggregator`] and the tiered [`Ranker`].

mod aggregator;
mod normalize;
mod ranker;
mod types;

pub use aggregator::{Aggregator, DEFAULT_KEY_FIELDS};
pub use normalize::{normalize_date, normalize_field, normalize_text, normalize_url, FieldValue};
pub use ranker::{Ranker, Tier};
pub use types::*;
