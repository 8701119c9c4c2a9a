//! Web server module
//!
//! Provides the JSON API over the search executor.

mod handlers;
mod routes;
mod state;

pub use handlers::{ApiError, SearchParams};
pub use routes::create_router;
pub use state::AppState;
