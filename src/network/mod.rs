//! HTTP networking module
//!
//! Provides the HTTP transport engines use to reach their providers.

mod client;
mod user_agent;

pub use client::HttpClient;
pub use user_agent::{accept_html, accept_language, generate_user_agent};
