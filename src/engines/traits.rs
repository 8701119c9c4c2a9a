//! Engine traits and types

use crate::network::HttpClient;
use crate::results::{Category, SearchResult};
use crate::search::{SafeSearch, SearchQuery, TimeRange};
use async_trait::async_trait;
use std::collections::HashMap;

pub use crate::error::EngineError;

/// Per-call search parameters handed to an engine
#[derive(Debug, Clone)]
pub struct RequestParams {
    /// Search query string
    pub query: String,
    /// Region code, `country-lang`
    pub region: String,
    pub safesearch: SafeSearch,
    pub time_limit: Option<TimeRange>,
    /// Page number (1-indexed)
    pub page: u32,
    /// Category-specific options
    pub extra: HashMap<String, String>,
}

impl RequestParams {
    /// Create new request parameters
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            region: "us-en".to_string(),
            safesearch: SafeSearch::Moderate,
            time_limit: None,
            page: 1,
            extra: HashMap::new(),
        }
    }

    /// Split the region into `(country, lang)`, lowercased.
    /// Missing parts fall back to `us` and `en`.
    pub fn country_lang(&self) -> (String, String) {
        let region = self.region.to_ascii_lowercase();
        let (country, lang) = region.split_once('-').unwrap_or((region.as_str(), ""));
        let country = if country.is_empty() { "us" } else { country };
        let lang = if lang.is_empty() { "en" } else { lang };
        (country.to_string(), lang.to_string())
    }

    /// Non-empty extra option
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl From<&SearchQuery> for RequestParams {
    fn from(query: &SearchQuery) -> Self {
        Self {
            query: query.query.clone(),
            region: query.region.clone(),
            safesearch: query.safesearch,
            time_limit: query.time_limit,
            page: query.page.max(1),
            extra: query.extra.clone(),
        }
    }
}

/// HTTP request to be made by the engine
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Region code, drives Accept-Language
    pub region: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: Vec<(String, String)>,
    /// POST body data
    pub data: Option<RequestBody>,
    /// Cookies to send
    pub cookies: HashMap<String, String>,
}

impl EngineRequest {
    fn with_method(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            region: "us-en".to_string(),
            headers: HashMap::new(),
            params: Vec::new(),
            data: None,
            cookies: HashMap::new(),
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Get)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Post)
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter; order is kept
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Value of a query parameter, if set
    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Add form data (sets content-type to form-urlencoded)
    pub fn form(mut self, data: Vec<(String, String)>) -> Self {
        self.data = Some(RequestBody::Form(data));
        self
    }

    /// Add JSON body
    pub fn json(mut self, data: serde_json::Value) -> Self {
        self.data = Some(RequestBody::Json(data));
        self
    }

    /// Add a cookie
    pub fn cookie(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(key.into(), value.into());
        self
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Request body types
#[derive(Debug, Clone)]
pub enum RequestBody {
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

/// HTTP response from engine request
#[derive(Debug, Clone, Default)]
pub struct EngineResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl EngineResponse {
    /// Build a 200 response around a body, mostly for parser tests
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            status: 200,
            text: text.into(),
            ..Default::default()
        }
    }

    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, EngineError> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response indicates CAPTCHA
    pub fn is_captcha(&self) -> bool {
        self.text.contains("captcha")
            || self.text.contains("CAPTCHA")
            || self.text.contains("unusual traffic")
            || self.text.contains("automated requests")
    }
}

/// Capability contract every search backend implements.
///
/// Instances are shared between concurrent searches for the life of the
/// process, so `search` must not mutate instance state.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Engine name, unique within its category
    fn name(&self) -> &str;

    fn category(&self) -> Category;

    /// Upstream service this engine draws from. Engines sharing a provider
    /// are consulted at most once per search.
    fn provider(&self) -> &str;

    /// Ordering weight, higher runs first
    fn priority(&self) -> f64 {
        1.0
    }

    fn disabled(&self) -> bool {
        false
    }

    /// Run one search
    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError>;
}

/// Engines that issue a single HTTP request and parse its response.
///
/// Implementors get [`WebEngine::fetch`], which a plain `Engine::search`
/// can delegate to.
#[async_trait]
pub trait WebEngine: Send + Sync {
    fn client(&self) -> &HttpClient;

    /// Build the HTTP request for a search
    fn request(&self, params: &RequestParams) -> Result<EngineRequest, EngineError>;

    /// Parse the HTTP response into results
    fn response(
        &self,
        response: EngineResponse,
        params: &RequestParams,
    ) -> Result<Vec<SearchResult>, EngineError>;

    async fn fetch(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
        let request = self.request(params)?.region(params.region.clone());
        let response = self.client().execute(request).await?;
        self.response(response, params)
    }
}
