//! HTTP request handlers

use super::state::AppState;
use crate::config::SearchSettings;
use crate::error::SearchError;
use crate::results::{Category, SearchResult};
use crate::search::{SafeSearch, SearchQuery, TimeRange};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// Query parameters for search.
///
/// Kept as strings so malformed values produce a JSON error body.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Search query
    pub q: Option<String>,
    /// Result category, `text` by default
    pub category: Option<String>,
    pub region: Option<String>,
    pub safesearch: Option<String>,
    /// `d`, `w`, `m` or `y`
    pub timelimit: Option<String>,
    /// Page number
    pub page: Option<String>,
    /// Engine selector
    pub backend: Option<String>,
    pub max_results: Option<String>,
    /// Everything else, e.g. `size` or `duration`, handed to the engines
    #[serde(flatten)]
    pub extra: HashMap<String, String>,
}

fn parse<T: FromStr>(name: &str, value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T::Err: std::fmt::Display,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| ApiError::bad_request(format!("invalid {}: {}", name, e))),
        None => Ok(None),
    }
}

impl SearchParams {
    /// Build the category and query, filling gaps from `defaults`
    pub fn into_query(self, defaults: &SearchSettings) -> Result<(Category, SearchQuery), ApiError> {
        let category = parse::<Category>("category", self.category.as_deref())?
            .unwrap_or(Category::Text);
        let safesearch = parse::<SafeSearch>("safesearch", self.safesearch.as_deref())?
            .unwrap_or(defaults.safesearch);
        let time_limit = parse::<TimeRange>("timelimit", self.timelimit.as_deref())?;
        let page = parse::<u32>("page", self.page.as_deref())?.unwrap_or(1);
        let max_results = parse::<usize>("max_results", self.max_results.as_deref())?
            .unwrap_or(defaults.max_results);

        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let mut query = SearchQuery::new(self.q.unwrap_or_default())
            .with_region(non_empty(self.region).unwrap_or_else(|| defaults.region.clone()))
            .with_safesearch(safesearch)
            .with_page(page)
            .with_backend(non_empty(self.backend).unwrap_or_else(|| defaults.backend.clone()))
            .with_max_results(max_results);
        if let Some(time_limit) = time_limit {
            query = query.with_time_limit(time_limit);
        }
        for (key, value) in self.extra {
            if !value.trim().is_empty() {
                query = query.with_extra(key, value);
            }
        }
        Ok((category, query))
    }
}

/// Error response: a status code and a `{"error": ...}` body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let status = match &err {
            SearchError::InvalidQuery => StatusCode::BAD_REQUEST,
            SearchError::NoResults { .. } => StatusCode::NOT_FOUND,
            SearchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            SearchError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Search failed: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Search handler
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    let (category, query) = params.into_query(&state.settings.search)?;
    let results = state.search.search(category, &query).await?;
    Ok(Json(results))
}

/// Enabled engines per category
pub async fn engines(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<Category, Vec<String>>>, ApiError> {
    let mut engines = BTreeMap::new();
    for category in state.registry.categories() {
        let names = state.registry.names(category)?;
        engines.insert(category, names.into_iter().map(str::to_string).collect());
    }
    Ok(Json(engines))
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::engines::{Engine, EngineError, EngineRegistry, RequestParams};
    use crate::results::TextResult;
    use crate::web::{create_router, AppState};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    struct FixedEngine {
        name: &'static str,
        outcome: Result<Vec<SearchResult>, EngineError>,
    }

    #[async_trait]
    impl Engine for FixedEngine {
        fn name(&self) -> &str {
            self.name
        }

        fn category(&self) -> Category {
            Category::Text
        }

        fn provider(&self) -> &str {
            self.name
        }

        async fn search(&self, _params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
            self.outcome.clone()
        }
    }

    /// Returns one result whose title is the `size` option it received
    struct EchoEngine;

    #[async_trait]
    impl Engine for EchoEngine {
        fn name(&self) -> &str {
            "echo"
        }

        fn category(&self) -> Category {
            Category::Text
        }

        fn provider(&self) -> &str {
            "echo"
        }

        async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
            let mut result = TextResult::new();
            result
                .set_title(params.extra("size").unwrap_or("none"))
                .set_href("https://echo.example/");
            Ok(vec![result.into()])
        }
    }

    fn state() -> AppState {
        let mut result = TextResult::new();
        result
            .set_title("Tokio")
            .set_href("https://tokio.rs")
            .set_body("An asynchronous runtime");

        let mut registry = EngineRegistry::new();
        registry.register_engine(std::sync::Arc::new(FixedEngine {
            name: "fixed",
            outcome: Ok(vec![result.into()]),
        }));
        registry.register_engine(std::sync::Arc::new(FixedEngine {
            name: "broken",
            outcome: Err(EngineError::Http(502)),
        }));
        registry.register_engine(std::sync::Arc::new(EchoEngine));
        AppState::new(Settings::default(), registry)
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        let response = create_router(state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_params_defaults() {
        let params = SearchParams {
            q: Some("rust".to_string()),
            ..Default::default()
        };
        let (category, query) = params.into_query(&SearchSettings::default()).unwrap();
        assert_eq!(category, Category::Text);
        assert_eq!(query.region, "us-en");
        assert_eq!(query.backend, "auto");
        assert_eq!(query.max_results, Some(10));
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_params_parsing() {
        let params = SearchParams {
            q: Some("rust".to_string()),
            category: Some("News".to_string()),
            safesearch: Some("off".to_string()),
            timelimit: Some("w".to_string()),
            page: Some("3".to_string()),
            max_results: Some("0".to_string()),
            ..Default::default()
        };
        let (category, query) = params.into_query(&SearchSettings::default()).unwrap();
        assert_eq!(category, Category::News);
        assert_eq!(query.safesearch, SafeSearch::Off);
        assert_eq!(query.time_limit, Some(TimeRange::Week));
        assert_eq!(query.page, 3);
        assert_eq!(query.max_results, None);
    }

    #[test]
    fn test_params_forward_extra_options() {
        let mut extra = HashMap::new();
        extra.insert("size".to_string(), "Large".to_string());
        extra.insert("color".to_string(), String::new());
        let params = SearchParams {
            q: Some("rust".to_string()),
            extra,
            ..Default::default()
        };
        let (_, query) = params.into_query(&SearchSettings::default()).unwrap();
        assert_eq!(query.extra.get("size").map(String::as_str), Some("Large"));
        assert!(!query.extra.contains_key("color"));
    }

    #[test]
    fn test_params_rejects_garbage() {
        let params = SearchParams {
            page: Some("two".to_string()),
            ..Default::default()
        };
        let err = params.into_query(&SearchSettings::default()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_status_mapping() {
        let status = |err: SearchError| ApiError::from(err).status;
        assert_eq!(status(SearchError::InvalidQuery), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(SearchError::NoResults { source: None }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(SearchError::Timeout(EngineError::Timeout)),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status(SearchError::Configuration("bad".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let (status, body) = get("/search?q=tokio&backend=fixed").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["href"], "https://tokio.rs");
        assert_eq!(body[0]["title"], "Tokio");
    }

    #[tokio::test]
    async fn test_search_forwards_engine_options() {
        let (status, body) = get("/search?q=cats&backend=echo&size=Large").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["title"], "Large");
    }

    #[tokio::test]
    async fn test_search_missing_query() {
        let (status, body) = get("/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "query is mandatory");
    }

    #[tokio::test]
    async fn test_search_bad_category() {
        let (status, body) = get("/search?q=x&category=maps").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("category"));
    }

    #[tokio::test]
    async fn test_search_no_results() {
        let (status, body) = get("/search?q=x&backend=broken").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().starts_with("no results found"));
    }

    #[tokio::test]
    async fn test_engines_endpoint() {
        let (status, body) = get("/engines").await;
        assert_eq!(status, StatusCode::OK);
        let names = body["text"].as_array().unwrap();
        assert_eq!(names.len(), 3);
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], crate::VERSION);
    }
}
