//! Mullvad Leta search engine implementation
//!
//! Leta proxies Brave and Google. Its SvelteKit data endpoint returns a flat
//! array where objects reference other entries by index.

use super::traits::*;
use crate::network::HttpClient;
use crate::results::{Category, SearchResult, TextResult};
use async_trait::async_trait;
use serde_json::Value;

const SEARCH_URL: &str = "https://leta.mullvad.net/search/__data.json";

/// Mullvad Leta front-end for one upstream engine
pub struct MullvadLeta {
    client: HttpClient,
    search_url: String,
    name: &'static str,
    upstream: &'static str,
}

impl MullvadLeta {
    /// Leta serving Brave results
    pub fn brave(client: HttpClient) -> Self {
        Self::with_upstream(client, "mullvad_brave", "brave")
    }

    /// Leta serving Google results
    pub fn google(client: HttpClient) -> Self {
        Self::with_upstream(client, "mullvad_google", "google")
    }

    fn with_upstream(client: HttpClient, name: &'static str, upstream: &'static str) -> Self {
        Self {
            client,
            search_url: SEARCH_URL.to_string(),
            name,
            upstream,
        }
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }
}

/// Follow an index reference into the data array
fn deref<'a>(data: &'a [Value], pointer: &Value) -> Option<&'a Value> {
    data.get(usize::try_from(pointer.as_u64()?).ok()?)
}

fn parse_items(payload: &Value) -> Option<Vec<(String, String, String)>> {
    let data = payload.pointer("/nodes/2/data")?.as_array()?;
    let items = deref(data, data.first()?.get("items")?)?.as_array()?;

    let text = |record: &Value, key: &str| -> String {
        record
            .get(key)
            .and_then(|p| deref(data, p))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Some(
        items
            .iter()
            .filter_map(|ptr| deref(data, ptr))
            .map(|record| (text(record, "title"), text(record, "link"), text(record, "snippet")))
            .collect(),
    )
}

#[async_trait]
impl WebEngine for MullvadLeta {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn request(&self, params: &RequestParams) -> Result<EngineRequest, EngineError> {
        let (country, lang) = params.country_lang();
        let lang = if lang == "zh" { "zh-hans".to_string() } else { lang };
        let mut request = EngineRequest::get(&self.search_url)
            .param("q", &params.query)
            .param("engine", self.upstream)
            .param("x-sveltekit-invalidated", "001")
            .param("country", country)
            .param("lang", lang);
        if let Some(time_range) = params.time_limit {
            request = request.param("lastUpdated", time_range.code());
        }
        if params.page > 1 {
            request = request.param("page", params.page.to_string());
        }
        Ok(request)
    }

    fn response(
        &self,
        response: EngineResponse,
        _params: &RequestParams,
    ) -> Result<Vec<SearchResult>, EngineError> {
        let payload: Value = response.json()?;
        let items = parse_items(&payload)
            .ok_or_else(|| EngineError::Parse("unexpected leta payload layout".to_string()))?;

        Ok(items
            .into_iter()
            .map(|(title, href, body)| {
                let mut result = TextResult::new();
                result.set_title(title).set_href(href).set_body(body);
                result.into()
            })
            .collect())
    }
}

#[async_trait]
impl Engine for MullvadLeta {
    fn name(&self) -> &str {
        self.name
    }

    fn category(&self) -> Category {
        Category::Text
    }

    fn provider(&self) -> &str {
        self.upstream
    }

    fn priority(&self) -> f64 {
        0.5
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
        self.fetch(params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::TimeRange;

    const FIXTURE: &str = r#"{"type":"data","nodes":[
        {"type":"skip"},
        {"type":"skip"},
        {"type":"data","data":[
            {"items":1,"query":4},
            [2,5],
            {"title":3,"link":6,"snippet":7},
            "Axum web framework",
            "axum",
            {"title":8,"link":9,"snippet":10},
            "https://github.com/tokio-rs/axum",
            "Ergonomic and modular web framework.",
            "axum - Rust",
            "https://docs.rs/axum",
            "API documentation"
        ]}
    ]}"#;

    fn client() -> HttpClient {
        HttpClient::new().unwrap()
    }

    #[test]
    fn test_engine_info() {
        let brave = MullvadLeta::brave(client());
        assert_eq!(brave.name(), "mullvad_brave");
        assert_eq!(brave.provider(), "brave");
        assert_eq!(brave.priority(), 0.5);

        let google = MullvadLeta::google(client());
        assert_eq!(google.name(), "mullvad_google");
        assert_eq!(google.provider(), "google");
    }

    #[test]
    fn test_request() {
        let mut params = RequestParams::new("axum");
        params.region = "cn-zh".to_string();
        params.time_limit = Some(TimeRange::Day);
        params.page = 2;
        let request = MullvadLeta::google(client()).request(&params).unwrap();

        assert_eq!(request.get_param("engine"), Some("google"));
        assert_eq!(request.get_param("country"), Some("cn"));
        assert_eq!(request.get_param("lang"), Some("zh-hans"));
        assert_eq!(request.get_param("lastUpdated"), Some("d"));
        assert_eq!(request.get_param("page"), Some("2"));
        assert_eq!(request.get_param("x-sveltekit-invalidated"), Some("001"));
    }

    #[test]
    fn test_parse_results() {
        let results = MullvadLeta::brave(client())
            .response(EngineResponse::with_text(FIXTURE), &RequestParams::new("axum"))
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title(), "Axum web framework");
        assert_eq!(results[0].link(), "https://github.com/tokio-rs/axum");
        assert_eq!(results[1].body(), "API documentation");
    }

    #[test]
    fn test_unexpected_layout() {
        let err = MullvadLeta::brave(client())
            .response(EngineResponse::with_text(r#"{"nodes":[]}"#), &RequestParams::new("x"))
            .unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }
}
