//! Wikipedia search engine implementation

use super::traits::*;
use crate::network::HttpClient;
use crate::results::{Category, SearchResult, TextResult};
use async_trait::async_trait;
use serde_json::Value;

const API_URL: &str = "https://{lang}.wikipedia.org/w/api.php";

/// Disambiguation pages carry no answer of their own
const DISAMBIGUATION_MARKER: &str = "may refer to:";

/// Wikipedia engine: best title match plus its introduction.
///
/// Returns at most one result and outranks every other text engine.
pub struct Wikipedia {
    client: HttpClient,
    api_url: String,
}

impl Wikipedia {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            api_url: API_URL.to_string(),
        }
    }

    /// Override the API endpoint; `{lang}` is replaced by the region language
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn get_api_url(&self, params: &RequestParams) -> String {
        let (_, lang) = params.country_lang();
        self.api_url.replace("{lang}", &lang)
    }

    /// Fuzzy title lookup, limited to the single best match
    fn opensearch_request(&self, params: &RequestParams) -> EngineRequest {
        EngineRequest::get(self.get_api_url(params))
            .param("action", "opensearch")
            .param("profile", "fuzzy")
            .param("limit", "1")
            .param("search", &params.query)
    }

    /// Intro extract of one article
    fn extract_request(&self, params: &RequestParams, title: &str) -> EngineRequest {
        EngineRequest::get(self.get_api_url(params))
            .param("action", "query")
            .param("format", "json")
            .param("prop", "extracts")
            .param("titles", title)
            .param("explaintext", "0")
            .param("exintro", "0")
            .param("redirects", "1")
    }
}

/// `(title, href)` of the best opensearch match
fn parse_opensearch(response: &EngineResponse) -> Result<Option<(String, String)>, EngineError> {
    let data: Value = response.json()?;
    let title = data.get(1).and_then(|v| v.get(0)).and_then(Value::as_str);
    let href = data.get(3).and_then(|v| v.get(0)).and_then(Value::as_str);
    Ok(match (title, href) {
        (Some(title), Some(href)) => Some((title.to_string(), href.to_string())),
        _ => None,
    })
}

/// Extract text of the first returned page
fn parse_extract(response: &EngineResponse) -> Result<String, EngineError> {
    let data: Value = response.json()?;
    let extract = data
        .pointer("/query/pages")
        .and_then(Value::as_object)
        .and_then(|pages| pages.values().next())
        .and_then(|page| page.get("extract"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    Ok(extract.to_string())
}

#[async_trait]
impl Engine for Wikipedia {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn category(&self) -> Category {
        Category::Text
    }

    fn provider(&self) -> &str {
        "wikipedia"
    }

    fn priority(&self) -> f64 {
        2.0
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
        let request = self.opensearch_request(params).region(params.region.clone());
        let response = self.client.execute(request).await?;
        let Some((title, href)) = parse_opensearch(&response)? else {
            return Ok(Vec::new());
        };

        let request = self
            .extract_request(params, &title)
            .region(params.region.clone());
        let body = parse_extract(&self.client.execute(request).await?)?;
        if body.contains(DISAMBIGUATION_MARKER) {
            return Ok(Vec::new());
        }

        let mut result = TextResult::new();
        result.set_title(title).set_href(href).set_body(body);
        Ok(vec![result.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine() -> Wikipedia {
        Wikipedia::new(HttpClient::new().unwrap())
    }

    #[test]
    fn test_engine_info() {
        let wiki = engine();
        assert_eq!(wiki.name(), "wikipedia");
        assert_eq!(wiki.provider(), "wikipedia");
        assert_eq!(wiki.priority(), 2.0);
    }

    #[test]
    fn test_api_url_uses_region_language() {
        let mut params = RequestParams::new("Berlin");
        params.region = "de-de".to_string();
        let request = engine().opensearch_request(&params);
        assert_eq!(request.url, "https://de.wikipedia.org/w/api.php");
        assert_eq!(request.get_param("limit"), Some("1"));
        assert_eq!(request.get_param("search"), Some("Berlin"));
    }

    #[test]
    fn test_parse_opensearch() {
        let hit = EngineResponse::with_text(
            r#"["pyth",["Python (programming language)"],[""],["https://en.wikipedia.org/wiki/Python_(programming_language)"]]"#,
        );
        assert_eq!(
            parse_opensearch(&hit).unwrap(),
            Some((
                "Python (programming language)".to_string(),
                "https://en.wikipedia.org/wiki/Python_(programming_language)".to_string()
            ))
        );

        let miss = EngineResponse::with_text(r#"["zzzz",[],[],[]]"#);
        assert_eq!(parse_opensearch(&miss).unwrap(), None);
    }

    async fn mock_wiki(extract: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("action", "opensearch"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"["rust",["Rust"],[""],["https://en.wikipedia.org/wiki/Rust"]]"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("action", "query"))
            .and(query_param("titles", "Rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {"pages": {"26477": {"pageid": 26477, "title": "Rust", "extract": extract}}}
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_search() {
        let server = mock_wiki("Rust is an iron oxide.").await;
        let wiki = engine().with_api_url(format!("{}/w/api.php", server.uri()));
        let results = wiki.search(&RequestParams::new("rust")).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "Rust");
        assert_eq!(results[0].link(), "https://en.wikipedia.org/wiki/Rust");
        assert_eq!(results[0].body(), "Rust is an iron oxide.");
    }

    #[tokio::test]
    async fn test_disambiguation_page_dropped() {
        let server = mock_wiki("Rust may refer to:").await;
        let wiki = engine().with_api_url(format!("{}/w/api.php", server.uri()));
        let results = wiki.search(&RequestParams::new("rust")).await.unwrap();
        assert!(results.is_empty());
    }
}
