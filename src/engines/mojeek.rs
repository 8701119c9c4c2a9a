//! Mojeek search engine implementation

use super::scrape::{self, css};
use super::traits::*;
use crate::network::HttpClient;
use crate::results::{Category, SearchResult, TextResult};
use crate::search::SafeSearch;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static RESULT: Lazy<Selector> = Lazy::new(|| css(r#"ul[class*="results"] > li"#));
static TITLE: Lazy<Selector> = Lazy::new(|| css("h2"));
static LINK: Lazy<Selector> = Lazy::new(|| css("h2 a"));
static SNIPPET: Lazy<Selector> = Lazy::new(|| css("p.s"));

const SEARCH_URL: &str = "https://www.mojeek.com/search";

/// Mojeek independent web search engine
pub struct Mojeek {
    client: HttpClient,
    search_url: String,
}

impl Mojeek {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            search_url: SEARCH_URL.to_string(),
        }
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }
}

#[async_trait]
impl WebEngine for Mojeek {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn request(&self, params: &RequestParams) -> Result<EngineRequest, EngineError> {
        let (country, lang) = params.country_lang();
        let mut request = EngineRequest::get(&self.search_url)
            .param("q", &params.query)
            .cookie("arc", country)
            .cookie("lb", lang);
        if params.safesearch == SafeSearch::On {
            request = request.param("safe", "1");
        }
        if params.page > 1 {
            request = request.param("s", ((params.page - 1) * 10 + 1).to_string());
        }
        Ok(request)
    }

    fn response(
        &self,
        response: EngineResponse,
        _params: &RequestParams,
    ) -> Result<Vec<SearchResult>, EngineError> {
        let document = Html::parse_document(&response.text);
        let results = document
            .select(&RESULT)
            .map(|element| {
                let mut result = TextResult::new();
                result
                    .set_title(scrape::text(element, &TITLE))
                    .set_href(scrape::attr(element, &LINK, "href"))
                    .set_body(scrape::text(element, &SNIPPET));
                result.into()
            })
            .collect();
        Ok(results)
    }
}

#[async_trait]
impl Engine for Mojeek {
    fn name(&self) -> &str {
        "mojeek"
    }

    fn category(&self) -> Category {
        Category::Text
    }

    fn provider(&self) -> &str {
        "mojeek"
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
        self.fetch(params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FIXTURE: &str = r#"
<ul class="results-standard">
  <li><a class="ob" href="https://serde.rs/">serde.rs</a>
    <h2><a class="title" href="https://serde.rs/">Overview &middot; Serde</a></h2>
    <p class="s">Serde is a framework for <em>serializing</em> data.</p>
  </li>
  <li>
    <h2><a href="https://docs.rs/serde">serde - Rust</a></h2>
    <p class="s">API docs</p>
  </li>
</ul>"#;

    #[test]
    fn test_request() {
        let mut params = RequestParams::new("serde");
        params.region = "uk-en".to_string();
        params.safesearch = SafeSearch::On;
        params.page = 2;
        let request = Mojeek::new(HttpClient::new().unwrap())
            .request(&params)
            .unwrap();

        assert_eq!(request.get_param("safe"), Some("1"));
        assert_eq!(request.get_param("s"), Some("11"));
        assert_eq!(request.cookies.get("arc").map(String::as_str), Some("uk"));
        assert_eq!(request.cookies.get("lb").map(String::as_str), Some("en"));
    }

    #[tokio::test]
    async fn test_search_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "serde"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
            .mount(&server)
            .await;

        let engine = Mojeek::new(HttpClient::new().unwrap())
            .with_search_url(format!("{}/search", server.uri()));
        let results = engine.search(&RequestParams::new("serde")).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title(), "Overview · Serde");
        assert_eq!(results[0].link(), "https://serde.rs/");
        assert_eq!(results[0].body(), "Serde is a framework for serializing data.");
        assert_eq!(results[1].link(), "https://docs.rs/serde");
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;
        Mock::given(path("/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let engine = Mojeek::new(HttpClient::new().unwrap())
            .with_search_url(format!("{}/search", server.uri()));
        let err = engine.search(&RequestParams::new("serde")).await.unwrap_err();
        assert_eq!(err, EngineError::Http(503));
    }
}
