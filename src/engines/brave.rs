//! Brave Search engine implementation

use super::scrape::{self, css};
use super::traits::*;
use crate::network::HttpClient;
use crate::results::{Category, SearchResult, TextResult};
use crate::search::{SafeSearch, TimeRange};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static RESULT: Lazy<Selector> = Lazy::new(|| css(r#"div[data-type="web"]"#));
static TITLE: Lazy<Selector> =
    Lazy::new(|| css(r#"div[class*="title"], div[class*="sitename-container"]"#));
static SNIPPET: Lazy<Selector> = Lazy::new(|| css(r#"div[class*="description"]"#));

const SEARCH_URL: &str = "https://search.brave.com/search";

/// Brave Search engine
pub struct Brave {
    client: HttpClient,
    search_url: String,
}

impl Brave {
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
impl WebEngine for Brave {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn request(&self, params: &RequestParams) -> Result<EngineRequest, EngineError> {
        let (country, _) = params.country_lang();
        let mut request = EngineRequest::get(&self.search_url)
            .param("q", &params.query)
            .param("source", "web")
            .cookie(country.clone(), country)
            .cookie("useLocation", "0");

        match params.safesearch {
            SafeSearch::On => request = request.cookie("safesearch", "strict"),
            SafeSearch::Off => request = request.cookie("safesearch", "off"),
            SafeSearch::Moderate => {}
        }
        if let Some(time_range) = params.time_limit {
            let tf = match time_range {
                TimeRange::Day => "pd",
                TimeRange::Week => "pw",
                TimeRange::Month => "pm",
                TimeRange::Year => "py",
            };
            request = request.param("tf", tf);
        }
        if params.page > 1 {
            request = request.param("offset", (params.page - 1).to_string());
        }
        Ok(request)
    }

    fn response(
        &self,
        response: EngineResponse,
        _params: &RequestParams,
    ) -> Result<Vec<SearchResult>, EngineError> {
        let document = Html::parse_document(&response.text);
        let mut results = Vec::new();

        for element in document.select(&RESULT) {
            let mut result = TextResult::new();
            result
                .set_title(scrape::last_text(element, &TITLE))
                .set_href(scrape::child_attr(element, "a", "href"))
                .set_body(scrape::text(element, &SNIPPET));
            results.push(result.into());
        }
        Ok(results)
    }
}

#[async_trait]
impl Engine for Brave {
    fn name(&self) -> &str {
        "brave"
    }

    fn category(&self) -> Category {
        Category::Text
    }

    fn provider(&self) -> &str {
        "brave"
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
        self.fetch(params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
<div id="results">
  <div class="snippet" data-type="web">
    <a href="https://tokio.rs/" class="heading-serpresult">
      <div class="site-wrapper"><div class="sitename-container">tokio.rs</div></div>
      <div class="title search-snippet-title">Tokio - An asynchronous Rust runtime</div>
    </a>
    <div class="snippet-content"><div class="snippet-description">Tokio is a <strong>runtime</strong> for writing reliable apps.</div></div>
  </div>
  <div class="snippet" data-type="video"><a href="https://video.example/">skip</a></div>
</div>"#;

    fn engine() -> Brave {
        Brave::new(HttpClient::new().unwrap())
    }

    #[test]
    fn test_request() {
        let mut params = RequestParams::new("tokio");
        params.region = "fr-fr".to_string();
        params.safesearch = SafeSearch::On;
        params.time_limit = Some(TimeRange::Month);
        params.page = 3;
        let request = engine().request(&params).unwrap();

        assert_eq!(request.get_param("source"), Some("web"));
        assert_eq!(request.get_param("tf"), Some("pm"));
        assert_eq!(request.get_param("offset"), Some("2"));
        assert_eq!(request.cookies.get("fr").map(String::as_str), Some("fr"));
        assert_eq!(
            request.cookies.get("safesearch").map(String::as_str),
            Some("strict")
        );
    }

    #[test]
    fn test_moderate_sets_no_cookie() {
        let request = engine().request(&RequestParams::new("tokio")).unwrap();
        assert!(!request.cookies.contains_key("safesearch"));
        assert_eq!(request.get_param("offset"), None);
    }

    #[test]
    fn test_parse_results() {
        let params = RequestParams::new("tokio");
        let results = engine()
            .response(EngineResponse::with_text(FIXTURE), &params)
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "Tokio - An asynchronous Rust runtime");
        assert_eq!(results[0].link(), "https://tokio.rs/");
        assert_eq!(
            results[0].body(),
            "Tokio is a runtime for writing reliable apps."
        );
    }
}
