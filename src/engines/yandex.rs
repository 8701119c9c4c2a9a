//! Yandex search engine implementation

use super::scrape::{self, css};
use super::traits::*;
use crate::network::HttpClient;
use crate::results::{Category, SearchResult, TextResult};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::Rng;
use scraper::{Html, Selector};

static RESULT: Lazy<Selector> = Lazy::new(|| css(r#"li[class*="serp-item"]"#));
static TITLE: Lazy<Selector> = Lazy::new(|| css("h3"));
static LINK: Lazy<Selector> = Lazy::new(|| css("h3 a"));
static SNIPPET: Lazy<Selector> = Lazy::new(|| css(r#"div[class*="text"]"#));

const SEARCH_URL: &str = "https://yandex.com/search/site/";

/// Yandex site-search front end
pub struct Yandex {
    client: HttpClient,
    search_url: String,
}

impl Yandex {
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
impl WebEngine for Yandex {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn request(&self, params: &RequestParams) -> Result<EngineRequest, EngineError> {
        let search_id: u32 = rand::thread_rng().gen_range(1_000_000..=9_999_999);
        let mut request = EngineRequest::get(&self.search_url)
            .param("text", &params.query)
            .param("web", "1")
            .param("searchid", search_id.to_string());
        if params.page > 1 {
            request = request.param("p", (params.page - 1).to_string());
        }
        Ok(request)
    }

    fn response(
        &self,
        response: EngineResponse,
        _params: &RequestParams,
    ) -> Result<Vec<SearchResult>, EngineError> {
        let document = Html::parse_document(&response.text);

        Ok(document
            .select(&RESULT)
            .map(|element| {
                let mut result = TextResult::new();
                result
                    .set_title(scrape::text(element, &TITLE))
                    .set_href(scrape::attr(element, &LINK, "href"))
                    .set_body(scrape::text(element, &SNIPPET));
                result.into()
            })
            .collect())
    }
}

#[async_trait]
impl Engine for Yandex {
    fn name(&self) -> &str {
        "yandex"
    }

    fn category(&self) -> Category {
        Category::Text
    }

    fn provider(&self) -> &str {
        "yandex"
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
        self.fetch(params).await
    }
}
