//! Yahoo search engine implementation

use super::scrape::{self, css};
use super::traits::*;
use crate::network::HttpClient;
use crate::results::{Category, SearchResult, TextResult};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::distributions::Alphanumeric;
use rand::Rng;
use scraper::{Html, Selector};

static RESULT: Lazy<Selector> = Lazy::new(|| css("div.relsrch"));
static TITLE: Lazy<Selector> = Lazy::new(|| css(r#"div[class*="Title"] h3"#));
static LINK: Lazy<Selector> = Lazy::new(|| css(r#"div[class*="Title"] a"#));
static SNIPPET: Lazy<Selector> = Lazy::new(|| css(r#"div[class*="Text"]"#));

const SEARCH_URL: &str = "https://search.yahoo.com/search";

/// Yahoo web search engine (Bing-backed)
pub struct Yahoo {
    client: HttpClient,
    search_url: String,
}

impl Yahoo {
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

/// Extract the target of a Yahoo redirect link (`.../RU=<target>/RK=.../RS=...`)
pub fn extract_redirect_url(href: &str) -> Option<String> {
    let (_, target) = href.split_once("/RU=")?;
    let target = target.split("/RK=").next().unwrap_or(target);
    let target = target.split("/RS=").next().unwrap_or(target);
    let target = target.replace('+', " ");
    urlencoding::decode(&target).ok().map(|t| t.into_owned())
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[async_trait]
impl WebEngine for Yahoo {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn request(&self, params: &RequestParams) -> Result<EngineRequest, EngineError> {
        // Fresh tracking tokens per call
        let url = format!(
            "{};_ylt={};_ylu={}",
            self.search_url,
            random_token(24),
            random_token(47)
        );
        let mut request = EngineRequest::get(url).param("p", &params.query);
        if params.page > 1 {
            request = request.param("b", ((params.page - 1) * 7 + 1).to_string());
        }
        if let Some(time_range) = params.time_limit {
            request = request.param("btf", time_range.code());
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
            let href = scrape::attr(element, &LINK, "href");
            if href.starts_with("https://www.bing.com/aclick?") {
                continue;
            }
            let href = if href.contains("/RU=") {
                extract_redirect_url(&href).unwrap_or(href)
            } else {
                href
            };

            let mut result = TextResult::new();
            result
                .set_title(scrape::text(element, &TITLE))
                .set_href(href)
                .set_body(scrape::text(element, &SNIPPET));
            results.push(result.into());
        }
        Ok(results)
    }
}

#[async_trait]
impl Engine for Yahoo {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn category(&self) -> Category {
        Category::Text
    }

    fn provider(&self) -> &str {
        "bing"
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
        self.fetch(params).await
    }
}
