//! Bing search engine implementation

use super::scrape::{self, css};
use super::traits::*;
use crate::network::HttpClient;
use crate::results::{Category, SearchResult, TextResult};
use crate::search::TimeRange;
use async_trait::async_trait;
use base64::Engine as _;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static RESULT: Lazy<Selector> = Lazy::new(|| css("li.b_algo"));
static TITLE: Lazy<Selector> = Lazy::new(|| css("h2 a"));
static SNIPPET: Lazy<Selector> = Lazy::new(|| css("p"));

const SEARCH_URL: &str = "https://www.bing.com/search";
const WRAPPED_PREFIX: &str = "https://www.bing.com/ck/a?";
const AD_PREFIX: &str = "https://www.bing.com/aclick?";

/// Bing web search engine
pub struct Bing {
    client: HttpClient,
    search_url: String,
}

impl Bing {
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

/// Decode Bing's click-tracking URLs.
///
/// Links look like `https://www.bing.com/ck/a?...&u=a1<base64>&...`; the
/// target is the url-safe base64 in `u` after its two-character prefix.
pub fn unwrap_bing_url(raw_url: &str) -> Option<String> {
    let parsed = url::Url::parse(raw_url).ok()?;
    let u = parsed
        .query_pairs()
        .find(|(k, _)| k == "u")
        .map(|(_, v)| v.into_owned())?;
    let encoded = u.get(2..).filter(|e| !e.is_empty())?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .ok()?;
    String::from_utf8(bytes).ok()
}

/// Bing date filter for a time range, relative to `today` (days since epoch)
fn time_filter(time_range: TimeRange, today: i64) -> String {
    let code = match time_range {
        TimeRange::Day => "ez1".to_string(),
        TimeRange::Week => "ez2".to_string(),
        TimeRange::Month => "ez3".to_string(),
        TimeRange::Year => format!("ez5_{}_{}", today - 365, today),
    };
    format!("ex1:\"{}\"", code)
}

#[async_trait]
impl WebEngine for Bing {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn request(&self, params: &RequestParams) -> Result<EngineRequest, EngineError> {
        let (country, lang) = params.country_lang();
        let mut request = EngineRequest::get(&self.search_url)
            .param("q", &params.query)
            .param("pq", &params.query)
            .param("cc", &lang)
            .cookie("_EDGE_CD", format!("m={lang}-{country}&u={lang}-{country}"))
            .cookie("_EDGE_S", format!("mkt={lang}-{country}&ui={lang}-{country}"));

        if let Some(time_range) = params.time_limit {
            let today = chrono::Utc::now().timestamp() / 86_400;
            request = request.param("filters", time_filter(time_range, today));
        }
        if params.page > 1 {
            let form = if params.page > 2 {
                format!("PERE{}", params.page - 2)
            } else {
                "PERE".to_string()
            };
            request = request
                .param("first", ((params.page - 1) * 10).to_string())
                .param("FORM", form);
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
            let href = scrape::attr(element, &TITLE, "href");
            if href.starts_with(AD_PREFIX) {
                continue;
            }
            let href = if href.starts_with(WRAPPED_PREFIX) {
                unwrap_bing_url(&href).unwrap_or(href)
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

        if results.is_empty() && response.is_captcha() {
            return Err(EngineError::Captcha);
        }
        Ok(results)
    }
}

#[async_trait]
impl Engine for Bing {
    fn name(&self) -> &str {
        "bing"
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
