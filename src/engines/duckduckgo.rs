//! DuckDuckGo search engine implementations
//!
//! The HTML endpoint serves text results; images, news and videos come from
//! JSON endpoints that need a `vqd` token scraped from the home page. The
//! token is fetched on every call and never stored on the engine.

use super::scrape::{self, css};
use super::traits::*;
use crate::network::HttpClient;
use crate::results::{
    Category, FieldValue, ImagesResult, NewsResult, SearchResult, TextResult, VideosResult,
};
use crate::search::SafeSearch;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::BTreeMap;

static RESULT: Lazy<Selector> = Lazy::new(|| css(r#"div[class*="body"]"#));
static TITLE: Lazy<Selector> = Lazy::new(|| css("h2"));

const HTML_URL: &str = "https://html.duckduckgo.com/html/";
const BASE_URL: &str = "https://duckduckgo.com";

/// DuckDuckGo HTML web search.
///
/// Disabled by default: the endpoint rate limits aggressively.
pub struct DuckDuckGo {
    client: HttpClient,
    search_url: String,
}

impl DuckDuckGo {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            search_url: HTML_URL.to_string(),
        }
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }
}

#[async_trait]
impl WebEngine for DuckDuckGo {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn request(&self, params: &RequestParams) -> Result<EngineRequest, EngineError> {
        let mut form = vec![
            ("q".to_string(), params.query.clone()),
            ("b".to_string(), String::new()),
            ("l".to_string(), params.region.clone()),
        ];
        if params.page > 1 {
            form.push(("s".to_string(), (10 + (params.page - 2) * 15).to_string()));
        }
        if let Some(time_range) = params.time_limit {
            form.push(("df".to_string(), time_range.code().to_string()));
        }
        Ok(EngineRequest::post(&self.search_url).form(form))
    }

    fn response(
        &self,
        response: EngineResponse,
        _params: &RequestParams,
    ) -> Result<Vec<SearchResult>, EngineError> {
        let document = Html::parse_document(&response.text);
        let mut results = Vec::new();

        for element in document.select(&RESULT) {
            let snippet = scrape::children(element, "a")
                .map(scrape::own_text)
                .collect::<Vec<_>>()
                .join(" ");

            let mut result = TextResult::new();
            result
                .set_title(scrape::text(element, &TITLE))
                .set_href(scrape::child_attr(element, "a", "href"))
                .set_body(snippet);
            results.push(result.into());
        }
        Ok(results)
    }
}

#[async_trait]
impl Engine for DuckDuckGo {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    fn category(&self) -> Category {
        Category::Text
    }

    fn provider(&self) -> &str {
        "bing"
    }

    fn disabled(&self) -> bool {
        true
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
        self.fetch(params).await
    }
}

/// Pull the `vqd` token out of a DuckDuckGo page
pub fn extract_vqd(page: &str) -> Option<String> {
    const PATTERNS: [(&str, &str); 3] = [("vqd=\"", "\""), ("vqd=", "&"), ("vqd='", "'")];
    PATTERNS.iter().find_map(|(start, end)| {
        let from = page.find(start)? + start.len();
        let len = page[from..].find(end)?;
        Some(page[from..from + len].to_string())
    })
}

/// JSON result verticals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertical {
    Images,
    News,
    Videos,
}

/// DuckDuckGo images, news or videos search
pub struct DuckDuckGoVertical {
    client: HttpClient,
    base_url: String,
    vertical: Vertical,
}

impl DuckDuckGoVertical {
    pub fn images(client: HttpClient) -> Self {
        Self::with_vertical(client, Vertical::Images)
    }

    pub fn news(client: HttpClient) -> Self {
        Self::with_vertical(client, Vertical::News)
    }

    pub fn videos(client: HttpClient) -> Self {
        Self::with_vertical(client, Vertical::Videos)
    }

    fn with_vertical(client: HttpClient, vertical: Vertical) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
            vertical,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn fetch_vqd(&self, query: &str) -> Result<String, EngineError> {
        let request = EngineRequest::get(&self.base_url).param("q", query);
        let response = self.client.execute(request).await?;
        extract_vqd(&response.text)
            .ok_or_else(|| EngineError::Parse(format!("no vqd token for query {:?}", query)))
    }

    fn safesearch(&self, safesearch: SafeSearch) -> &'static str {
        match (self.vertical, safesearch) {
            (_, SafeSearch::On) => "1",
            (Vertical::Images, SafeSearch::Moderate) => "1",
            (Vertical::Images, SafeSearch::Off) => "-1",
            (_, SafeSearch::Moderate) => "-1",
            (_, SafeSearch::Off) => "-2",
        }
    }

    /// Build the JSON request for a search once the token is known
    fn request(&self, params: &RequestParams, vqd: &str) -> EngineRequest {
        let (endpoint, page_size) = match self.vertical {
            Vertical::Images => ("i.js", 100),
            Vertical::News => ("news.js", 30),
            Vertical::Videos => ("v.js", 60),
        };
        let mut request = EngineRequest::get(format!("{}/{}", self.base_url, endpoint))
            .param("l", &params.region)
            .param("o", "json")
            .param("q", &params.query)
            .param("vqd", vqd)
            .param("p", self.safesearch(params.safesearch));

        request = match self.vertical {
            Vertical::Images => {
                let filters = [
                    params.time_limit.map(|t| format!("time:{}", t.word())),
                    params.extra("size").map(|v| format!("size:{}", v)),
                    params.extra("color").map(|v| format!("color:{}", v)),
                    params.extra("type_image").map(|v| format!("type:{}", v)),
                    params.extra("layout").map(|v| format!("layout:{}", v)),
                    params.extra("license_image").map(|v| format!("license:{}", v)),
                ];
                request
                    .param("f", join_filters(&filters))
                    .header("Referer", format!("{}/", BASE_URL))
                    .header("Sec-Fetch-Mode", "cors")
            }
            Vertical::News => {
                let request = request.param("noamp", "1");
                match params.time_limit {
                    Some(t) => request.param("df", t.code()),
                    None => request,
                }
            }
            Vertical::Videos => {
                let filters = [
                    params.time_limit.map(|t| format!("publishedAfter:{}", t.code())),
                    params.extra("resolution").map(|v| format!("videoDefinition:{}", v)),
                    params.extra("duration").map(|v| format!("videoDuration:{}", v)),
                    params.extra("license_videos").map(|v| format!("videoLicense:{}", v)),
                ];
                request.param("f", join_filters(&filters))
            }
        };

        if params.page > 1 {
            request = request.param("s", ((params.page - 1) * page_size).to_string());
        }
        request
    }

    fn parse(&self, response: &EngineResponse) -> Result<Vec<SearchResult>, EngineError> {
        let data: Value = response.json()?;
        let items = data
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(items.iter().map(|item| self.parse_item(item)).collect())
    }

    fn parse_item(&self, item: &Value) -> SearchResult {
        let field = |key: &str| FieldValue::from_json(item.get(key).unwrap_or(&Value::Null));
        match self.vertical {
            Vertical::Images => {
                let mut result = ImagesResult::new();
                for &name in ImagesResult::FIELDS {
                    result.set(name, field(name));
                }
                result.into()
            }
            Vertical::News => {
                let mut result = NewsResult::new();
                result
                    .set_date(field("date"))
                    .set_title(field("title"))
                    .set_body(field("excerpt"))
                    .set_url(field("url"))
                    .set_image(field("image"))
                    .set_source(field("source"));
                result.into()
            }
            Vertical::Videos => {
                let mut result = VideosResult::new();
                for &name in VideosResult::FIELDS {
                    result.set(name, field(name));
                }
                result
                    .set_images(string_map(item.get("images")))
                    .set_statistics(string_map(item.get("statistics")));
                result.into()
            }
        }
    }
}

/// Comma-joined filter list; unset slots stay as empty entries
fn join_filters(filters: &[Option<String>]) -> String {
    filters
        .iter()
        .map(|f| f.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",")
}

/// Flatten a JSON object into string values
fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|object| {
            object
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), FieldValue::from_json(v).into_string()))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl Engine for DuckDuckGoVertical {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    fn category(&self) -> Category {
        match self.vertical {
            Vertical::Images => Category::Images,
            Vertical::News => Category::News,
            Vertical::Videos => Category::Videos,
        }
    }

    fn provider(&self) -> &str {
        "bing"
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
        let vqd = self.fetch_vqd(&params.query).await?;
        let request = self.request(params, &vqd).region(params.region.clone());
        let response = self.client.execute(request).await?;
        self.parse(&response)
    }
}
