//! Yahoo News search engine implementation

use super::scrape::{self, css};
use super::traits::*;
use crate::network::HttpClient;
use crate::results::{Category, NewsResult, SearchResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static ITEMS: Lazy<Selector> = Lazy::new(|| css("div#web li"));
static DATE: Lazy<Selector> = Lazy::new(|| css(r#"span[class*="time"]"#));
static TITLE: Lazy<Selector> = Lazy::new(|| css("h4"));
static BODY: Lazy<Selector> = Lazy::new(|| css("p"));
static LINK: Lazy<Selector> = Lazy::new(|| css("h4 a"));
static IMAGE: Lazy<Selector> = Lazy::new(|| css("img"));
static SOURCE: Lazy<Selector> = Lazy::new(|| css(r#"span[class*="source"]"#));

static RELATIVE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(year|month|week|day|hour|minute)s?\b").expect("valid date regex")
});

const SEARCH_URL: &str = "https://news.search.yahoo.com/search";

/// Yahoo News search
pub struct YahooNews {
    client: HttpClient,
    search_url: String,
}

impl YahooNews {
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

/// Turn "3 hours ago" into an ISO-8601 timestamp relative to `now`.
/// Anything else is returned unchanged.
pub fn relative_date(text: &str, now: DateTime<Utc>) -> String {
    let Some(caps) = RELATIVE_DATE.captures(text) else {
        return text.to_string();
    };
    let Ok(n) = caps[1].parse::<i64>() else {
        return text.to_string();
    };
    let delta = match caps[2].to_ascii_lowercase().as_str() {
        "minute" => Duration::minutes(n),
        "hour" => Duration::hours(n),
        "day" => Duration::days(n),
        "week" => Duration::weeks(n),
        "month" => Duration::days(30 * n),
        _ => Duration::days(365 * n),
    };
    (now - delta).format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Target of a `/RU=<target>/RK=...` redirect, without its query string
pub fn extract_article_url(href: &str) -> String {
    let Some((_, target)) = href.split_once("/RU=") else {
        return href.to_string();
    };
    let target = target.split("/RK=").next().unwrap_or(target);
    let target = target.split('?').next().unwrap_or(target);
    urlencoding::decode(&target.replace('+', " "))
        .map(|t| t.into_owned())
        .unwrap_or_else(|_| target.to_string())
}

/// Image proxy links embed the original after `-/`
fn extract_image(src: &str) -> &str {
    src.find("-/").map(|i| &src[i + 2..]).unwrap_or(src)
}

/// Drop the " · via Yahoo" suffix
fn extract_source(source: &str) -> String {
    match source.find("via Yahoo") {
        Some(i) => source[..i]
            .trim_end_matches(|c: char| c.is_whitespace() || c == '·' || c == 'Â')
            .to_string(),
        None => source.to_string(),
    }
}

fn image_src(item: ElementRef<'_>) -> String {
    item.select(&IMAGE)
        .find_map(|img| img.value().attr("data-src").or_else(|| img.value().attr("src")))
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl WebEngine for YahooNews {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn request(&self, params: &RequestParams) -> Result<EngineRequest, EngineError> {
        let mut request = EngineRequest::get(&self.search_url).param("p", &params.query);
        if params.page > 1 {
            request = request.param("b", ((params.page - 1) * 10 + 1).to_string());
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
        let now = Utc::now();
        let mut results = Vec::new();

        for item in document
            .select(&ITEMS)
            .filter(|li| scrape::children(*li, "a").next().is_some())
        {
            let mut result = NewsResult::new();
            result
                .set_date(relative_date(&scrape::text(item, &DATE), now))
                .set_title(scrape::text(item, &TITLE))
                .set_body(scrape::text(item, &BODY))
                .set_url(extract_article_url(&scrape::attr(item, &LINK, "href")))
                .set_image(extract_image(&image_src(item)))
                .set_source(extract_source(&scrape::text(item, &SOURCE)));
            results.push(result.into());
        }
        Ok(results)
    }
}

#[async_trait]
impl Engine for YahooNews {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn category(&self) -> Category {
        Category::News
    }

    fn provider(&self) -> &str {
        "yahoo"
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
        self.fetch(params).await
    }
}
