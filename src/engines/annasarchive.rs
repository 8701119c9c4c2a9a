//! Anna's Archive book search implementation

use super::scrape::{self, css};
use super::traits::*;
use crate::network::HttpClient;
use crate::results::{BooksResult, Category, SearchResult};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static RECORDS: Lazy<Selector> = Lazy::new(|| css(r#"div[id*="record-list"] div"#));
static TITLE: Lazy<Selector> = Lazy::new(|| css("h3"));
static DIV: Lazy<Selector> = Lazy::new(|| css("div"));
static THUMBNAIL: Lazy<Selector> = Lazy::new(|| css("img"));

const BASE_URL: &str = "https://annas-archive.li";

/// Anna's Archive shadow-library search
pub struct AnnasArchive {
    client: HttpClient,
    base_url: String,
}

impl AnnasArchive {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Record containers: a direct link child, or a lazily revealed block
fn is_record(element: &ElementRef<'_>) -> bool {
    scrape::children(*element, "a").next().is_some()
        || element
            .value()
            .attr("class")
            .map(|c| c.contains("js-scroll-hidden"))
            .unwrap_or(false)
}

/// Info, publisher and author lines sit in the divs next to the title
fn detail_lines(record: ElementRef<'_>) -> [String; 3] {
    let mut lines: [String; 3] = Default::default();
    let header = record
        .select(&DIV)
        .find(|div| scrape::children(*div, "h3").next().is_some());
    if let Some(header) = header {
        for (slot, div) in lines.iter_mut().zip(scrape::children(header, "div")) {
            *slot = scrape::own_text(div);
        }
    }
    lines
}

#[async_trait]
impl WebEngine for AnnasArchive {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn request(&self, params: &RequestParams) -> Result<EngineRequest, EngineError> {
        Ok(EngineRequest::get(format!("{}/search", self.base_url))
            .param("q", &params.query)
            .param("page", params.page.to_string()))
    }

    fn response(
        &self,
        response: EngineResponse,
        _params: &RequestParams,
    ) -> Result<Vec<SearchResult>, EngineError> {
        // Most records arrive commented out for lazy rendering
        let html = response.text.replace("<!--", "").replace("-->", "");
        let document = Html::parse_document(&html);
        let mut results = Vec::new();

        for record in document.select(&RECORDS).filter(is_record) {
            let path = scrape::child_attr(record, "a", "href");
            if path.is_empty() {
                continue;
            }
            let [info, publisher, author] = detail_lines(record);

            let mut result = BooksResult::new();
            result
                .set_title(scrape::text(record, &TITLE))
                .set_author(author)
                .set_publisher(publisher)
                .set_info(info)
                .set_url(format!("{}{}", self.base_url, path))
                .set_thumbnail(scrape::attr(record, &THUMBNAIL, "src"));
            results.push(result.into());
        }
        Ok(results)
    }
}

#[async_trait]
impl Engine for AnnasArchive {
    fn name(&self) -> &str {
        "annasarchive"
    }

    fn category(&self) -> Category {
        Category::Books
    }

    fn provider(&self) -> &str {
        "annasarchive"
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
        self.fetch(params).await
    }
}
