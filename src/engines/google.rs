//! Google search engine implementation

use super::scrape::{self, css};
use super::traits::*;
use crate::network::HttpClient;
use crate::results::{Category, SearchResult, TextResult};
use crate::search::SafeSearch;
use async_trait::async_trait;
use base64::Engine as _;
use once_cell::sync::Lazy;
use rand::RngCore;
use scraper::{Html, Selector};

static RESULT: Lazy<Selector> = Lazy::new(|| css("div[data-snc]"));
static TITLE: Lazy<Selector> = Lazy::new(|| css("h3"));
static LINK: Lazy<Selector> = Lazy::new(|| css("a"));
static SNIPPET: Lazy<Selector> = Lazy::new(|| css(r#"div[data-sncf^="1"]"#));

const SEARCH_URL: &str = "https://www.google.com/search";

/// Google web search engine
pub struct Google {
    client: HttpClient,
    search_url: String,
}

impl Google {
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

/// `async` parameter of the progressive results endpoint
fn async_param(start: u32) -> String {
    let mut bytes = [0u8; 17];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);
    format!("arc_id:srp_{}_1{:02},use_ac:true,_fmt:prog", token, start)
}

#[async_trait]
impl WebEngine for Google {
    fn client(&self) -> &HttpClient {
        &self.client
    }

    fn request(&self, params: &RequestParams) -> Result<EngineRequest, EngineError> {
        let start = (params.page - 1) * 10;
        let filter = match params.safesearch {
            SafeSearch::On => "2",
            SafeSearch::Moderate => "1",
            SafeSearch::Off => "0",
        };
        let (country, lang) = params.country_lang();
        let country = country.to_ascii_uppercase();

        let mut request = EngineRequest::get(&self.search_url)
            .param("q", &params.query)
            .param("filter", filter)
            .param("start", start.to_string())
            .param("asearch", "arc")
            .param("async", async_param(start))
            .param("ie", "UTF-8")
            .param("oe", "UTF-8")
            .param("hl", format!("{}-{}", lang, country))
            .param("lr", format!("lang_{}", lang))
            .param("cr", format!("country{}", country));
        if let Some(time_range) = params.time_limit {
            request = request.param("tbs", format!("qdr:{}", time_range.code()));
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
            let title = scrape::text(element, &TITLE);
            if title.is_empty() {
                continue;
            }

            // The result link is the anchor wrapping the heading
            let href = element
                .select(&LINK)
                .filter(|a| a.select(&TITLE).next().is_some())
                .find_map(|a| a.value().attr("href"))
                .unwrap_or_default();
            if href.is_empty() || href.starts_with('/') || href.starts_with('#') {
                continue;
            }

            let mut result = TextResult::new();
            result
                .set_title(title)
                .set_href(href)
                .set_body(scrape::text(element, &SNIPPET));
            results.push(result.into());
        }
        Ok(results)
    }
}

#[async_trait]
impl Engine for Google {
    fn name(&self) -> &str {
        "google"
    }

    fn category(&self) -> Category {
        Category::Text
    }

    fn provider(&self) -> &str {
        "google"
    }

    async fn search(&self, params: &RequestParams) -> Result<Vec<SearchResult>, EngineError> {
        self.fetch(params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::TimeRange;

    const FIXTURE: &str = r#"
<div id="rso">
  <div data-snc="ih6Jnb_X">
    <div><a href="https://www.rust-lang.org/" jsname="UWckNb"><h3 class="LC20lb">Rust Programming Language</h3></a></div>
    <div data-sncf="1"><span>A language empowering everyone to build reliable software.</span></div>
  </div>
  <div data-snc="abc">
    <a href="/search?q=related"><h3>Related searches</h3></a>
  </div>
  <div data-snc="def">
    <a href="https://doc.rust-lang.org/book/"><span>no heading here</span></a>
  </div>
  <div data-snc="ghi">
    <a href="https://example.com/icon"><img src="x.png"></a>
    <a href="https://doc.rust-lang.org/std/"><h3>std - Rust</h3></a>
    <div data-sncf="1,2">The Rust Standard Library</div>
  </div>
</div>"#;

    fn engine() -> Google {
        Google::new(HttpClient::new().unwrap())
    }

    #[test]
    fn test_async_param() {
        let param = async_param(20);
        assert!(param.starts_with("arc_id:srp_"));
        assert!(param.ends_with("_120,use_ac:true,_fmt:prog"));
        // 17 random bytes encode to 23 url-safe characters
        let token = &param["arc_id:srp_".len()..param.len() - "_120,use_ac:true,_fmt:prog".len()];
        assert_eq!(token.len(), 23);
    }

    #[test]
    fn test_request() {
        let mut params = RequestParams::new("rust");
        params.region = "de-de".to_string();
        params.page = 3;
        params.safesearch = SafeSearch::On;
        params.time_limit = Some(TimeRange::Month);
        let request = engine().request(&params).unwrap();

        assert_eq!(request.url, "https://www.google.com/search");
        assert_eq!(request.get_param("q"), Some("rust"));
        assert_eq!(request.get_param("filter"), Some("2"));
        assert_eq!(request.get_param("start"), Some("20"));
        assert_eq!(request.get_param("hl"), Some("de-DE"));
        assert_eq!(request.get_param("lr"), Some("lang_de"));
        assert_eq!(request.get_param("cr"), Some("countryDE"));
        assert_eq!(request.get_param("tbs"), Some("qdr:m"));
    }

    #[test]
    fn test_parse_results() {
        let results = engine()
            .response(EngineResponse::with_text(FIXTURE), &RequestParams::new("rust"))
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title(), "Rust Programming Language");
        assert_eq!(results[0].link(), "https://www.rust-lang.org/");
        assert_eq!(
            results[0].body(),
            "A language empowering everyone to build reliable software."
        );
        assert_eq!(results[1].link(), "https://doc.rust-lang.org/std/");
        assert_eq!(results[1].body(), "The Rust Standard Library");
    }
}
