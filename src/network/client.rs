//! HTTP client for making requests to search engines

use super::user_agent::{accept_html, accept_language, generate_user_agent};
use crate::config::OutgoingSettings;
use crate::engines::{EngineRequest, EngineResponse, HttpMethod, RequestBody};
use crate::error::{EngineError, SearchError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Shared HTTP transport for all engines.
///
/// Holds no per-request state: cookies and headers travel with each
/// [`EngineRequest`], so one client can be cloned into every engine and used
/// from concurrent searches.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SearchError> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self, SearchError> {
        let mut default_headers = HeaderMap::new();
        for (key, value) in &settings.extra_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| SearchError::Configuration(format!("header {}: {}", key, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| SearchError::Configuration(format!("header {}: {}", key, e)))?;
            default_headers.insert(name, value);
        }

        let timeout = Duration::try_from_secs_f64(settings.request_timeout).map_err(|e| {
            SearchError::Configuration(format!(
                "request_timeout {}: {}",
                settings.request_timeout, e
            ))
        })?;

        let mut builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .default_headers(default_headers)
            .gzip(true)
            .brotli(true);

        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(proxy_url) = settings.proxy_url() {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| SearchError::Configuration(format!("proxy {}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| SearchError::Configuration(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: generate_user_agent(),
        })
    }

    /// Execute an engine request.
    ///
    /// Transport failures and non-2xx statuses come back as [`EngineError`].
    pub async fn execute(&self, request: EngineRequest) -> Result<EngineResponse, EngineError> {
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        req_builder = req_builder
            .header("User-Agent", &self.user_agent)
            .header("Accept", accept_html())
            .header("Accept-Language", accept_language(&request.region))
            .header("DNT", "1")
            .header("Upgrade-Insecure-Requests", "1");

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        if !request.cookies.is_empty() {
            let cookie_str = request
                .cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            req_builder = req_builder.header("Cookie", cookie_str);
        }

        if let Some(body) = request.data {
            req_builder = match body {
                RequestBody::Form(data) => req_builder.form(&data),
                RequestBody::Json(json) => req_builder.json(&json),
            };
        }

        debug!("{:?} {}", request.method, request.url);
        let response = req_builder.send().await?;

        if let Some(err) = EngineError::from_status(response.status().as_u16()) {
            return Err(err);
        }
        Self::parse_response(response).await
    }

    async fn parse_response(response: Response) -> Result<EngineResponse, EngineError> {
        let status = response.status().as_u16();
        let url = response.url().to_string();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let text = response.text().await?;

        Ok(EngineResponse {
            status,
            headers,
            text,
            url,
        })
    }
}
