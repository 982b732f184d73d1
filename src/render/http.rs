//! reqwest-backed renderer
//!
//! Fetches only the document itself, so image sub-resources are never loaded.

use crate::render::{PageRenderer, RenderError, RenderRequest, RenderResult};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

/// User agent used when the configuration does not set one
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Builds the HTTP client shared by every page load of a session
///
/// Per-request timeouts are applied by [`HttpRenderer`]; only the connect
/// timeout is fixed here.
pub fn build_http_client(user_agent: Option<&str>) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Renders pages by fetching their server-side HTML
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, request: &RenderRequest) -> RenderResult<String> {
        let url = request.url.as_str();

        let response = self
            .client
            .get(request.url.clone())
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, request.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, request.timeout, e))?;

        if let Some(selector) = request.ready_selector {
            if !contains_selector(&body, selector) {
                return Err(RenderError::MarkupMissing {
                    url: url.to_string(),
                    selector: selector.to_string(),
                });
            }
        }

        Ok(body)
    }
}

fn classify_error(url: &str, timeout: Duration, error: reqwest::Error) -> RenderError {
    if error.is_timeout() {
        RenderError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else if error.is_connect() {
        RenderError::Navigation {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        RenderError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

fn contains_selector(html: &str, css: &str) -> bool {
    match Selector::parse(css) {
        Ok(selector) => Html::parse_document(html).select(&selector).next().is_some(),
        Err(_) => false,
    }
}
