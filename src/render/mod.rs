//! Page rendering client
//!
//! The crawler never talks HTTP directly; it asks a [`PageRenderer`] for the
//! document behind a URL. The bundled [`HttpRenderer`] fetches the server-side
//! HTML with reqwest. A browser-backed renderer can be plugged in behind the
//! same trait.

mod http;

pub use http::{build_http_client, HttpRenderer, DEFAULT_USER_AGENT};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur while loading a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Timed out after {timeout:?} loading {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Expected markup '{selector}' not found on {url}")]
    MarkupMissing { url: String, selector: String },
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;

/// A single page load
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub url: Url,

    /// Selector that must be present before the page counts as loaded
    pub ready_selector: Option<&'static str>,

    /// Budget for this load only
    pub timeout: Duration,
}

impl RenderRequest {
    pub fn new(url: Url, timeout: Duration) -> Self {
        Self {
            url,
            ready_selector: None,
            timeout,
        }
    }

    pub fn wait_for(mut self, selector: &'static str) -> Self {
        self.ready_selector = Some(selector);
        self
    }
}

/// Something that can turn a URL into rendered HTML
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Loads the page and returns its document HTML
    async fn render(&self, request: &RenderRequest) -> RenderResult<String>;
}
