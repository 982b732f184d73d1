//! Test doubles shared by the crawler unit tests

use crate::config::{
    CatalogConfig, Config, CrawlerConfig, DatabaseConfig, LoggingConfig, TimeoutConfig,
};
use crate::render::{PageRenderer, RenderError, RenderRequest, RenderResult};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub const BASE_URL: &str = "https://kolesa.kz";

/// Configuration with every delay zeroed
pub fn test_config() -> Config {
    Config {
        catalog: CatalogConfig {
            base_url: BASE_URL.to_string(),
            listing_path: "/cars/".to_string(),
            start_page: 2,
            user_agent: None,
        },
        timeouts: TimeoutConfig {
            page_load: 1_000,
            navigation: 1_000,
            retry_sleep: 0,
            max_attempts: 3,
            retry_detail_pages: true,
        },
        crawler: CrawlerConfig {
            sleep_interval: 0,
            restart_delay: 0,
            batch_size: 20,
            min_fetch_delay: 0,
            max_fetch_delay: 0,
        },
        database: DatabaseConfig {
            path: ":memory:".to_string(),
        },
        logging: LoggingConfig::default(),
        alerting: None,
    }
}

pub fn listing_url(page: u32) -> String {
    format!("{}/cars/?page={}", BASE_URL, page)
}

pub fn ad_url(id: u32) -> String {
    format!("{}/a/show/{}", BASE_URL, id)
}

/// A listing page linking to the given ad IDs
pub fn listing_page(ids: impl IntoIterator<Item = u32>) -> String {
    let cards: String = ids
        .into_iter()
        .map(|id| {
            format!(
                r#"<div class="a-card"><h5 class="a-card__title"><a href="/a/show/{}">Ad {}</a></h5></div>"#,
                id, id
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", cards)
}

/// A minimal detail page with only a title
pub fn detail_page(title: &str) -> String {
    format!(
        r#"<html><body><h1 class="offer__title">{}</h1></body></html>"#,
        title
    )
}

#[derive(Default)]
struct FakeState {
    pages: HashMap<String, String>,
    /// Remaining forced failures per URL; `None` means always fail
    failures: HashMap<String, Option<usize>>,
    loads: HashMap<String, usize>,
    load_times: HashMap<String, Vec<Instant>>,
    total_loads: usize,
    cancel_after: Option<(usize, CancellationToken)>,
}

/// In-memory renderer keyed by exact URL
#[derive(Clone, Default)]
pub struct FakeRenderer {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(url.to_string(), html.to_string());
        self
    }

    pub fn fail_times(self, url: &str, times: usize) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(url.to_string(), Some(times));
        self
    }

    pub fn fail_always(self, url: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(url.to_string(), None);
        self
    }

    /// Cancels `token` once `loads` page loads have been served
    pub fn cancel_after(self, loads: usize, token: CancellationToken) -> Self {
        self.state.lock().unwrap().cancel_after = Some((loads, token));
        self
    }

    pub fn loads_of(&self, url: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .loads
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    /// When each load of `url` happened, in order
    pub fn load_times_of(&self, url: &str) -> Vec<Instant> {
        self.state
            .lock()
            .unwrap()
            .load_times
            .get(url)
            .cloned()
            .unwrap_or_default()
    }

    pub fn total_loads(&self) -> usize {
        self.state.lock().unwrap().total_loads
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn render(&self, request: &RenderRequest) -> RenderResult<String> {
        let mut state = self.state.lock().unwrap();
        let url = request.url.to_string();

        *state.loads.entry(url.clone()).or_insert(0) += 1;
        state
            .load_times
            .entry(url.clone())
            .or_default()
            .push(Instant::now());
        state.total_loads += 1;
        if let Some((limit, token)) = &state.cancel_after {
            if state.total_loads >= *limit {
                token.cancel();
            }
        }

        let fail = match state.failures.get_mut(&url) {
            Some(None) => true,
            Some(Some(remaining)) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        };
        if fail {
            return Err(RenderError::Navigation {
                url,
                message: "simulated failure".to_string(),
            });
        }

        let html = match state.pages.get(&url) {
            Some(html) => html.clone(),
            None => return Err(RenderError::Status { url, status: 404 }),
        };

        if let Some(selector) = request.ready_selector {
            if !has_selector(&html, selector) {
                return Err(RenderError::MarkupMissing {
                    url,
                    selector: selector.to_string(),
                });
            }
        }
        Ok(html)
    }
}

fn has_selector(html: &str, css: &str) -> bool {
    Selector::parse(css)
        .map(|selector| Html::parse_document(html).select(&selector).next().is_some())
        .unwrap_or(false)
}
