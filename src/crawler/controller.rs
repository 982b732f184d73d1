//! Crawl controller - the per-session crawl loop
//!
//! Each iteration walks one catalog page through these states:
//!
//! ```text
//! LOAD_PAGE -> WALK_LINKS -> FETCH_DETAILS -> FLUSH -> ADVANCE_OR_RESET
//!     ^                                                      |
//!     +------------------------------------------------------+
//! ```
//!
//! A page on which every link is already known means the crawl has caught up
//! with the catalog: the controller sleeps, then starts over from the first
//! page instead of walking deeper into ads it has already seen.

use crate::config::Config;
use crate::crawler::buffer::WriteBuffer;
use crate::crawler::fetcher::DetailFetcher;
use crate::crawler::retry::{load_with_retry, RetryPolicy};
use crate::crawler::walker::PageWalker;
use crate::crawler::{sleep_or_cancel, DuplicateStore};
use crate::extract::LISTING_READY_SELECTOR;
use crate::render::{PageRenderer, RenderRequest};
use crate::storage::AdStore;
use crate::HarvestError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Position of the crawl in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlCursor {
    page: u32,
    start_page: u32,
}

impl CrawlCursor {
    pub fn new(start_page: u32) -> Self {
        Self {
            page: start_page,
            start_page,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    fn advance(&mut self) {
        self.page += 1;
    }

    fn reset(&mut self) {
        self.page = self.start_page;
    }
}

/// What happened on one catalog page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageReport {
    pub page: u32,

    /// Ad anchors on the page
    pub total: usize,

    /// Anchors whose ad was already known
    pub known: usize,

    /// Detail pages fetched and extracted
    pub fetched: usize,

    /// Rows written to the store while processing the page
    pub inserted: usize,

    /// Whether processing stopped early because shutdown was requested
    pub interrupted: bool,
}

impl PageReport {
    /// True when no link on the page was new, including an empty page
    pub fn caught_up(&self) -> bool {
        self.known == self.total
    }
}

/// Decision taken after a page has been processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Continue with the next page immediately
    Advance { next_page: u32 },

    /// Sleep, then restart from the first page
    Reset { sleep: Duration },
}

/// Drives one crawl session over a renderer and a store
pub struct CrawlController<R, S> {
    renderer: R,
    store: S,
    known: DuplicateStore,
    buffer: WriteBuffer,
    cursor: CrawlCursor,
    walker: PageWalker,
    fetcher: DetailFetcher,
    listing_timeout: Duration,
    listing_retry: RetryPolicy,
    sleep_interval: Duration,
    shutdown: CancellationToken,
}

impl<R: PageRenderer, S: AdStore> CrawlController<R, S> {
    /// Creates a controller for one session
    ///
    /// `known` must already be seeded from `store`.
    pub fn new(
        config: &Config,
        renderer: R,
        store: S,
        known: DuplicateStore,
        shutdown: CancellationToken,
    ) -> Result<Self, HarvestError> {
        let walker = PageWalker::new(&config.catalog.base_url, &config.catalog.listing_path)?;

        Ok(Self {
            renderer,
            store,
            known,
            buffer: WriteBuffer::new(config.crawler.batch_size),
            cursor: CrawlCursor::new(config.catalog.start_page),
            walker,
            fetcher: DetailFetcher::from_config(config),
            listing_timeout: config.timeouts.page_load_timeout(),
            listing_retry: RetryPolicy::from_config(&config.timeouts),
            sleep_interval: config.crawler.sleep_interval(),
            shutdown,
        })
    }

    pub fn current_page(&self) -> u32 {
        self.cursor.page()
    }

    pub fn known(&self) -> &DuplicateStore {
        &self.known
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Runs pages until shutdown is requested or a session-fatal error occurs
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Shutdown was requested
    /// * `Err(HarvestError)` - The session must be torn down and restarted
    pub async fn run(&mut self) -> Result<(), HarvestError> {
        tracing::info!(
            "Starting crawl session at page {} with {} known ads",
            self.cursor.page(),
            self.known.len()
        );

        while !self.shutdown.is_cancelled() {
            let report = match self.run_page().await {
                Ok(report) => report,
                Err(e) => {
                    self.salvage_buffer();
                    return Err(e);
                }
            };

            if report.interrupted {
                break;
            }

            if let Transition::Reset { sleep } = self.advance_or_reset(&report) {
                if !sleep_or_cancel(&self.shutdown, sleep).await {
                    break;
                }
            }
        }

        tracing::info!("Crawl session stopped at page {}", self.cursor.page());
        Ok(())
    }

    /// Processes the page under the cursor: load, walk, fetch, flush
    pub async fn run_page(&mut self) -> Result<PageReport, HarvestError> {
        // LOAD_PAGE
        let page = self.cursor.page();
        let url = self.walker.listing_url(page);
        tracing::info!("Loading catalog page {}: {}", page, url);

        let request =
            RenderRequest::new(url, self.listing_timeout).wait_for(LISTING_READY_SELECTOR);
        let html = load_with_retry(&self.renderer, &request, self.listing_retry).await?;

        // WALK_LINKS
        let walk = self.walker.walk(page, &html, &mut self.known);
        tracing::info!(
            "Page {}: {} links, {} known, {} new",
            page,
            walk.total,
            walk.known,
            walk.candidates.len()
        );

        // FETCH_DETAILS
        let mut report = PageReport {
            page,
            total: walk.total,
            known: walk.known,
            fetched: 0,
            inserted: 0,
            interrupted: false,
        };

        for candidate in &walk.candidates {
            if self.shutdown.is_cancelled() {
                report.interrupted = true;
                break;
            }

            let record = self.fetcher.fetch(&self.renderer, candidate).await?;
            report.fetched += 1;
            report.inserted += self.buffer.append(record, &mut self.store)?;
        }

        // FLUSH
        report.inserted += self.buffer.flush(&mut self.store)?;

        Ok(report)
    }

    /// Moves the cursor according to what the page yielded
    pub fn advance_or_reset(&mut self, report: &PageReport) -> Transition {
        if report.caught_up() {
            tracing::info!(
                "All {} ads on page {} already known, sleeping {:?} before restarting",
                report.total,
                report.page,
                self.sleep_interval
            );
            self.cursor.reset();
            Transition::Reset {
                sleep: self.sleep_interval,
            }
        } else {
            self.cursor.advance();
            tracing::info!("Moving to next page: {}", self.cursor.page());
            Transition::Advance {
                next_page: self.cursor.page(),
            }
        }
    }

    /// Last attempt to persist records already extracted before teardown
    fn salvage_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let pending = self.buffer.len();
        match self.buffer.flush(&mut self.store) {
            Ok(inserted) => tracing::info!(
                "Saved {} pending ads ({} new rows) before ending session",
                pending,
                inserted
            ),
            Err(e) => tracing::warn!("Dropping {} pending ads: {}", pending, e),
        }
    }
}
