//! Crawler module for incremental catalog harvesting
//!
//! This module contains the crawl logic, including:
//! - The in-memory set of known ad IDs
//! - Listing page walking and link classification
//! - Detail page fetching with retry
//! - Batched writes to the store
//! - The per-session state machine and the restarting supervisor

mod buffer;
mod controller;
mod dedup;
mod fetcher;
mod retry;
mod supervisor;
mod walker;

#[cfg(test)]
mod testing;

pub use buffer::{WriteBuffer, DEFAULT_BATCH_SIZE};
pub use controller::{CrawlController, CrawlCursor, PageReport, Transition};
pub use dedup::DuplicateStore;
pub use fetcher::DetailFetcher;
pub use retry::{load_with_retry, RetryPolicy};
pub use supervisor::{DefaultSessionFactory, SessionFactory, Supervisor, SupervisorReport};
pub use walker::{Candidate, PageWalker, WalkReport};

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Sleeps for `duration` unless shutdown is requested first
///
/// # Returns
///
/// * `true` - The full duration elapsed
/// * `false` - The token was cancelled before or during the sleep
pub(crate) async fn sleep_or_cancel(shutdown: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
