//! Session supervisor
//!
//! Opens a crawl session, runs it until it fails, tears it down and starts a
//! fresh one after a short delay. Only a shutdown request ends the loop.

use crate::config::Config;
use crate::crawler::controller::CrawlController;
use crate::crawler::{sleep_or_cancel, DuplicateStore};
use crate::render::{build_http_client, HttpRenderer, PageRenderer};
use crate::storage::{open_storage, AdStore, SqliteStorage};
use crate::HarvestError;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Acquires the resources one crawl session runs on
///
/// Everything returned here is dropped when the session ends, whether it
/// stopped cleanly or failed.
pub trait SessionFactory {
    type Renderer: PageRenderer;
    type Store: AdStore;

    fn open(&self, config: &Config) -> Result<(Self::Renderer, Self::Store), HarvestError>;
}

/// Fetches over HTTP and stores ads in the configured SQLite database
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSessionFactory;

impl SessionFactory for DefaultSessionFactory {
    type Renderer = HttpRenderer;
    type Store = SqliteStorage;

    fn open(&self, config: &Config) -> Result<(HttpRenderer, SqliteStorage), HarvestError> {
        let client = build_http_client(config.catalog.user_agent.as_deref())?;
        let storage = open_storage(Path::new(&config.database.path))?;
        Ok((HttpRenderer::new(client), storage))
    }
}

/// Totals across the lifetime of a supervisor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorReport {
    /// Sessions started
    pub sessions: u32,

    /// Sessions that ended in an error
    pub failures: u32,
}

/// Keeps crawl sessions running until shutdown
pub struct Supervisor<F> {
    config: Config,
    factory: F,
    shutdown: CancellationToken,
}

impl<F: SessionFactory> Supervisor<F> {
    pub fn new(config: Config, factory: F, shutdown: CancellationToken) -> Self {
        Self {
            config,
            factory,
            shutdown,
        }
    }

    /// Runs sessions back to back until the shutdown token is cancelled
    ///
    /// Session errors are logged and followed by the restart delay; they
    /// never escape this loop.
    pub async fn run(&self) -> SupervisorReport {
        let mut report = SupervisorReport::default();
        let restart_delay = self.config.crawler.restart_delay();

        while !self.shutdown.is_cancelled() {
            report.sessions += 1;

            if let Err(e) = self.run_session().await {
                report.failures += 1;
                tracing::error!("Error in main loop: {}", e);

                if !sleep_or_cancel(&self.shutdown, restart_delay).await {
                    break;
                }
                tracing::info!("Restarting crawl session");
            }
        }

        tracing::info!(
            "Supervisor stopped after {} sessions ({} failed)",
            report.sessions,
            report.failures
        );
        report
    }

    async fn run_session(&self) -> Result<(), HarvestError> {
        let (renderer, store) = self.factory.open(&self.config)?;

        let known = DuplicateStore::seed(&store)?;
        tracing::info!("Loaded {} known ad IDs", known.len());

        let mut controller = CrawlController::new(
            &self.config,
            renderer,
            store,
            known,
            self.shutdown.clone(),
        )?;
        controller.run().await
    }
}
