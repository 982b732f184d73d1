//! Ad-Harvest main entry point
//!
//! This is the command-line interface for the Ad-Harvest catalog crawler.

use ad_harvest::config::{load_config_with_hash, Config};
use ad_harvest::crawler::{DefaultSessionFactory, Supervisor};
use ad_harvest::logging::setup_logging;
use ad_harvest::storage::{open_storage, AdStore};
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Ad-Harvest: an incremental classified-ad harvester
///
/// Walks the catalog page by page, stores every ad it has not seen before and
/// starts over from the first page once it reaches ads it already knows.
#[derive(Parser, Debug)]
#[command(name = "ad-harvest")]
#[command(version = "1.0.0")]
#[command(about = "An incremental classified-ad harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    if cli.dry_run {
        return handle_dry_run(&config, &config_hash);
    }
    if cli.stats {
        return handle_stats(&config);
    }

    setup_logging(
        &config.logging,
        cli.verbose,
        cli.quiet,
        config.alerting.as_ref(),
    )?;
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    handle_crawl(config).await
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    println!("=== Ad-Harvest Dry Run ===\n");

    println!("Catalog:");
    println!("  Base URL: {}", config.catalog.base_url);
    println!("  Listing path: {}", config.catalog.listing_path);
    println!("  Start page: {}", config.catalog.start_page);

    println!("\nTimeouts:");
    println!("  Listing page load: {}ms", config.timeouts.page_load);
    println!("  Detail navigation: {}ms", config.timeouts.navigation);
    println!(
        "  Attempts per page: {} ({}s apart)",
        config.timeouts.max_attempts, config.timeouts.retry_sleep
    );

    println!("\nCrawler:");
    println!("  Batch size: {}", config.crawler.batch_size);
    println!("  Sleep when caught up: {}s", config.crawler.sleep_interval);
    println!("  Restart delay: {}s", config.crawler.restart_delay);
    println!(
        "  Courtesy delay: {}-{}s",
        config.crawler.min_fetch_delay, config.crawler.max_fetch_delay
    );

    println!("\nDatabase: {}", config.database.path);
    match &config.alerting {
        Some(alerting) => println!(
            "Alerts: {} via {}:{}",
            alerting.to_email, alerting.smtp_server, alerting.smtp_port
        ),
        None => println!("Alerts: disabled"),
    }

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.database.path);

    let storage = open_storage(Path::new(&config.database.path))?;

    println!("Stored ads: {}", storage.count_ads()?);
    match storage.latest_ingested_at()? {
        Some(at) => println!("Last ingested: {}", at.to_rfc3339()),
        None => println!("Last ingested: never"),
    }

    Ok(())
}

/// Runs crawl sessions until Ctrl-C
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested, stopping after the current step");
            signal_token.cancel();
        }
    });

    tracing::info!(
        "Starting harvest of {}{} from page {}",
        config.catalog.base_url,
        config.catalog.listing_path,
        config.catalog.start_page
    );

    let report = Supervisor::new(config, DefaultSessionFactory, shutdown)
        .run()
        .await;

    tracing::info!(
        "Harvest stopped: {} sessions, {} failed",
        report.sessions,
        report.failures
    );
    Ok(())
}
