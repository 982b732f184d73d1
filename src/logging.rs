//! Logging setup
//!
//! Events go to up to four places: the console (filtered by verbosity), an
//! info log file, an error log file and, when alerting is configured, the
//! SMTP alert layer.

use crate::alert::build_alert_layer;
use crate::config::{AlertingConfig, LoggingConfig};
use crate::HarvestError;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Builds the console filter directives for the given verbosity
///
/// `level` applies to this crate when no `-v` flag is given; dependencies
/// only log warnings and errors.
pub fn console_directives(level: &str, verbose: u8, quiet: bool) -> String {
    if quiet {
        return "error".to_string();
    }
    match verbose {
        0 => format!("ad_harvest={},warn", level.to_ascii_lowercase()),
        1 => "ad_harvest=debug,info".to_string(),
        2 => "ad_harvest=trace,debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Installs the global tracing subscriber
///
/// Must be called once, before the first event is logged.
pub fn setup_logging(
    config: &LoggingConfig,
    verbose: u8,
    quiet: bool,
    alerting: Option<&AlertingConfig>,
) -> Result<(), HarvestError> {
    let console = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(EnvFilter::new(console_directives(
            &config.level,
            verbose,
            quiet,
        )));

    let info_file = match &config.info_file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(Path::new(path))?))
                .with_filter(LevelFilter::INFO),
        ),
        None => None,
    };

    let error_file = match &config.error_file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(Path::new(path))?))
                .with_filter(LevelFilter::ERROR),
        ),
        None => None,
    };

    let alerts = alerting.map(build_alert_layer).transpose()?;

    tracing_subscriber::registry()
        .with(console)
        .with(info_file)
        .with(error_file)
        .with(alerts)
        .try_init()
        .map_err(|e| HarvestError::Logging(e.to_string()))
}

/// Opens a log file for appending, creating its directory if needed
fn open_log_file(path: &Path) -> Result<File, HarvestError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}
