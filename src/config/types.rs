use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Ad-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub alerting: Option<AlertingConfig>,
}

/// Where the catalog lives and how its listing pages are addressed
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogConfig {
    /// Site root, e.g. `https://kolesa.kz`
    pub base_url: String,

    /// Path of the paginated listing, joined onto `base_url`
    #[serde(default = "default_listing_path")]
    pub listing_path: String,

    /// Page index every crawl cycle begins at
    #[serde(default = "default_start_page")]
    pub start_page: u32,

    /// User agent sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Page-load timeouts and the retry discipline around them
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TimeoutConfig {
    /// Listing page load timeout (milliseconds)
    pub page_load: u64,

    /// Detail page load timeout (milliseconds)
    pub navigation: u64,

    /// Pause between failed load attempts (seconds)
    pub retry_sleep: u64,

    /// Attempts per page before the session is aborted
    pub max_attempts: u32,

    /// Whether detail pages get the same retry policy as listing pages
    pub retry_detail_pages: bool,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            page_load: 90_000,
            navigation: 60_000,
            retry_sleep: 10,
            max_attempts: 3,
            retry_detail_pages: true,
        }
    }
}

impl TimeoutConfig {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation)
    }

    pub fn retry_sleep(&self) -> Duration {
        Duration::from_secs(self.retry_sleep)
    }
}

/// Crawl pacing and batching
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// How long to wait once the catalog is caught up (seconds)
    pub sleep_interval: u64,

    /// Delay before a failed session is restarted (seconds)
    pub restart_delay: u64,

    /// Buffered records that trigger an automatic flush
    pub batch_size: usize,

    /// Lower bound of the random delay before each detail fetch (seconds)
    pub min_fetch_delay: u64,

    /// Upper bound of the random delay before each detail fetch (seconds)
    pub max_fetch_delay: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            sleep_interval: 7200,
            restart_delay: 30,
            batch_size: 20,
            min_fetch_delay: 1,
            max_fetch_delay: 5,
        }
    }
}

impl CrawlerConfig {
    pub fn sleep_interval(&self) -> Duration {
        Duration::from_secs(self.sleep_interval)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay)
    }
}

/// Durable store location
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

/// Log level and log file destinations
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoggingConfig {
    pub level: String,
    pub info_file: Option<String>,
    pub error_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            info_file: Some("logs/info.log".to_string()),
            error_file: Some("logs/error.log".to_string()),
        }
    }
}

/// SMTP settings for error alerts
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AlertingConfig {
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    pub from_email: String,
    pub to_email: String,
    pub password: String,

    #[serde(default = "default_alert_subject")]
    pub subject: String,
}

fn default_listing_path() -> String {
    "/cars/".to_string()
}

fn default_start_page() -> u32 {
    2
}

fn default_smtp_server() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_alert_subject() -> String {
    "Ошибка в приложении".to_string()
}
