use crate::config::types::{
    AlertingConfig, CatalogConfig, Config, CrawlerConfig, DatabaseConfig, LoggingConfig,
    TimeoutConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_timeout_config(&config.timeouts)?;
    validate_crawler_config(&config.crawler)?;
    validate_database_config(&config.database)?;
    validate_logging_config(&config.logging)?;
    if let Some(alerting) = &config.alerting {
        validate_alerting_config(alerting)?;
    }
    Ok(())
}

/// Validates catalog configuration
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    url.join(&config.listing_path).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid listing_path '{}': {}",
            config.listing_path, e
        ))
    })?;

    if config.start_page < 1 {
        return Err(ConfigError::Validation(format!(
            "start_page must be >= 1, got {}",
            config.start_page
        )));
    }

    Ok(())
}

/// Validates timeout and retry configuration
fn validate_timeout_config(config: &TimeoutConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.page_load == 0 || config.navigation == 0 {
        return Err(ConfigError::Validation(
            "page_load and navigation timeouts must be non-zero".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler pacing configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    if config.min_fetch_delay > config.max_fetch_delay {
        return Err(ConfigError::Validation(format!(
            "min_fetch_delay ({}s) cannot exceed max_fetch_delay ({}s)",
            config.min_fetch_delay, config.max_fetch_delay
        )));
    }

    Ok(())
}

/// Validates database configuration
fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "database path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the log level name
fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.level.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::Validation(format!(
            "Unknown log level '{}'",
            config.level
        )));
    }
    Ok(())
}

/// Validates alerting configuration
fn validate_alerting_config(config: &AlertingConfig) -> Result<(), ConfigError> {
    if config.smtp_server.is_empty() {
        return Err(ConfigError::Validation(
            "smtp_server cannot be empty".to_string(),
        ));
    }

    validate_email("from_email", &config.from_email)?;
    validate_email("to_email", &config.to_email)?;

    Ok(())
}

/// Basic email validation
fn validate_email(field: &str, email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid {} format: '{}'",
            field, email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid {} domain: '{}'",
            field, email
        )));
    }

    Ok(())
}
