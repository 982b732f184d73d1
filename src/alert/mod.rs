//! Error alerting
//!
//! ERROR-level log events are forwarded to an [`AlertSink`] (SMTP by default)
//! so that failures of a long-running harvester reach an operator.

mod email;
mod layer;

pub use email::SmtpAlertSink;
pub use layer::AlertLayer;

use crate::config::AlertingConfig;
use thiserror::Error;

/// Errors that can occur while delivering an alert
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build alert message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Destination for alert messages
pub trait AlertSink: Send + Sync + 'static {
    fn send(&self, subject: &str, body: &str) -> Result<(), AlertError>;
}

/// Builds the tracing layer that mails every ERROR event
pub fn build_alert_layer(config: &AlertingConfig) -> Result<AlertLayer, AlertError> {
    let sink = SmtpAlertSink::from_config(config)?;
    Ok(AlertLayer::new(sink, config.subject.clone()))
}
