//! SMTP delivery of alerts

use crate::alert::{AlertError, AlertSink};
use crate::config::AlertingConfig;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// Sends alerts as plain-text mail over STARTTLS
pub struct SmtpAlertSink {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpAlertSink {
    pub fn from_config(config: &AlertingConfig) -> Result<Self, AlertError> {
        let from: Mailbox = config.from_email.parse()?;
        let to: Mailbox = config.to_email.parse()?;

        let credentials = Credentials::new(config.from_email.clone(), config.password.clone());
        let transport = SmtpTransport::starttls_relay(&config.smtp_server)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }
}

impl AlertSink for SmtpAlertSink {
    fn send(&self, subject: &str, body: &str) -> Result<(), AlertError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.transport.send(&message)?;
        Ok(())
    }
}
