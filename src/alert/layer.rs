//! Tracing layer that turns ERROR events into alerts
//!
//! Delivery happens on a dedicated thread behind a bounded channel, so a slow
//! or unreachable mail server never stalls the crawl. When the channel is full
//! the alert is dropped and counted. The dispatcher reports the count after
//! each delivery, when the queue has been idle for a while, and on shutdown.

use crate::alert::AlertSink;
use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Pending alerts kept before new ones are dropped
const ALERT_QUEUE_CAPACITY: usize = 64;

/// How often an idle dispatcher checks for dropped alerts
const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(5);

pub struct AlertLayer {
    sender: SyncSender<String>,
    dropped: Arc<AtomicU64>,
}

impl AlertLayer {
    /// Starts the dispatcher thread that delivers alerts through `sink`
    pub fn new<S: AlertSink>(sink: S, subject: String) -> Self {
        let (sender, receiver) = mpsc::sync_channel::<String>(ALERT_QUEUE_CAPACITY);
        let dropped = Arc::new(AtomicU64::new(0));
        let dispatcher_dropped = Arc::clone(&dropped);

        let spawned = std::thread::Builder::new()
            .name("alert-dispatcher".to_string())
            .spawn(move || dispatch(receiver, &sink, &subject, &dispatcher_dropped));
        // The subscriber is not installed yet, so stderr is the only outlet
        if let Err(e) = spawned {
            eprintln!("Failed to start alert dispatcher: {}", e);
        }

        Self { sender, dropped }
    }
}

/// Delivers queued alerts until every sender is gone
fn dispatch<S: AlertSink>(
    receiver: Receiver<String>,
    sink: &S,
    subject: &str,
    dropped: &AtomicU64,
) {
    loop {
        match receiver.recv_timeout(IDLE_CHECK_INTERVAL) {
            Ok(body) => deliver(sink, subject, &body),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                report_dropped(sink, subject, dropped);
                return;
            }
        }
        report_dropped(sink, subject, dropped);
    }
}

fn deliver<S: AlertSink>(sink: &S, subject: &str, body: &str) {
    if let Err(e) = sink.send(subject, body) {
        tracing::warn!("Failed to deliver error alert: {}", e);
    }
}

/// Tells the operator about alerts lost to a full queue
fn report_dropped<S: AlertSink>(sink: &S, subject: &str, dropped: &AtomicU64) {
    let lost = dropped.swap(0, Ordering::Relaxed);
    if lost > 0 {
        tracing::warn!("{} error alerts dropped, alert queue was full", lost);
        let body = format!(
            "{} error alerts were dropped because the alert queue was full",
            lost
        );
        deliver(sink, subject, &body);
    }
}

impl<S: Subscriber> Layer<S> for AlertLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() != Level::ERROR {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let body = format!(
            "{} ERROR {}: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            metadata.target(),
            visitor.finish()
        );

        match self.sender.try_send(body) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            // Dispatcher is gone; nothing left to deliver to
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// Collects the message and fields of an event into one line
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}
