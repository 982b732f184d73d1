//! Fixed-interval retry around page loads

use crate::config::TimeoutConfig;
use crate::render::{PageRenderer, RenderRequest};
use crate::HarvestError;
use std::time::Duration;

/// How many times a page load is attempted and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &TimeoutConfig) -> Self {
        Self::new(config.max_attempts, config.retry_sleep())
    }

    /// One attempt, no retries
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Loads a page, retrying failed attempts with a fixed pause
///
/// # Returns
///
/// * `Ok(String)` - The rendered document from the first successful attempt
/// * `Err(HarvestError::PageLoadExhausted)` - Every attempt failed
pub async fn load_with_retry<R: PageRenderer + ?Sized>(
    renderer: &R,
    request: &RenderRequest,
    policy: RetryPolicy,
) -> Result<String, HarvestError> {
    let mut attempt = 1;

    loop {
        match renderer.render(request).await {
            Ok(html) => return Ok(html),
            Err(e) if attempt < policy.max_attempts => {
                tracing::warn!(
                    "Failed to load page {}: {}, attempt {} of {}",
                    request.url,
                    e,
                    attempt,
                    policy.max_attempts
                );
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(
                    "Failed to load page {} after {} attempts: {}",
                    request.url,
                    policy.max_attempts,
                    e
                );
                return Err(HarvestError::PageLoadExhausted {
                    url: request.url.to_string(),
                    attempts: policy.max_attempts,
                    source: e,
                });
            }
        }
    }
}
