//! Ad detail page fetcher
//!
//! Loads the detail page of one new ad and turns it into an [`AdRecord`].

use crate::ad::AdRecord;
use crate::config::Config;
use crate::crawler::retry::{load_with_retry, RetryPolicy};
use crate::crawler::walker::Candidate;
use crate::extract::{extract_details, DETAIL_READY_SELECTOR};
use crate::render::{PageRenderer, RenderRequest};
use crate::HarvestError;
use chrono::Utc;
use rand::Rng;
use std::time::Duration;

/// Fetches and extracts ad detail pages
#[derive(Debug, Clone)]
pub struct DetailFetcher {
    timeout: Duration,
    retry: RetryPolicy,
    /// Courtesy delay bounds, in milliseconds
    delay_ms: (u64, u64),
}

impl DetailFetcher {
    pub fn new(
        timeout: Duration,
        retry: RetryPolicy,
        min_delay: Duration,
        max_delay: Duration,
    ) -> Self {
        let min = min_delay.as_millis() as u64;
        let max = (max_delay.as_millis() as u64).max(min);
        Self {
            timeout,
            retry,
            delay_ms: (min, max),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let retry = if config.timeouts.retry_detail_pages {
            RetryPolicy::from_config(&config.timeouts)
        } else {
            RetryPolicy::single_attempt()
        };

        Self::new(
            config.timeouts.navigation_timeout(),
            retry,
            Duration::from_secs(config.crawler.min_fetch_delay),
            Duration::from_secs(config.crawler.max_fetch_delay),
        )
    }

    /// Waits a random courtesy delay, loads the ad page and extracts it
    ///
    /// The record carries the candidate's canonical URL and the extraction time.
    pub async fn fetch<R: PageRenderer + ?Sized>(
        &self,
        renderer: &R,
        candidate: &Candidate,
    ) -> Result<AdRecord, HarvestError> {
        let delay = self.courtesy_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let request =
            RenderRequest::new(candidate.url.clone(), self.timeout).wait_for(DETAIL_READY_SELECTOR);
        let html = load_with_retry(renderer, &request, self.retry).await?;

        tracing::debug!("Extracted ad {} from {}", candidate.id, candidate.url);

        Ok(AdRecord {
            id: candidate.id.clone(),
            url: candidate.url.to_string(),
            details: extract_details(&html),
            ingested_at: Utc::now(),
        })
    }

    fn courtesy_delay(&self) -> Duration {
        let (min, max) = self.delay_ms;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ad::{AdId, UNAVAILABLE};
    use crate::crawler::testing::{detail_page, FakeRenderer};
    use url::Url;

    fn candidate(id: &str) -> Candidate {
        Candidate {
            id: AdId::new(id),
            url: Url::parse(&format!("https://kolesa.kz/a/show/{}", id)).unwrap(),
        }
    }

    fn fetcher(retry: RetryPolicy) -> DetailFetcher {
        DetailFetcher::new(Duration::from_secs(1), retry, Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_fetch_builds_record() {
        let renderer =
            FakeRenderer::new().with_page("https://kolesa.kz/a/show/7", &detail_page("Kia Rio"));

        let before = Utc::now();
        let record = fetcher(RetryPolicy::single_attempt())
            .fetch(&renderer, &candidate("7"))
            .await
            .unwrap();

        assert_eq!(record.id, AdId::new("7"));
        assert_eq!(record.url, "https://kolesa.kz/a/show/7");
        assert_eq!(record.details.title, "Kia Rio");
        assert_eq!(record.details.color, UNAVAILABLE);
        assert!(record.ingested_at >= before);
    }

    #[tokio::test]
    async fn test_detail_page_is_retried_when_enabled() {
        let url = "https://kolesa.kz/a/show/8";
        let renderer = FakeRenderer::new()
            .with_page(url, &detail_page("Kia Rio"))
            .fail_times(url, 1);

        let record = fetcher(RetryPolicy::new(3, Duration::ZERO))
            .fetch(&renderer, &candidate("8"))
            .await
            .unwrap();
        assert_eq!(record.details.title, "Kia Rio");
        assert_eq!(renderer.loads_of(url), 2);
    }

    #[tokio::test]
    async fn test_detail_failure_propagates() {
        let url = "https://kolesa.kz/a/show/9";
        let renderer = FakeRenderer::new().fail_always(url);

        let err = fetcher(RetryPolicy::single_attempt())
            .fetch(&renderer, &candidate("9"))
            .await
            .unwrap_err();
        assert!(matches!(err, HarvestError::PageLoadExhausted { .. }));
    }

    #[test]
    fn test_courtesy_delay_within_bounds() {
        let fetcher = DetailFetcher::new(
            Duration::from_secs(1),
            RetryPolicy::single_attempt(),
            Duration::from_secs(1),
            Duration::from_secs(5),
        );
        for _ in 0..50 {
            let delay = fetcher.courtesy_delay();
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_secs(5));
        }
    }
}
