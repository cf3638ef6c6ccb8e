//! Outbound HTTP port and the shared retry/backoff policy.
//!
//! Both the pull-through cache and the warmup engine issue raw GETs; they
//! share one port so tests can swap in instrumented fakes, and one
//! classification of which failures are worth retrying.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use reqwest::header::ACCEPT_ENCODING;

use crate::error::{Result, VaultError};

/// A fully drained HTTP response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// Declared `Content-Length`, when the origin sent one.
    pub content_length: Option<u64>,
    pub body: Bytes,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Port for outbound GETs with a hard per-call timeout.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse>;
}

/// Production fetcher over a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl fmt::Debug for ReqwestFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestFetcher")
            .field("client", &self.client)
            .finish()
    }
}

impl ReqwestFetcher {
    /// Timeouts are per call, so the client itself carries none.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            // Avoid compressed, range-susceptible responses for binary assets
            .header(ACCEPT_ENCODING, "identity")
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let content_length = response.content_length();
        let body = response.bytes().await?;

        Ok(FetchResponse {
            status,
            content_type,
            content_length,
            body,
        })
    }
}

/// Statuses worth another attempt: rate limiting and server-side failures.
pub fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Transport failures worth another attempt: timeouts and dropped
/// connections. Anything else (TLS, malformed URL, ...) will not get better
/// by itself.
pub fn is_transient_error(error: &VaultError) -> bool {
    match error {
        VaultError::Http(e) => e.is_timeout() || e.is_connect(),
        _ => false,
    }
}

/// Exponential backoff with jitter: `base * 2^attempt`, capped, plus up to
/// half of that again at random so synchronized retries fan out.
pub fn backoff_delay(base: Duration, attempt: u32, cap: Duration) -> Duration {
    let exp = base.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX));
    let capped = exp.min(cap);
    let jitter_ms = if capped.as_millis() > 0 {
        rand::rng().random_range(0..=capped.as_millis() as u64 / 2)
    } else {
        0
    };
    capped + Duration::from_millis(jitter_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_caps() {
        let base = Duration::from_millis(100);
        let cap = Duration::from_millis(800);

        for attempt in 0..10 {
            let delay = backoff_delay(base, attempt, cap);
            let capped = (base * 2u32.pow(attempt.min(4))).min(cap);
            assert!(delay >= capped, "attempt {attempt}: {delay:?} < {capped:?}");
            // Never more than cap plus half-cap of jitter.
            assert!(delay <= cap + cap / 2, "attempt {attempt}: {delay:?}");
        }
    }

    #[test]
    fn transient_status_classification() {
        assert!(is_transient_status(429));
        assert!(is_transient_status(500));
        assert!(is_transient_status(503));
        assert!(!is_transient_status(404));
        assert!(!is_transient_status(200));
        assert!(!is_transient_status(304));
        assert!(!is_transient_status(403));
    }
}
