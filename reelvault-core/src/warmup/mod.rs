//! CDN warmup engine.
//!
//! Given a batch of object keys known to exist, resolves their public URLs
//! and issues bounded-concurrency GETs so the CDN's edge nodes populate
//! their caches before real traffic arrives. Strictly best-effort: the
//! worst outcome of total failure is an uncached origin miss on first user
//! request, which is the baseline without warmup — so no per-URL failure
//! is ever allowed to be louder than a log line.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::join_all;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::cache::{CacheKeys, MetadataCache};
use crate::config::WarmupConfig;
use crate::fetch::{HttpFetcher, backoff_delay, is_transient_error, is_transient_status};
use crate::storage::ObjectStorage;

#[derive(Debug, Clone)]
pub struct WarmupOptions {
    pub concurrency: usize,
    pub timeout: Duration,
    pub retries: u32,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
    /// Zero disables recently-warmed tracking.
    pub skip_recently_warmed_ttl: Duration,
    pub batch_size: usize,
    pub batch_pause: Duration,
}

impl From<&WarmupConfig> for WarmupOptions {
    fn from(config: &WarmupConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            timeout: Duration::from_millis(config.timeout_ms),
            retries: config.retries,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            backoff_cap: Duration::from_millis(config.backoff_cap_ms),
            skip_recently_warmed_ttl: Duration::from_secs(
                config.skip_recently_warmed_ttl_secs,
            ),
            batch_size: config.batch_size,
            batch_pause: Duration::from_millis(config.batch_pause_ms),
        }
    }
}

/// Sweep summary. Informational only; sweeps log it and move on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WarmupReport {
    pub warmed: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug)]
enum WarmOutcome {
    Warmed,
    Skipped,
    Failed,
}

#[derive(Clone)]
pub struct CdnWarmer {
    storage: Arc<ObjectStorage>,
    cache: MetadataCache,
    fetcher: Arc<dyn HttpFetcher>,
}

impl fmt::Debug for CdnWarmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdnWarmer")
            .field("storage", &self.storage)
            .field("cache", &self.cache)
            .finish()
    }
}

impl CdnWarmer {
    pub fn new(
        storage: Arc<ObjectStorage>,
        cache: MetadataCache,
        fetcher: Arc<dyn HttpFetcher>,
    ) -> Self {
        Self {
            storage,
            cache,
            fetcher,
        }
    }

    /// Warm the given object keys through the CDN.
    ///
    /// Keys are deduplicated and resolved to public URLs; keys with no
    /// public URL cannot be warmed and are dropped silently. URLs are
    /// processed in fixed-size batches with a pause in between, each batch
    /// fanned out over a worker pool of `opts.concurrency`: a shared cursor
    /// hands the next URL to whichever worker frees up first, so one slow
    /// URL never strands the rest of the pool.
    pub async fn warm(
        &self,
        keys: impl IntoIterator<Item = String>,
        opts: &WarmupOptions,
    ) -> WarmupReport {
        let urls: Vec<String> = keys
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|key| self.storage.public_url(&key))
            .collect();

        if urls.is_empty() {
            debug!("Warmup sweep had no resolvable targets");
            return WarmupReport::default();
        }

        let warmed = Arc::new(AtomicUsize::new(0));
        let skipped = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));

        let batch_size = opts.batch_size.max(1);
        let batches: Vec<&[String]> = urls.chunks(batch_size).collect();
        let batch_count = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            let batch = Arc::new(batch.to_vec());
            let cursor = Arc::new(AtomicUsize::new(0));
            let workers = opts.concurrency.max(1).min(batch.len());

            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let warmer = self.clone();
                    let batch = Arc::clone(&batch);
                    let cursor = Arc::clone(&cursor);
                    let warmed = Arc::clone(&warmed);
                    let skipped = Arc::clone(&skipped);
                    let failed = Arc::clone(&failed);
                    let opts = opts.clone();

                    tokio::spawn(async move {
                        loop {
                            let next = cursor.fetch_add(1, Ordering::SeqCst);
                            let Some(url) = batch.get(next) else {
                                break;
                            };
                            match warmer.warm_one(url, &opts).await {
                                WarmOutcome::Warmed => {
                                    warmed.fetch_add(1, Ordering::Relaxed)
                                }
                                WarmOutcome::Skipped => {
                                    skipped.fetch_add(1, Ordering::Relaxed)
                                }
                                WarmOutcome::Failed => {
                                    failed.fetch_add(1, Ordering::Relaxed)
                                }
                            };
                        }
                    })
                })
                .collect();

            join_all(handles).await;

            if index + 1 < batch_count && !opts.batch_pause.is_zero() {
                sleep(opts.batch_pause).await;
            }
        }

        let report = WarmupReport {
            warmed: warmed.load(Ordering::Relaxed),
            skipped: skipped.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
        };
        info!(
            "Warmup sweep finished: {} warmed, {} skipped, {} failed",
            report.warmed, report.skipped, report.failed
        );
        report
    }

    /// Warm a single URL, retrying transient failures. Every failure mode
    /// ends in a log line, never an error: one bad URL must not abort the
    /// batch.
    async fn warm_one(&self, url: &str, opts: &WarmupOptions) -> WarmOutcome {
        let track_recent = !opts.skip_recently_warmed_ttl.is_zero();
        let marker_key = CacheKeys::warmed(url);

        if track_recent && self.cache.get::<bool>(&marker_key).await == Some(true) {
            debug!("Skipping recently warmed {}", url);
            return WarmOutcome::Skipped;
        }

        let mut last_cause = String::new();

        for attempt in 0..=opts.retries {
            if attempt > 0 {
                sleep(backoff_delay(opts.backoff_base, attempt - 1, opts.backoff_cap))
                    .await;
            }

            match self.fetcher.fetch(url, opts.timeout).await {
                Ok(response)
                    if response.is_success() || response.status == 304 =>
                {
                    if track_recent {
                        self.cache
                            .set(&marker_key, &true, opts.skip_recently_warmed_ttl)
                            .await;
                    }
                    return WarmOutcome::Warmed;
                }
                Ok(response) if is_transient_status(response.status) => {
                    last_cause = format!("HTTP {}", response.status);
                }
                Ok(response) => {
                    warn!("Warmup of {} failed: HTTP {}", url, response.status);
                    return WarmOutcome::Failed;
                }
                Err(e) if is_transient_error(&e) => {
                    last_cause = e.to_string();
                }
                Err(e) => {
                    warn!("Warmup of {} failed: {e}", url);
                    return WarmOutcome::Failed;
                }
            }
        }

        warn!(
            "Warmup of {} exhausted its retry budget, last cause: {}",
            url, last_cause
        );
        WarmOutcome::Failed
    }
}
