//! Pull-through remote media cache.
//!
//! Given a remote image descriptor, guarantees the corresponding object
//! exists in the object store, fetching from the origin only on a miss.
//! There is deliberately no per-key locking or request coalescing: two
//! callers racing for the same descriptor both fetch and both try to
//! upload, and the hash-gated `put` makes the second write a no-op. The
//! duplicate origin fetch is wasted work, never divergent state.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reelvault_model::{MediaImageKind, RemoteImage, TmdbImageSize};
use sha2::{Digest, Sha256};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::cache::{CacheKeys, MetadataCache};
use crate::config::ImageCacheConfig;
use crate::error::{Result, VaultError};
use crate::fetch::{
    FetchResponse, HttpFetcher, backoff_delay, is_transient_error, is_transient_status,
};
use crate::storage::{ObjectStorage, UploadSpec, join_key};

/// Content type assumed when the origin response does not declare one.
const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

/// Map a descriptor to its object key: `<prefix>/<size>/<file_path>`.
///
/// Pure and deterministic; every descriptor has exactly one key.
pub fn image_object_key(prefix: &str, image: &RemoteImage) -> String {
    join_key([prefix, image.size.as_str(), image.trimmed_path()])
}

/// Build the origin URL for a descriptor: `<base>/<size>/<file_path>`.
pub fn image_origin_url(base_url: &str, image: &RemoteImage) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        image.size.as_str(),
        image.trimmed_path()
    )
}

#[derive(Clone)]
pub struct RemoteImageCache {
    storage: Arc<ObjectStorage>,
    cache: MetadataCache,
    fetcher: Arc<dyn HttpFetcher>,
    config: ImageCacheConfig,
}

impl fmt::Debug for RemoteImageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteImageCache")
            .field("storage", &self.storage)
            .field("origin_base_url", &self.config.origin_base_url)
            .field("key_prefix", &self.config.key_prefix)
            .finish()
    }
}

impl RemoteImageCache {
    pub fn new(
        storage: Arc<ObjectStorage>,
        cache: MetadataCache,
        fetcher: Arc<dyn HttpFetcher>,
        config: ImageCacheConfig,
    ) -> Self {
        Self {
            storage,
            cache,
            fetcher,
            config,
        }
    }

    pub fn object_key(&self, image: &RemoteImage) -> String {
        image_object_key(&self.config.key_prefix, image)
    }

    pub fn origin_url(&self, image: &RemoteImage) -> String {
        image_origin_url(&self.config.origin_base_url, image)
    }

    /// Guarantee the object for `image` exists in the store and return its
    /// key. Idempotent and safe to call concurrently for the same
    /// descriptor.
    ///
    /// Fast path: a long-TTL "known cached" hint, verified against the real
    /// store before being trusted. A hint that turns out stale (object
    /// deleted out-of-band) is evicted and the slow path re-fetches, so
    /// drift between cache and store self-heals.
    pub async fn ensure_cached(&self, image: &RemoteImage) -> Result<String> {
        let object_key = self.object_key(image);
        let hint_key = CacheKeys::known_cached(&object_key);

        if self.cache.get::<bool>(&hint_key).await == Some(true) {
            if self.storage.exists_uncached(&object_key).await? {
                debug!("Image {} already mirrored, returning key", object_key);
                return Ok(object_key);
            }
            warn!(
                "Object {} missing despite cached hint, evicting hint and re-fetching",
                object_key
            );
            self.cache.delete(&hint_key).await;
        }

        let url = self.origin_url(image);
        let response = self.fetch_with_retry(&url).await?;

        let content_hash = hex::encode(Sha256::digest(&response.body));
        let spec = UploadSpec {
            content_type: response
                .content_type
                .or_else(|| Some(FALLBACK_CONTENT_TYPE.to_string())),
            cache_control: Some(self.config.cache_control.clone()),
            content_hash: Some(content_hash),
        };

        self.storage
            .put(&object_key, response.body, spec, true)
            .await?;
        self.cache
            .set(
                &hint_key,
                &true,
                Duration::from_secs(self.config.cached_hint_ttl_secs),
            )
            .await;

        Ok(object_key)
    }

    /// Mirror every recommended size variant for an image of the given
    /// kind. Per-variant results are returned individually so one failing
    /// variant does not lose the rest.
    pub async fn ensure_recommended(
        &self,
        file_path: &str,
        kind: &MediaImageKind,
    ) -> Vec<(TmdbImageSize, Result<String>)> {
        let mut results = Vec::new();
        for size in TmdbImageSize::recommended_for_kind(kind) {
            let image = RemoteImage::new(file_path, size);
            results.push((size, self.ensure_cached(&image).await));
        }
        results
    }

    /// Fetch with bounded timeout and retry on transient failures only.
    ///
    /// One attempt equals one timeout window; a timed-out attempt counts
    /// against the budget like any other transient failure. Non-retryable
    /// statuses and exhausted budgets surface as `OriginFetch` with the
    /// origin URL and last cause attached.
    async fn fetch_with_retry(&self, url: &str) -> Result<FetchResponse> {
        let timeout = Duration::from_millis(self.config.fetch_timeout_ms);
        let base = Duration::from_millis(self.config.backoff_base_ms);
        let cap = Duration::from_millis(self.config.backoff_cap_ms);
        let mut last_cause = String::new();

        for attempt in 0..=self.config.retries {
            if attempt > 0 {
                let delay = backoff_delay(base, attempt - 1, cap);
                debug!(
                    "Retrying origin fetch {} (attempt {}/{}) after {:?}",
                    url, attempt, self.config.retries, delay
                );
                sleep(delay).await;
            }

            match self.fetcher.fetch(url, timeout).await {
                Ok(response) if response.is_success() => {
                    // Truncated reads happen when the origin resets
                    // mid-body; treat them as transient.
                    if let Some(expected) = response.content_length
                        && response.body.len() as u64 != expected
                    {
                        last_cause = format!(
                            "short body: got {} bytes, expected {}",
                            response.body.len(),
                            expected
                        );
                        continue;
                    }
                    return Ok(response);
                }
                Ok(response) if is_transient_status(response.status) => {
                    last_cause = format!("HTTP {}", response.status);
                }
                Ok(response) => {
                    return Err(VaultError::OriginFetch {
                        url: url.to_string(),
                        reason: format!("HTTP {}", response.status),
                    });
                }
                Err(e) if is_transient_error(&e) => {
                    last_cause = e.to_string();
                }
                Err(e) => {
                    return Err(VaultError::OriginFetch {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(VaultError::OriginFetch {
            url: url.to_string(),
            reason: format!("retry budget exhausted, last cause: {last_cause}"),
        })
    }
}
