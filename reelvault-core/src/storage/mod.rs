//! Object store gateway.
//!
//! Wraps the raw store behind the metadata cache: existence checks go through
//! TTL'd flags, signed URLs are memoized short of their real expiry, and
//! uploads can be skipped entirely when the stored content hash already
//! matches the new body.

pub mod backend;
pub mod key;
pub mod s3;

pub use backend::{CONTENT_HASH_META, ObjectHead, ObjectStoreBackend, UploadSpec};
pub use key::{join_key, normalize_key};
pub use s3::S3Backend;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::cache::{CacheKeys, MetadataCache};
use crate::config::StorageConfig;
use crate::error::Result;

#[derive(Clone)]
pub struct ObjectStorage {
    backend: Arc<dyn ObjectStoreBackend>,
    cache: MetadataCache,
    public_base_url: Option<String>,
    exists_ttl: Duration,
    signed_url_margin: Duration,
}

impl fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStorage")
            .field("cache", &self.cache)
            .field("public_base_url", &self.public_base_url)
            .field("exists_ttl", &self.exists_ttl)
            .field("signed_url_margin", &self.signed_url_margin)
            .finish()
    }
}

impl ObjectStorage {
    pub fn new(
        backend: Arc<dyn ObjectStoreBackend>,
        cache: MetadataCache,
        config: &StorageConfig,
    ) -> Self {
        Self {
            backend,
            cache,
            public_base_url: config.public_base_url.clone(),
            exists_ttl: Duration::from_secs(config.exists_ttl_secs),
            signed_url_margin: Duration::from_secs(config.signed_url_margin_secs),
        }
    }

    /// Existence check mediated by the cached flag.
    ///
    /// On a flag miss the real store is consulted and the result — present
    /// or absent — is cached for the configured TTL. The flag is a hint:
    /// callers that suspect staleness use [`exists_uncached`] instead.
    ///
    /// [`exists_uncached`]: ObjectStorage::exists_uncached
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let key = normalize_key(key);
        let backend = Arc::clone(&self.backend);

        self.cache
            .get_or_set(&CacheKeys::exists(&key), self.exists_ttl, || async move {
                Ok(backend.head(&key).await?.is_some())
            })
            .await
    }

    /// Existence check against the real store, bypassing the flag.
    pub async fn exists_uncached(&self, key: &str) -> Result<bool> {
        let key = normalize_key(key);
        Ok(self.backend.head(&key).await?.is_some())
    }

    /// HEAD the real store for size and recorded content hash.
    pub async fn head(&self, key: &str) -> Result<Option<ObjectHead>> {
        let key = normalize_key(key);
        self.backend.head(&key).await
    }

    /// Upload a body under `key`.
    ///
    /// With `skip_if_same_hash` set and a content hash in `spec`, a HEAD
    /// runs first and an identical stored hash turns the whole call into a
    /// no-op. After a real upload the existence flag is invalidated so the
    /// next `exists` re-derives truth instead of trusting a stale negative.
    pub async fn put(
        &self,
        key: &str,
        body: Bytes,
        spec: UploadSpec,
        skip_if_same_hash: bool,
    ) -> Result<()> {
        let key = normalize_key(key);

        if skip_if_same_hash
            && let Some(new_hash) = &spec.content_hash
            && let Some(head) = self.backend.head(&key).await?
            && head.content_hash.as_deref() == Some(new_hash.as_str())
        {
            debug!("Skipping upload of {}, stored hash matches", key);
            return Ok(());
        }

        self.backend.put(&key, body, &spec).await?;
        self.cache.delete(&CacheKeys::exists(&key)).await;
        Ok(())
    }

    /// Fetch and fully drain an object body.
    pub async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let key = normalize_key(key);
        self.backend.get(&key).await
    }

    /// Delete the object and invalidate its existence flag.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let key = normalize_key(key);
        self.backend.delete(&key).await?;
        self.cache.delete(&CacheKeys::exists(&key)).await;
        Ok(())
    }

    /// Time-limited access URL, memoized for `expires_in` minus the
    /// configured safety margin so a cached URL never outlives its real
    /// expiry. Expiries inside the margin bypass the cache entirely.
    pub async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        let key = normalize_key(key);
        let cache_ttl = expires_in.saturating_sub(self.signed_url_margin);

        if cache_ttl.is_zero() {
            return self.backend.signed_url(&key, expires_in).await;
        }

        let backend = Arc::clone(&self.backend);
        self.cache
            .get_or_set(&CacheKeys::signed_url(&key), cache_ttl, || async move {
                backend.signed_url(&key, expires_in).await
            })
            .await
    }

    /// Public (CDN) URL for an object key; pure and cache-free.
    ///
    /// Absolute inputs pass through unchanged, so the function is idempotent
    /// under repeated application. Returns `None` when no public base is
    /// configured.
    pub fn public_url(&self, key: &str) -> Option<String> {
        resolve_public_url(self.public_base_url.as_deref(), key)
    }

    /// Drop the cached existence flag and signed URL for `key`, e.g. after
    /// an out-of-band mutation. The CDN's own edge cache is the
    /// application's problem.
    pub async fn invalidate(&self, key: &str) {
        let key = normalize_key(key);
        self.cache.delete(&CacheKeys::exists(&key)).await;
        self.cache.delete(&CacheKeys::signed_url(&key)).await;
    }
}

fn resolve_public_url(base: Option<&str>, key: &str) -> Option<String> {
    // Already-public http(s) URLs pass through untouched. Other scheme-like
    // strings ("a:b/c.jpg") are ordinary keys and still get base-joined.
    if let Ok(parsed) = url::Url::parse(key)
        && matches!(parsed.scheme(), "http" | "https")
    {
        return Some(key.to_string());
    }

    let base = base?;
    Some(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        normalize_key(key)
    ))
}
