//! Metadata cache (L1).
//!
//! A get-or-compute cache over a TTL'd key-value store, used by every other
//! component to memoize expensive lookups: existence checks, signed URLs,
//! known-cached hints. The cache is strictly an optimization — when the
//! backend is missing or unreachable every read degrades to a miss and every
//! write to a no-op, so no call path ever depends on it for correctness.

pub mod backend;
pub mod keys;
pub mod redis;

pub use backend::CacheBackend;
pub use keys::CacheKeys;
pub use redis::RedisBackend;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::config::RedisConfig;
use crate::error::Result;

/// Degrade-to-passthrough wrapper around an optional [`CacheBackend`].
///
/// Backend failures are logged and swallowed here, once, instead of at every
/// call site. Concurrent callers missing on the same key may all run their
/// `compute`; downstream writes are idempotent so the duplicate work is
/// wasted effort, not a bug.
#[derive(Clone)]
pub struct MetadataCache {
    backend: Option<Arc<dyn CacheBackend>>,
}

impl fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataCache")
            .field("enabled", &self.backend.is_some())
            .finish()
    }
}

impl MetadataCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A cache that always misses. Used when no backend is configured and
    /// as the fallback when connecting to one fails.
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Connect to the configured backend, degrading to a disabled cache if
    /// the backend is absent or unreachable.
    pub async fn connect(config: &RedisConfig) -> Self {
        match &config.url {
            Some(url) => match RedisBackend::connect(url).await {
                Ok(backend) => Self::new(Arc::new(backend)),
                Err(e) => {
                    warn!("Metadata cache unavailable, running uncached: {e}");
                    Self::disabled()
                }
            },
            None => {
                debug!("No Redis URL configured, metadata cache disabled");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Read a value. Backend errors and undeserializable entries are both
    /// treated as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let backend = self.backend.as_ref()?;

        match backend.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!("Cache HIT: {}", key);
                    Some(value)
                }
                Err(e) => {
                    warn!("Cache entry {} failed to deserialize, treating as miss: {e}", key);
                    None
                }
            },
            Ok(None) => {
                debug!("Cache MISS: {}", key);
                None
            }
            Err(e) => {
                warn!("Cache GET {} failed, treating as miss: {e}", key);
                None
            }
        }
    }

    /// Write a value with a TTL. Failures are logged and dropped.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cache SET {} skipped, serialization failed: {e}", key);
                return;
            }
        };

        if let Err(e) = backend.set(key, &raw, ttl).await {
            warn!("Cache SET {} failed: {e}", key);
        }
    }

    /// Invalidate a key. Failures are logged and dropped.
    pub async fn delete(&self, key: &str) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };

        if let Err(e) = backend.delete(key).await {
            warn!("Cache DELETE {} failed: {e}", key);
        }
    }

    /// Cache-aside read: return the cached value, or run `compute`, store
    /// its result under `key`, and return it.
    ///
    /// Errors from `compute` propagate untouched — only cache plumbing is
    /// swallowed.
    pub async fn get_or_set<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.get(key).await {
            return Ok(hit);
        }

        let value = compute().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }
}
