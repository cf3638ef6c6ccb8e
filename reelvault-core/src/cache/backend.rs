use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Key-value backend behind the metadata cache.
///
/// Values are opaque serialized strings; TTL enforcement belongs to the
/// store. Implementations must be safe to call concurrently through a
/// shared handle.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}
