//! Shared fakes and rig builders for the integration tests.
//!
//! All fakes instrument their call counts with atomics so tests can assert
//! on real interaction counts (origin fetches, store writes, in-flight
//! concurrency) instead of on observable side effects alone.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reelvault_core::cache::{CacheBackend, MetadataCache};
use reelvault_core::config::{ImageCacheConfig, StorageConfig};
use reelvault_core::error::{Result, VaultError};
use reelvault_core::fetch::{FetchResponse, HttpFetcher};
use reelvault_core::storage::{ObjectHead, ObjectStorage, ObjectStoreBackend, UploadSpec};

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

// ---------------------------------------------------------------------------
// Metadata cache fakes

/// In-memory TTL-honoring cache backend.
#[derive(Debug, Default)]
pub struct MemoryCacheBackend {
    entries: Mutex<HashMap<String, (String, Option<Instant>)>>,
    pub get_calls: AtomicUsize,
    pub set_calls: AtomicUsize,
}

impl MemoryCacheBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a raw (possibly garbage) serialized value, bypassing serde.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), None));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((_, Some(expiry))) if *expiry <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        let expiry = Instant::now().checked_add(ttl);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), expiry));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// A backend whose every call fails, standing in for an unreachable Redis.
#[derive(Debug, Default)]
pub struct FailingCacheBackend;

#[async_trait]
impl CacheBackend for FailingCacheBackend {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(VaultError::Internal("cache backend unreachable".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Err(VaultError::Internal("cache backend unreachable".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(VaultError::Internal("cache backend unreachable".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Object store fake

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub spec: UploadSpec,
}

/// In-memory object store with call counters.
#[derive(Debug, Default)]
pub struct MemoryStoreBackend {
    objects: Mutex<HashMap<String, StoredObject>>,
    pub head_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub put_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub signed_url_calls: AtomicUsize,
}

impl MemoryStoreBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, key: &str, body: Bytes, content_hash: Option<String>) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body,
                spec: UploadSpec {
                    content_hash,
                    ..Default::default()
                },
            },
        );
    }

    pub fn remove(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn stored(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStoreBackend for MemoryStoreBackend {
    async fn head(&self, key: &str) -> Result<Option<ObjectHead>> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.objects.lock().unwrap().get(key).map(|object| ObjectHead {
            size: object.body.len() as u64,
            content_hash: object.spec.content_hash.clone(),
        }))
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .map(|object| object.body.clone()))
    }

    async fn put(&self, key: &str, body: Bytes, spec: &UploadSpec) -> Result<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body,
                spec: spec.clone(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        self.signed_url_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://signed.example.com/{key}?expires={}",
            expires_in.as_secs()
        ))
    }
}

// ---------------------------------------------------------------------------
// HTTP fetcher fakes

/// Origin fake that fails a scripted number of times, then succeeds.
#[derive(Debug)]
pub struct ScriptedFetcher {
    fail_times: usize,
    fail_status: u16,
    /// Calls (after the failures) that declare the full `Content-Length`
    /// but deliver only half the body, as an origin resetting mid-transfer
    /// does.
    short_reads: usize,
    body: Bytes,
    content_type: Option<String>,
    pub calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(fail_times: usize, fail_status: u16, body: Bytes) -> Arc<Self> {
        Arc::new(Self {
            fail_times,
            fail_status,
            short_reads: 0,
            body,
            content_type: Some("image/jpeg".to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn succeeding(body: Bytes) -> Arc<Self> {
        Self::new(0, 0, body)
    }

    /// Responds with `status` forever.
    pub fn always(status: u16) -> Arc<Self> {
        Self::new(usize::MAX, status, Bytes::new())
    }

    /// Truncates the first `times` responses, then delivers `body` whole.
    pub fn short_reads(times: usize, body: Bytes) -> Arc<Self> {
        Arc::new(Self {
            fail_times: 0,
            fail_status: 0,
            short_reads: times,
            body,
            content_type: Some("image/jpeg".to_string()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl HttpFetcher for ScriptedFetcher {
    async fn fetch(&self, _url: &str, _timeout: Duration) -> Result<FetchResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_times {
            return Ok(FetchResponse {
                status: self.fail_status,
                content_type: None,
                content_length: None,
                body: Bytes::new(),
            });
        }
        if call < self.fail_times + self.short_reads {
            return Ok(FetchResponse {
                status: 200,
                content_type: self.content_type.clone(),
                content_length: Some(self.body.len() as u64),
                body: self.body.slice(0..self.body.len() / 2),
            });
        }
        Ok(FetchResponse {
            status: 200,
            content_type: self.content_type.clone(),
            content_length: Some(self.body.len() as u64),
            body: self.body.clone(),
        })
    }
}

/// Fetcher that tracks live in-flight requests, for concurrency-bound
/// assertions. Every request sleeps briefly so overlap actually happens.
#[derive(Debug, Default)]
pub struct CountingFetcher {
    delay: Duration,
    fail_urls: Mutex<HashSet<String>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Default::default()
        })
    }

    /// Make requests to `url` respond 404.
    pub fn fail_url(&self, url: &str) {
        self.fail_urls.lock().unwrap().insert(url.to_string());
    }
}

#[async_trait]
impl HttpFetcher for CountingFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<FetchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let live = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(live, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let status = if self.fail_urls.lock().unwrap().contains(url) {
            404
        } else {
            200
        };
        Ok(FetchResponse {
            status,
            content_type: None,
            content_length: None,
            body: Bytes::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Rig builders

pub fn memory_cache() -> (MetadataCache, Arc<MemoryCacheBackend>) {
    let backend = MemoryCacheBackend::new();
    (MetadataCache::new(backend.clone()), backend)
}

pub fn storage_config(public_base_url: Option<&str>) -> StorageConfig {
    StorageConfig {
        bucket: "media".to_string(),
        public_base_url: public_base_url.map(str::to_string),
        ..Default::default()
    }
}

pub fn test_storage(
    backend: Arc<MemoryStoreBackend>,
    cache: MetadataCache,
    public_base_url: Option<&str>,
) -> Arc<ObjectStorage> {
    Arc::new(ObjectStorage::new(
        backend,
        cache,
        &storage_config(public_base_url),
    ))
}

/// Image cache config with near-instant backoff so retry tests stay fast.
pub fn image_config(retries: u32) -> ImageCacheConfig {
    ImageCacheConfig {
        retries,
        backoff_base_ms: 1,
        backoff_cap_ms: 4,
        ..Default::default()
    }
}
