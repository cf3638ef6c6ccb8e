//! Engine configuration.
//!
//! Every empirically-tuned knob (existence-flag TTL, known-cached hint TTL,
//! warmup pacing) is configuration rather than a constant; the right balance
//! depends on how often a deployment churns its artwork.

use config::{Config, Environment};
use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    pub redis: RedisConfig,
    pub storage: StorageConfig,
    pub images: ImageCacheConfig,
    pub warmup: WarmupConfig,
}

impl VaultConfig {
    /// Load configuration from `REELVAULT__`-prefixed environment variables,
    /// e.g. `REELVAULT__STORAGE__BUCKET=media`.
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("REELVAULT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

/// Metadata cache backend. Optional: with no URL configured the engine runs
/// uncached and every lookup goes to the real store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub bucket: String,
    /// Custom endpoint for S3-compatible stores (MinIO, R2, ...).
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Permit plain-http endpoints (local MinIO).
    pub allow_http: bool,
    /// Base URL the CDN serves objects under; unset disables public URLs.
    pub public_base_url: Option<String>,
    /// TTL for cached existence flags, positive and negative alike.
    pub exists_ttl_secs: u64,
    /// Safety margin subtracted from a signed URL's expiry before caching
    /// it, so a cached URL is never handed out past its real expiry.
    pub signed_url_margin_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            endpoint: None,
            region: None,
            access_key_id: None,
            secret_access_key: None,
            allow_http: false,
            public_base_url: None,
            exists_ttl_secs: 300,
            signed_url_margin_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageCacheConfig {
    pub origin_base_url: String,
    /// Leading segment of every object key minted for origin images.
    pub key_prefix: String,
    pub fetch_timeout_ms: u64,
    /// Additional attempts after the first, on transient failures only.
    pub retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
    /// TTL of the long-lived "known cached" hint.
    pub cached_hint_ttl_secs: u64,
    pub cache_control: String,
}

impl Default for ImageCacheConfig {
    fn default() -> Self {
        Self {
            origin_base_url: "https://image.tmdb.org/t/p".to_string(),
            key_prefix: "tmdb".to_string(),
            fetch_timeout_ms: 10_000,
            retries: 3,
            backoff_base_ms: 250,
            backoff_cap_ms: 8_000,
            cached_hint_ttl_secs: 86_400,
            cache_control: "public, max-age=31536000, immutable".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarmupConfig {
    pub concurrency: usize,
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
    /// TTL of "recently warmed" markers; zero disables skip tracking.
    pub skip_recently_warmed_ttl_secs: u64,
    pub batch_size: usize,
    /// Pause between batches, giving the CDN breathing room.
    pub batch_pause_ms: u64,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            timeout_ms: 10_000,
            retries: 2,
            backoff_base_ms: 500,
            backoff_cap_ms: 8_000,
            skip_recently_warmed_ttl_secs: 3_600,
            batch_size: 25,
            batch_pause_ms: 250,
        }
    }
}
