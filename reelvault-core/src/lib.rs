//! # Reelvault Core
//!
//! Remote-media caching and CDN warmup engine for the Reelvault media
//! catalog: a content-addressed pull-through cache that mirrors third-party
//! poster/backdrop images into S3-compatible object storage, tracks their
//! presence through a layered metadata cache, and proactively warms a CDN's
//! edge copies.
//!
//! ## Architecture
//!
//! Four components, composed bottom-up:
//!
//! - [`cache`]: get-or-compute metadata cache (L1) over an optional Redis
//!   backend, degrading to passthrough when the backend is absent
//! - [`storage`]: object store gateway with cached existence flags,
//!   hash-gated deduplicating uploads, and memoized signed URLs
//! - [`images`]: pull-through cache turning a remote image descriptor into
//!   a guaranteed-present object key, with retry/backoff against the origin
//! - [`warmup`]: bounded-concurrency CDN warmer for keys already mirrored
//!
//! Clients are explicitly constructed and injected; [`MediaVault`] is the
//! composition root wiring production backends together from
//! [`config::VaultConfig`].
//!
//! ## Example
//!
//! ```no_run
//! use reelvault_core::{MediaVault, config::VaultConfig};
//! use reelvault_model::{RemoteImage, TmdbImageSize};
//!
//! async fn mirror_poster() -> reelvault_core::error::Result<()> {
//!     let vault = MediaVault::connect(&VaultConfig::load()?).await?;
//!
//!     let poster = RemoteImage::new("/abc.jpg", TmdbImageSize::PosterW500);
//!     let key = vault.images.ensure_cached(&poster).await?;
//!
//!     let report = vault
//!         .warmer
//!         .warm([key], &vault.warmup_options())
//!         .await;
//!     println!("warmed {} objects", report.warmed);
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Metadata cache (L1) and its backends
pub mod cache;

/// Engine configuration
pub mod config;

/// Error types and result alias
pub mod error;

/// Outbound HTTP port and retry policy
pub mod fetch;

/// Pull-through remote media cache
pub mod images;

/// Object store gateway
pub mod storage;

/// CDN warmup engine
pub mod warmup;

use std::fmt;
use std::sync::Arc;

use crate::cache::MetadataCache;
use crate::config::VaultConfig;
use crate::error::Result;
use crate::fetch::ReqwestFetcher;
use crate::images::RemoteImageCache;
use crate::storage::{ObjectStorage, S3Backend};
use crate::warmup::{CdnWarmer, WarmupOptions};

pub use crate::error::VaultError;

/// Composition root owning the production wiring of all four components.
#[derive(Clone)]
pub struct MediaVault {
    pub storage: Arc<ObjectStorage>,
    pub images: RemoteImageCache,
    pub warmer: CdnWarmer,
    config: VaultConfig,
}

impl fmt::Debug for MediaVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaVault")
            .field("storage", &self.storage)
            .finish()
    }
}

impl MediaVault {
    /// Wire up Redis (optional), the S3 backend, and a shared HTTP client.
    pub async fn connect(config: &VaultConfig) -> Result<Self> {
        let cache = MetadataCache::connect(&config.redis).await;
        let backend = Arc::new(S3Backend::from_config(&config.storage)?);
        let fetcher = Arc::new(ReqwestFetcher::new()?);

        let storage = Arc::new(ObjectStorage::new(
            backend,
            cache.clone(),
            &config.storage,
        ));
        let images = RemoteImageCache::new(
            Arc::clone(&storage),
            cache.clone(),
            fetcher.clone(),
            config.images.clone(),
        );
        let warmer = CdnWarmer::new(Arc::clone(&storage), cache, fetcher);

        Ok(Self {
            storage,
            images,
            warmer,
            config: config.clone(),
        })
    }

    /// Warmup options derived from configuration.
    pub fn warmup_options(&self) -> WarmupOptions {
        WarmupOptions::from(&self.config.warmup)
    }
}
