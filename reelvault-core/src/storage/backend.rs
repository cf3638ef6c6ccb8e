use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Metadata key under which an object's hex SHA-256 body hash is stored.
pub const CONTENT_HASH_META: &str = "content-hash";

/// What a HEAD against the real store returns for a present object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    pub size: u64,
    /// Hex SHA-256 of the stored body, if the writer recorded one.
    pub content_hash: Option<String>,
}

/// Attributes attached to an uploaded object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSpec {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub content_hash: Option<String>,
}

/// Port over an S3-compatible object store.
///
/// "Not found" is a normal outcome on every read path and surfaces as
/// `Ok(None)`; only transport and auth failures come back as errors.
#[async_trait]
pub trait ObjectStoreBackend: Send + Sync {
    async fn head(&self, key: &str) -> Result<Option<ObjectHead>>;

    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    async fn put(&self, key: &str, body: Bytes, spec: &UploadSpec) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Presigned GET URL, expiring after `expires_in`.
    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String>;
}
