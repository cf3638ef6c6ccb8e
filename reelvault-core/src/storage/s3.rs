use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, GetOptions, ObjectStore, PutOptions};

use crate::config::StorageConfig;
use crate::error::Result;
use crate::storage::backend::{
    CONTENT_HASH_META, ObjectHead, ObjectStoreBackend, UploadSpec,
};

/// S3-compatible backend over `object_store`'s AWS implementation.
///
/// Works against AWS proper as well as MinIO/R2 style endpoints; the client
/// is stateless per call and shared across the whole engine.
#[derive(Clone)]
pub struct S3Backend {
    store: AmazonS3,
}

impl fmt::Debug for S3Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Backend")
            .field("store", &"AmazonS3")
            .finish()
    }
}

impl S3Backend {
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_allow_http(config.allow_http);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }
        if let Some(access_key_id) = &config.access_key_id {
            builder = builder.with_access_key_id(access_key_id);
        }
        if let Some(secret) = &config.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }

        Ok(Self {
            store: builder.build()?,
        })
    }
}

#[async_trait]
impl ObjectStoreBackend for S3Backend {
    async fn head(&self, key: &str) -> Result<Option<ObjectHead>> {
        // A plain HEAD does not surface attributes, so issue a headless GET
        // with `head: true` to read the content-hash metadata alongside the
        // object's size.
        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        match self.store.get_opts(&Path::from(key), options).await {
            Ok(result) => {
                let content_hash = result
                    .attributes
                    .get(&Attribute::Metadata(CONTENT_HASH_META.into()))
                    .map(|value| value.to_string());
                Ok(Some(ObjectHead {
                    size: result.meta.size,
                    content_hash,
                }))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        match self.store.get(&Path::from(key)).await {
            Ok(result) => Ok(Some(result.bytes().await?)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, body: Bytes, spec: &UploadSpec) -> Result<()> {
        let mut attributes = Attributes::new();
        if let Some(content_type) = &spec.content_type {
            attributes.insert(Attribute::ContentType, content_type.clone().into());
        }
        if let Some(cache_control) = &spec.cache_control {
            attributes.insert(Attribute::CacheControl, cache_control.clone().into());
        }
        if let Some(content_hash) = &spec.content_hash {
            attributes.insert(
                Attribute::Metadata(CONTENT_HASH_META.into()),
                content_hash.clone().into(),
            );
        }

        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(&Path::from(key), body.into(), options)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match self.store.delete(&Path::from(key)).await {
            Ok(()) => Ok(()),
            // Deleting an absent object is a no-op, not a failure.
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        let url = self
            .store
            .signed_url(Method::GET, &Path::from(key), expires_in)
            .await?;
        Ok(url.to_string())
    }
}
