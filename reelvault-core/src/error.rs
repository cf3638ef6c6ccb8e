use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache backend error: {0}")]
    CacheBackend(#[from] redis::RedisError),

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Retry budget exhausted or a non-retryable origin response.
    ///
    /// Carries the origin URL so callers can log it and substitute a
    /// placeholder; this means "image unavailable now", not corruption.
    #[error("Failed to fetch {url} from origin: {reason}")]
    OriginFetch { url: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;
