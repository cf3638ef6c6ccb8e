/// Cache key namespacing.
///
/// Keys are opaque to the backend; every component mints its keys through
/// here so namespaces never collide.
#[derive(Debug, Clone, Copy)]
pub struct CacheKeys;

impl CacheKeys {
    /// Existence flag for an object key.
    pub fn exists(object_key: &str) -> String {
        format!("exists:{object_key}")
    }

    /// Cached signed URL for an object key.
    pub fn signed_url(object_key: &str) -> String {
        format!("signed:{object_key}")
    }

    /// Long-TTL "known cached" hint set after a successful origin mirror.
    pub fn known_cached(object_key: &str) -> String {
        format!("cached:{object_key}")
    }

    /// "Recently warmed" marker for a public URL.
    pub fn warmed(url: &str) -> String {
        format!("warmed:{url}")
    }
}
