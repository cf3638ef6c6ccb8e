//! Object key normalization.
//!
//! An object key is a slash-joined path with no leading or trailing slashes
//! and no empty segments. The key is the sole identity of a stored object,
//! so every entry point normalizes before touching the store or the cache.

/// Join path segments into a normalized object key.
///
/// Each segment may itself contain slashes; empty pieces are dropped.
pub fn join_key<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    segments
        .into_iter()
        .flat_map(|segment| segment.split('/'))
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalize a raw key. Idempotent: normalizing a normalized key is a no-op.
pub fn normalize_key(raw: &str) -> String {
    join_key([raw])
}
