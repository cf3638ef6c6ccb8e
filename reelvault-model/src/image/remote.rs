use std::fmt::Display;
use std::fmt::Formatter;

use crate::image::sizes::TmdbImageSize;

/// Descriptor for one image at the origin: a TMDB file path plus the size
/// variant to fetch.
///
/// TMDB hands out file paths with a leading slash (`/abc.jpg`); the
/// descriptor keeps whatever it was given and exposes [`trimmed_path`]
/// for URL and key building.
///
/// [`trimmed_path`]: RemoteImage::trimmed_path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemoteImage {
    pub file_path: String,
    pub size: TmdbImageSize,
}

impl RemoteImage {
    pub fn new(file_path: impl Into<String>, size: TmdbImageSize) -> Self {
        Self {
            file_path: file_path.into(),
            size,
        }
    }

    /// The file path without any leading slashes.
    pub fn trimmed_path(&self) -> &str {
        self.file_path.trim_start_matches('/')
    }
}

impl Display for RemoteImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.size.as_str(), self.trimmed_path())
    }
}
