use std::fmt::Display;
use std::fmt::Formatter;

use crate::image::kind::MediaImageKind;

/// TMDB image size variants
///
/// The variant name doubles as the path segment in origin URLs
/// (`https://image.tmdb.org/t/p/<size>/<file_path>`) and in object-store
/// keys, so two variants that render the same segment (e.g. `PosterW300`
/// and `BackdropW300`) address the same stored object.
#[derive(Debug, Clone, Copy, PartialEq, Hash, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TmdbImageSize {
    // Poster sizes
    PosterW92,
    PosterW154,
    PosterW185,
    PosterW300,
    PosterW342,
    PosterW500,
    PosterW780,
    // Backdrop sizes
    BackdropW300,
    BackdropW780,
    BackdropW1280,
    // Still sizes
    StillW92,
    StillW185,
    StillW300,
    StillW500,
    // Profile sizes
    ProfileW45,
    ProfileW185,
    ProfileH632,
    // Original
    Original,
}

impl TmdbImageSize {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TmdbImageSize::PosterW92 => "w92",
            TmdbImageSize::PosterW154 => "w154",
            TmdbImageSize::PosterW185 => "w185",
            TmdbImageSize::PosterW300 => "w300",
            TmdbImageSize::PosterW342 => "w342",
            TmdbImageSize::PosterW500 => "w500",
            TmdbImageSize::PosterW780 => "w780",
            TmdbImageSize::BackdropW300 => "w300",
            TmdbImageSize::BackdropW780 => "w780",
            TmdbImageSize::BackdropW1280 => "w1280",
            TmdbImageSize::StillW92 => "w92",
            TmdbImageSize::StillW185 => "w185",
            TmdbImageSize::StillW300 => "w300",
            TmdbImageSize::StillW500 => "w500",
            TmdbImageSize::ProfileW45 => "w45",
            TmdbImageSize::ProfileW185 => "w185",
            TmdbImageSize::ProfileH632 => "h632",
            TmdbImageSize::Original => "original",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "w92" => Some(TmdbImageSize::PosterW92),
            "w154" => Some(TmdbImageSize::PosterW154),
            "w185" => Some(TmdbImageSize::PosterW185),
            "w300" => Some(TmdbImageSize::PosterW300),
            "w342" => Some(TmdbImageSize::PosterW342),
            "w500" => Some(TmdbImageSize::PosterW500),
            "w780" => Some(TmdbImageSize::PosterW780),
            "w1280" => Some(TmdbImageSize::BackdropW1280),
            "h632" => Some(TmdbImageSize::ProfileH632),
            "w45" => Some(TmdbImageSize::ProfileW45),
            "original" => Some(TmdbImageSize::Original),
            _ => None,
        }
    }

    /// Sizes worth mirroring and warming for each image kind.
    ///
    /// Ordered by priority: the first entry is what above-the-fold UI
    /// requests, the rest are fallbacks for high-DPI or detail views.
    pub fn recommended_for_kind(kind: &MediaImageKind) -> Vec<Self> {
        match kind {
            MediaImageKind::Poster => vec![
                TmdbImageSize::PosterW300,
                TmdbImageSize::PosterW500,
                TmdbImageSize::PosterW185,
            ],
            MediaImageKind::Backdrop => vec![TmdbImageSize::BackdropW1280],
            MediaImageKind::Still => {
                vec![TmdbImageSize::StillW300, TmdbImageSize::StillW500]
            }
            MediaImageKind::Profile => vec![TmdbImageSize::ProfileW185],
        }
    }
}

impl Display for TmdbImageSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
