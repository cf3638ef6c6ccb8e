/// What a remote image depicts, as far as the cache cares.
///
/// Drives which size variants get mirrored and warmed; the catalog's own
/// richer image taxonomy maps down to this before calling the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MediaImageKind {
    /// 2:3 poster art
    Poster,
    /// 16:9 backdrop/banner art
    Backdrop,
    /// Episode still
    Still,
    /// Cast/person profile image
    Profile,
}
