pub mod kind;
pub mod remote;
pub mod sizes;

pub use kind::MediaImageKind;
pub use remote::RemoteImage;
pub use sizes::TmdbImageSize;
