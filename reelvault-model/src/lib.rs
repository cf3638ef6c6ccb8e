//! Shared data models for the Reelvault media catalog.
//!
//! This crate holds the plain types exchanged between the caching engine and
//! the rest of the application: remote image descriptors, TMDB size variants,
//! and the image kind taxonomy. No I/O lives here.
//!
//! ## Feature Flags
//!
//! - `serde`: derives `Serialize`/`Deserialize` on all public types

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Remote image descriptors and size variants
pub mod image;

pub use image::{MediaImageKind, RemoteImage, TmdbImageSize};
