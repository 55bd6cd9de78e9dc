//! API models for request and response payloads

pub mod bookmark;
pub mod media;

pub use bookmark::Bookmark;
pub use media::{MediaItem, MediaResponse, MediaWithOwner, NewMedia};
