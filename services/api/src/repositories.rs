//! Repositories for database operations

pub mod bookmark;
pub mod media;

pub use bookmark::BookmarkRepository;
pub use media::MediaRepository;
