//! Media storage backends for the gallery
//!
//! [`MediaStorage`] is the capability the upload path depends on. Exactly one
//! implementation is active per process, picked by [`config::build_storage`]
//! from [`config::StorageConfig`]:
//!
//! - [`local::LocalStorage`] writes into a content directory; references are
//!   file names resolved under a public path such as `/uploads`.
//! - [`s3::S3Storage`] uploads to a bucket; references are absolute URLs.

pub mod config;
pub mod error;
pub mod kind;
pub mod local;
pub mod s3;
pub mod storage;

pub use config::{StorageConfig, build_storage};
pub use error::{StorageError, StorageResult};
pub use kind::MediaKind;
pub use storage::{MediaStorage, StoredObject};
