//! Storage backend capability
//!
//! A backend durably persists an uploaded byte stream and hands back an
//! opaque reference. The catalog stores that reference verbatim and asks the
//! same backend to turn it into a public locator when serving responses.

use async_trait::async_trait;
use bytes::Bytes;

use crate::{error::StorageResult, kind::MediaKind};

/// Result of a successful store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    /// Opaque reference to record in the catalog
    pub reference: String,
    /// Content type the object was stored with
    pub content_type: String,
    /// Number of bytes persisted
    pub size: usize,
    /// Media kind inferred by the backend, if it infers one
    pub detected_kind: Option<MediaKind>,
}

/// Trait for pluggable media storage backends.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Persist `data` and return a reference to it.
    ///
    /// # Arguments
    ///
    /// * `data` - The uploaded file contents
    /// * `original_name` - File name supplied by the client, used for its extension
    /// * `content_type` - Content type declared by the client, if any
    async fn store(
        &self,
        data: Bytes,
        original_name: &str,
        content_type: Option<&str>,
    ) -> StorageResult<StoredObject>;

    /// Map a reference produced by [`MediaStorage::store`] to a public locator
    fn resolve(&self, reference: &str) -> String;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}
