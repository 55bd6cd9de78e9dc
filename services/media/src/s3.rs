//! Remote object storage backend (S3 and S3-compatible providers)

use async_trait::async_trait;
use aws_sdk_s3::{Client, primitives::ByteStream};
use bytes::Bytes;
use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{StorageError, StorageResult},
    kind::{MediaKind, detect_content_type},
    local::safe_extension,
    storage::{MediaStorage, StoredObject},
};

/// Uploads objects to a bucket and references them by their public URL
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    key_prefix: String,
    public_base_url: String,
}

impl S3Storage {
    pub fn new(
        client: Client,
        bucket: impl Into<String>,
        key_prefix: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key_prefix: key_prefix.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Object key for a new upload
    fn object_key(&self, original_name: &str) -> String {
        format!(
            "{}{}-{}{}",
            self.key_prefix,
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            safe_extension(original_name)
        )
    }

    /// Fully-qualified URL of an object key
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

/// Default virtual-hosted URL for a bucket on AWS
pub fn default_public_base_url(bucket: &str, region: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com", bucket, region)
}

#[async_trait]
impl MediaStorage for S3Storage {
    async fn store(
        &self,
        data: Bytes,
        original_name: &str,
        content_type: Option<&str>,
    ) -> StorageResult<StoredObject> {
        let key = self.object_key(original_name);
        let content_type = detect_content_type(original_name, content_type);
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(&content_type)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload {} to bucket {}: {}", key, self.bucket, e);
                StorageError::Remote(e.to_string())
            })?;

        info!("Uploaded {} ({} bytes, {}) to {}", key, size, content_type, self.bucket);

        Ok(StoredObject {
            reference: self.object_url(&key),
            detected_kind: Some(MediaKind::from_content_type(&content_type)),
            content_type,
            size,
        })
    }

    /// References are already absolute URLs
    fn resolve(&self, reference: &str) -> String {
        reference.to_string()
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region, retry::RetryConfig};
    use axum::http::{HeaderMap, StatusCode, Uri, header::CONTENT_TYPE};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(String, Option<String>)>>>;

    /// S3-compatible endpoint on a loopback port that accepts every PutObject
    /// and records the path and content type it was sent.
    async fn mock_endpoint() -> (String, Seen) {
        let seen: Seen = Arc::default();
        let recorded = seen.clone();
        let app = axum::Router::new().fallback(
            move |uri: Uri, headers: HeaderMap, _body: axum::body::Bytes| {
                let recorded = recorded.clone();
                async move {
                    let content_type = headers
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    recorded
                        .lock()
                        .unwrap()
                        .push((uri.path().to_string(), content_type));
                    (StatusCode::OK, [("etag", "\"mock\"")])
                }
            },
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), seen)
    }

    /// Loopback address nothing listens on
    async fn dead_endpoint() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    fn storage_at(endpoint: &str) -> S3Storage {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "test"))
            .endpoint_url(endpoint)
            .force_path_style(true)
            .retry_config(RetryConfig::disabled())
            .build();
        S3Storage::new(
            Client::from_conf(config),
            "gallery",
            "uploads/",
            "https://cdn.example.com",
        )
    }

    fn storage(prefix: &str, base: &str) -> S3Storage {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-west-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "test"))
            .build();
        S3Storage::new(Client::from_conf(config), "gallery", prefix, base)
    }

    #[test]
    fn default_url_is_virtual_hosted() {
        assert_eq!(
            default_public_base_url("gallery", "eu-west-1"),
            "https://gallery.s3.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn object_keys_keep_prefix_and_extension() {
        let storage = storage("uploads/", "https://cdn.example.com/");
        let key = storage.object_key("clip.MP4");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with(".mp4"));
        assert_ne!(key, storage.object_key("clip.MP4"));
    }

    #[test]
    fn references_are_http_urls_and_resolve_to_themselves() {
        let storage = storage("", "https://cdn.example.com/");
        let url = storage.object_url("123-abc.png");
        assert_eq!(url, "https://cdn.example.com/123-abc.png");
        assert!(url.starts_with("http"));
        assert_eq!(storage.resolve(&url), url);
    }

    #[tokio::test]
    async fn store_puts_object_and_returns_https_reference() {
        let (endpoint, seen) = mock_endpoint().await;
        let storage = storage_at(&endpoint);

        let stored = storage
            .store(Bytes::from_static(b"0123456789"), "cat.png", None)
            .await
            .unwrap();

        assert!(stored.reference.starts_with("https://cdn.example.com/uploads/"));
        assert!(stored.reference.ends_with(".png"));
        assert_eq!(stored.size, 10);
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.detected_kind, Some(MediaKind::Image));
        assert_eq!(storage.resolve(&stored.reference), stored.reference);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (path, content_type) = &seen[0];
        assert!(path.starts_with("/gallery/uploads/"));
        assert_eq!(content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn store_detects_video_from_extension() {
        let (endpoint, _) = mock_endpoint().await;
        let storage = storage_at(&endpoint);

        let stored = storage
            .store(Bytes::from_static(b"not really"), "clip.mp4", None)
            .await
            .unwrap();

        assert_eq!(stored.content_type, "video/mp4");
        assert_eq!(stored.detected_kind, Some(MediaKind::Video));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_remote_error() {
        let storage = storage_at(&dead_endpoint().await);

        let err = storage
            .store(Bytes::from_static(b"0123456789"), "cat.png", None)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Remote(_)), "{err:?}");
    }
}
