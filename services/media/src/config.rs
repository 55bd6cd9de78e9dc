//! Storage backend selection
//!
//! The backend is chosen once at startup: a configured bucket selects the
//! remote backend, otherwise uploads go to the local content directory.

use aws_config::{BehaviorVersion, Region};
use std::{env, path::PathBuf, sync::Arc};
use tracing::info;

use crate::{
    error::StorageResult,
    local::LocalStorage,
    s3::{S3Storage, default_public_base_url},
    storage::MediaStorage,
};

/// Local backend settings
#[derive(Debug, Clone, PartialEq)]
pub struct LocalStorageConfig {
    /// Directory uploads are written to
    pub upload_dir: PathBuf,
    /// Public path the directory is served under
    pub public_path: String,
}

/// Remote backend settings
#[derive(Debug, Clone, PartialEq)]
pub struct S3StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers
    pub endpoint: Option<String>,
    pub public_base_url: String,
    pub key_prefix: String,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    Local(LocalStorageConfig),
    S3(S3StorageConfig),
}

impl StorageConfig {
    /// Create a new StorageConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MEDIA_BUCKET_NAME`: selects the remote backend when set
    /// - `MEDIA_BUCKET_REGION`: bucket region (default: "us-east-1")
    /// - `MEDIA_BUCKET_ENDPOINT`: custom endpoint for S3-compatible providers
    /// - `MEDIA_PUBLIC_BASE_URL`: URL prefix for stored objects (default: AWS virtual-hosted URL)
    /// - `MEDIA_KEY_PREFIX`: object key prefix (default: "uploads/")
    /// - `UPLOAD_DIR`: local upload directory (default: "uploads")
    /// - `UPLOAD_PUBLIC_PATH`: public path for local uploads (default: "/uploads")
    pub fn from_env() -> Self {
        let bucket = env::var("MEDIA_BUCKET_NAME").ok().filter(|b| !b.is_empty());

        match bucket {
            Some(bucket) => {
                let region =
                    env::var("MEDIA_BUCKET_REGION").unwrap_or_else(|_| "us-east-1".to_string());
                let endpoint = env::var("MEDIA_BUCKET_ENDPOINT").ok().filter(|e| !e.is_empty());
                let public_base_url = env::var("MEDIA_PUBLIC_BASE_URL")
                    .ok()
                    .filter(|u| !u.is_empty())
                    .unwrap_or_else(|| match &endpoint {
                        Some(endpoint) => {
                            format!("{}/{}", endpoint.trim_end_matches('/'), bucket)
                        }
                        None => default_public_base_url(&bucket, &region),
                    });
                let key_prefix =
                    env::var("MEDIA_KEY_PREFIX").unwrap_or_else(|_| "uploads/".to_string());

                StorageConfig::S3(S3StorageConfig {
                    bucket,
                    region,
                    endpoint,
                    public_base_url,
                    key_prefix,
                })
            }
            None => StorageConfig::Local(LocalStorageConfig {
                upload_dir: env::var("UPLOAD_DIR")
                    .unwrap_or_else(|_| "uploads".to_string())
                    .into(),
                public_path: env::var("UPLOAD_PUBLIC_PATH")
                    .unwrap_or_else(|_| "/uploads".to_string()),
            }),
        }
    }
}

/// Build the configured backend
pub async fn build_storage(config: &StorageConfig) -> StorageResult<Arc<dyn MediaStorage>> {
    match config {
        StorageConfig::Local(local) => {
            let storage = LocalStorage::new(&local.upload_dir, local.public_path.clone()).await?;
            info!(
                "Using local storage in {} served at {}",
                local.upload_dir.display(),
                local.public_path
            );
            Ok(Arc::new(storage))
        }
        StorageConfig::S3(remote) => {
            let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(remote.region.clone()))
                .load()
                .await;

            let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
            if let Some(endpoint) = &remote.endpoint {
                builder = builder.endpoint_url(endpoint).force_path_style(true);
            }
            let client = aws_sdk_s3::Client::from_conf(builder.build());

            info!(
                "Using S3 storage in bucket {} ({})",
                remote.bucket, remote.public_base_url
            );
            Ok(Arc::new(S3Storage::new(
                client,
                remote.bucket.clone(),
                remote.key_prefix.clone(),
                remote.public_base_url.clone(),
            )))
        }
    }
}
