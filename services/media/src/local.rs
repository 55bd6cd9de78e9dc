//! Local filesystem storage backend

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::{
    error::{StorageError, StorageResult},
    kind::detect_content_type,
    storage::{MediaStorage, StoredObject},
};

const MAX_NAME_ATTEMPTS: u32 = 64;

/// Writes uploads into a content directory served under a public path.
///
/// File names are `<upload time in ms><original extension>`. Uploads that
/// land in the same millisecond get a `-<n>` suffix; an existing file is
/// never overwritten.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_path: String,
}

impl LocalStorage {
    /// Create the backend, making sure the content directory exists
    pub async fn new(
        root: impl Into<PathBuf>,
        public_path: impl Into<String>,
    ) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::Configuration(format!(
                "Failed to create upload directory '{}': {}",
                root.display(),
                e
            ))
        })?;

        info!(path = %root.display(), "Local storage initialized");

        Ok(Self {
            root,
            public_path: public_path.into().trim_end_matches('/').to_string(),
        })
    }

    /// Directory holding the stored files
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Extension of `original_name` including the dot, restricted to ASCII
/// alphanumerics so it can never escape the content directory.
pub(crate) fn safe_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 16 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Write `data` into a freshly created file. On failure the partial file is
/// removed so nothing half-written stays in the content directory.
async fn write_or_discard(mut file: fs::File, path: &Path, data: &[u8]) -> std::io::Result<()> {
    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        warn!("Discarding partial upload {}: {}", path.display(), e);
        drop(file);
        if let Err(remove_err) = fs::remove_file(path).await {
            warn!("Failed to remove {}: {}", path.display(), remove_err);
        }
        return Err(e);
    }

    Ok(())
}

#[async_trait]
impl MediaStorage for LocalStorage {
    async fn store(
        &self,
        data: Bytes,
        original_name: &str,
        content_type: Option<&str>,
    ) -> StorageResult<StoredObject> {
        let stamp = Utc::now().timestamp_millis();
        let extension = safe_extension(original_name);

        let mut attempt = 0;
        let (filename, file) = loop {
            let filename = match attempt {
                0 => format!("{}{}", stamp, extension),
                n => format!("{}-{}{}", stamp, n, extension),
            };
            let opened = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.root.join(&filename))
                .await;

            match opened {
                Ok(file) => break (filename, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };
        write_or_discard(file, &self.root.join(&filename), &data).await?;

        debug!(file = %filename, size = data.len(), "Stored upload on disk");

        Ok(StoredObject {
            reference: filename,
            content_type: detect_content_type(original_name, content_type),
            size: data.len(),
            detected_kind: None,
        })
    }

    fn resolve(&self, reference: &str) -> String {
        format!("{}/{}", self.public_path, reference)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
