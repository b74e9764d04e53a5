use crate::traits::{ObjectSink, SinkError, UploadError, UploadResult};
use async_trait::async_trait;
use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};
use stowage_core::UploaderBackend;
use tokio::fs;
use tokio::io::AsyncRead;

/// Local filesystem object sink
///
/// Stores each object as a file named by its key under a root directory.
/// Storage class hints are ignored.
#[derive(Clone, Debug)]
pub struct LocalSink {
    base_path: PathBuf,
}

impl LocalSink {
    /// Create a new LocalSink instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for uploaded objects (e.g., "/var/lib/stowage/artifacts")
    pub async fn new(base_path: impl Into<PathBuf>) -> UploadResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            UploadError::Config(format!(
                "Failed to create upload directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalSink { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert an object key to a filesystem path with security validation
    ///
    /// Rejects keys that are empty or could escape the base directory.
    fn key_to_path(&self, key: &str) -> Result<PathBuf, IoError> {
        if key.is_empty() || key.ends_with('/') {
            return Err(IoError::new(
                ErrorKind::InvalidInput,
                format!("Object key '{}' does not name a file", key),
            ));
        }

        if key.split('/').any(|segment| segment == "..") || key.starts_with('/') {
            return Err(IoError::new(
                ErrorKind::InvalidInput,
                format!("Object key '{}' resolves outside the upload directory", key),
            ));
        }

        Ok(self.base_path.join(key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> Result<(), IoError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectSink for LocalSink {
    async fn put_object(
        &self,
        key: &str,
        body: &mut (dyn AsyncRead + Send + Unpin),
        _storage_class: Option<&str>,
    ) -> Result<u64, SinkError> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            IoError::new(
                e.kind(),
                format!("Failed to create file {}: {}", path.display(), e),
            )
        })?;

        let bytes_copied = tokio::io::copy(body, &mut file).await.map_err(|e| {
            IoError::new(
                e.kind(),
                format!("Failed to write file {}: {}", path.display(), e),
            )
        })?;

        file.sync_all().await.map_err(|e| {
            IoError::new(
                e.kind(),
                format!("Failed to sync file {}: {}", path.display(), e),
            )
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local upload successful"
        );

        Ok(bytes_copied)
    }

    fn backend_type(&self) -> UploaderBackend {
        UploaderBackend::Local
    }
}
