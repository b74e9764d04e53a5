//! Transactional upload-then-cleanup on top of an [`ObjectSink`].

use crate::keys::resolve_key;
use crate::traits::{ObjectSink, UploadError, UploadResult, Uploader};
use async_trait::async_trait;
use stowage_core::{UploadReceipt, UploadRequest, UploaderBackend, UploaderConfig};
use tokio::fs;

/// Uploader backed by an object sink.
///
/// Owns the sink (and through it the backend client); only the [`Uploader`]
/// contract is exposed to artifact producers.
pub struct ArtifactUploader<S> {
    sink: S,
    key_pattern: String,
    storage_class: Option<&'static str>,
    keep_files: bool,
}

impl<S: ObjectSink> ArtifactUploader<S> {
    pub fn new(sink: S, key_pattern: impl Into<String>) -> Self {
        Self {
            sink,
            key_pattern: key_pattern.into(),
            storage_class: None,
            keep_files: false,
        }
    }

    /// Create an uploader using the key pattern, storage class and cleanup
    /// settings of `config`.
    pub fn from_config(sink: S, config: &UploaderConfig) -> Self {
        Self::new(sink, config.key_pattern.clone())
            .with_storage_class(config.storage_class())
            .with_keep_files(config.keep_files)
    }

    pub fn with_storage_class(mut self, storage_class: Option<&'static str>) -> Self {
        self.storage_class = storage_class;
        self
    }

    /// Keep local files after a successful upload instead of removing them.
    pub fn with_keep_files(mut self, keep_files: bool) -> Self {
        self.keep_files = keep_files;
        self
    }

    pub fn key_pattern(&self) -> &str {
        &self.key_pattern
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[async_trait]
impl<S: ObjectSink> Uploader for ArtifactUploader<S> {
    async fn upload(&self, request: &UploadRequest) -> UploadResult<UploadReceipt> {
        let path = request.path();

        let mut file = fs::File::open(path)
            .await
            .map_err(|source| UploadError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let key = resolve_key(&self.key_pattern, request);

        let transferred = self
            .sink
            .put_object(&key, &mut file, self.storage_class)
            .await;

        // Close the artifact before it is removed.
        drop(file);

        let size_bytes = transferred.map_err(|source| UploadError::Transfer {
            path: path.to_path_buf(),
            key: key.clone(),
            source,
        })?;

        if self.keep_files {
            return Ok(UploadReceipt {
                key,
                size_bytes,
                local_file_removed: false,
            });
        }

        fs::remove_file(path)
            .await
            .map_err(|source| UploadError::Cleanup {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(path = %path.display(), key = %key, "Removed uploaded artifact");

        Ok(UploadReceipt {
            key,
            size_bytes,
            local_file_removed: true,
        })
    }

    fn backend_type(&self) -> UploaderBackend {
        self.sink.backend_type()
    }
}
