//! Uploader abstraction traits
//!
//! This module defines the `Uploader` contract exposed to artifact producers and
//! the `ObjectSink` seam that concrete storage backends implement.

use std::path::PathBuf;

use async_trait::async_trait;
use stowage_core::{UploadReceipt, UploadRequest, UploaderBackend};
use thiserror::Error;
use tokio::io::AsyncRead;

/// Error reported by a storage backend while writing an object.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Upload operation errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// Invalid configuration detected while initializing a backend.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upload attempted on the disabled backend.
    #[error("Uploader is not initialized")]
    NotInitialized,

    #[error("Failed to open file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to upload {} as {key}: {source}", path.display())]
    Transfer {
        path: PathBuf,
        key: String,
        #[source]
        source: SinkError,
    },

    /// The transfer succeeded but the local file could not be removed.
    #[error("Failed to remove uploaded file {}: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    /// Whether the error only means uploads are not configured.
    ///
    /// Callers usually treat this as a no-op rather than a failure.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, UploadError::NotInitialized)
    }
}

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Uploader contract
///
/// Exactly one uploader is constructed at process start and shared by every
/// artifact producer. Implementations are safe to call concurrently: their
/// configuration is fixed at construction and each call owns its local file
/// until it returns.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload one finished artifact.
    ///
    /// Resolves the object key, streams the file to the backend and removes the
    /// local copy unless the uploader keeps files. Every failure is returned to
    /// the caller; nothing is retried.
    async fn upload(&self, request: &UploadRequest) -> UploadResult<UploadReceipt>;

    /// Get the uploader backend type
    fn backend_type(&self) -> UploaderBackend;

    /// Whether uploads reach a storage backend at all
    fn is_enabled(&self) -> bool {
        self.backend_type() != UploaderBackend::Disabled
    }
}

/// Object storage seam used by `ArtifactUploader`.
///
/// A sink writes one object per call. Retries, multipart transfers and
/// timeouts are the concern of the underlying client.
#[async_trait]
pub trait ObjectSink: Send + Sync {
    /// Write the whole `body` under `key`, returning the number of bytes written.
    ///
    /// `storage_class` is a backend storage tier hint such as `REDUCED_REDUNDANCY`;
    /// backends without tiers ignore it.
    async fn put_object(
        &self,
        key: &str,
        body: &mut (dyn AsyncRead + Send + Unpin),
        storage_class: Option<&str>,
    ) -> Result<u64, SinkError>;

    fn backend_type(&self) -> UploaderBackend;
}
