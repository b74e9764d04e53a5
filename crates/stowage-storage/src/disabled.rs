use crate::traits::{UploadError, UploadResult, Uploader};
use async_trait::async_trait;
use stowage_core::{UploadReceipt, UploadRequest, UploaderBackend};

/// Uploader used when no storage backend is configured.
///
/// Lets artifact producers call the uploader unconditionally: every upload
/// fails with [`UploadError::NotInitialized`] without touching the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledUploader;

impl DisabledUploader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Uploader for DisabledUploader {
    async fn upload(&self, _request: &UploadRequest) -> UploadResult<UploadReceipt> {
        Err(UploadError::NotInitialized)
    }

    fn backend_type(&self) -> UploaderBackend {
        UploaderBackend::Disabled
    }
}
