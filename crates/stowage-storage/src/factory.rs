#[cfg(feature = "storage-local")]
use crate::LocalSink;
#[cfg(feature = "storage-s3")]
use crate::S3Sink;
use crate::keys::unrecognized_tokens;
use crate::{DisabledUploader, UploadError, UploadResult, Uploader};
#[cfg(any(feature = "storage-s3", feature = "storage-local"))]
use crate::ArtifactUploader;
use std::sync::Arc;
use stowage_core::{UploaderBackend, UploaderConfig};

/// Create the process uploader based on configuration
///
/// Called once at startup; the returned uploader is shared by every artifact
/// producer. Without a configured endpoint the disabled uploader is returned.
/// Misconfiguration is reported as [`UploadError::Config`] and the caller
/// decides whether that is fatal.
pub async fn create_uploader(config: &UploaderConfig) -> UploadResult<Arc<dyn Uploader>> {
    if !config.is_enabled() {
        tracing::info!(backend = %config.backend, "Artifact uploads disabled");
        return Ok(Arc::new(DisabledUploader::new()));
    }

    config
        .validate()
        .map_err(|e| UploadError::Config(e.to_string()))?;

    for token in unrecognized_tokens(&config.key_pattern) {
        tracing::warn!(
            token = %token,
            key_pattern = %config.key_pattern,
            "Key pattern contains an unrecognized placeholder; it will be kept literally"
        );
    }

    match config.backend {
        #[cfg(feature = "storage-s3")]
        UploaderBackend::S3 => {
            let endpoint = config
                .endpoint
                .as_deref()
                .ok_or_else(|| UploadError::Config("S3_ENDPOINT not configured".to_string()))?;
            let bucket = config.bucket_name.as_deref().ok_or_else(|| {
                UploadError::Config("S3_BUCKET_NAME not configured".to_string())
            })?;

            let sink = S3Sink::new(
                endpoint,
                config.region.as_deref(),
                bucket,
                config.credentials(),
            )?;

            tracing::info!(
                endpoint = %endpoint,
                region = config.region.as_deref().unwrap_or_default(),
                bucket = %bucket,
                static_credentials = config.credentials().is_some(),
                key_pattern = %config.key_pattern,
                reduced_redundancy = config.reduced_redundancy,
                keep_files = config.keep_files,
                "Initialized S3 upload support"
            );

            Ok(Arc::new(ArtifactUploader::from_config(sink, config)))
        }

        #[cfg(not(feature = "storage-s3"))]
        UploaderBackend::S3 => Err(UploadError::Config(
            "S3 upload backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        UploaderBackend::Local => {
            let base_path = config.local_path.as_ref().ok_or_else(|| {
                UploadError::Config("LOCAL_UPLOAD_PATH not configured".to_string())
            })?;

            let sink = LocalSink::new(base_path).await?;

            tracing::info!(
                path = %base_path.display(),
                key_pattern = %config.key_pattern,
                keep_files = config.keep_files,
                "Initialized local upload support"
            );

            Ok(Arc::new(ArtifactUploader::from_config(sink, config)))
        }

        #[cfg(not(feature = "storage-local"))]
        UploaderBackend::Local => Err(UploadError::Config(
            "Local upload backend not available (storage-local feature not enabled)".to_string(),
        )),

        UploaderBackend::Disabled => Ok(Arc::new(DisabledUploader::new())),
    }
}
