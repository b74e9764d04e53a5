use crate::traits::{ObjectSink, SinkError, UploadError, UploadResult};
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore};
use std::sync::Arc;
use stowage_core::UploaderBackend;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// S3 object sink
///
/// Streams artifacts to an S3 bucket (or an S3-compatible provider) through
/// `object_store`. The client is private to the sink.
#[derive(Clone)]
pub struct S3Sink {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl S3Sink {
    /// Create a new S3Sink instance
    ///
    /// # Arguments
    /// * `endpoint_url` - Endpoint URL, e.g. "http://localhost:9000" for MinIO.
    ///   Plain HTTP is allowed only for `http://` endpoints.
    /// * `region` - Region identifier; the client default is used when `None`
    /// * `bucket` - Bucket name
    /// * `credentials` - Static access/secret key pair. When `None` credentials
    ///   are taken from the environment (env vars, instance metadata, ...).
    pub fn new(
        endpoint_url: &str,
        region: Option<&str>,
        bucket: &str,
        credentials: Option<(&str, &str)>,
    ) -> UploadResult<Self> {
        let allow_http = endpoint_url.starts_with("http://");
        if !allow_http && !endpoint_url.starts_with("https://") {
            return Err(UploadError::Config(format!(
                "S3 endpoint must be an http:// or https:// URL, got '{}'",
                endpoint_url
            )));
        }
        if bucket.is_empty() {
            return Err(UploadError::Config("S3 bucket name is empty".to_string()));
        }

        let mut builder = AmazonS3Builder::from_env()
            .with_endpoint(endpoint_url)
            .with_allow_http(allow_http)
            .with_bucket_name(bucket);

        if let Some(region) = region {
            builder = builder.with_region(region);
        }

        if let Some((access_key, secret_key)) = credentials {
            builder = builder
                .with_access_key_id(access_key)
                .with_secret_access_key(secret_key);
        }

        let store = builder
            .build()
            .map_err(|e| UploadError::Config(e.to_string()))?;

        Ok(Self::with_store(Arc::new(store), bucket))
    }

    /// Create a sink over an already configured object store.
    pub fn with_store(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        S3Sink {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn abort(&self, writer: &mut BufWriter, key: &str) {
        if let Err(e) = writer.abort().await {
            tracing::warn!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                "Failed to abort S3 upload"
            );
        }
    }
}

#[async_trait]
impl ObjectSink for S3Sink {
    async fn put_object(
        &self,
        key: &str,
        body: &mut (dyn AsyncRead + Send + Unpin),
        storage_class: Option<&str>,
    ) -> Result<u64, SinkError> {
        // Path::from would re-encode or drop segments; store under the exact key.
        let location = Path::parse(key)?;
        let stored_as: &str = location.as_ref();
        if key.is_empty() || stored_as != key {
            return Err(format!(
                "object key '{}' is not a valid object path (would be stored as '{}')",
                key, location
            )
            .into());
        }
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        if let Some(class) = storage_class {
            attributes.insert(
                Attribute::StorageClass,
                AttributeValue::from(class.to_string()),
            );
        }

        let mut writer =
            BufWriter::new(Arc::clone(&self.store), location).with_attributes(attributes);

        let written = match tokio::io::copy(body, &mut writer).await {
            Ok(written) => written,
            Err(e) => {
                // Drop any multipart upload already started.
                self.abort(&mut writer, key).await;
                return Err(e.into());
            }
        };

        if let Err(e) = writer.shutdown().await {
            self.abort(&mut writer, key).await;
            return Err(e.into());
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = written,
            storage_class = storage_class.unwrap_or("STANDARD"),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(written)
    }

    fn backend_type(&self) -> UploaderBackend {
        UploaderBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use object_store::ObjectStoreExt;

    #[test]
    fn test_rejects_endpoint_without_scheme() {
        let result = S3Sink::new("minio:9000", Some("us-east-1"), "artifacts", None);
        assert!(matches!(result, Err(UploadError::Config(_))));
    }

    #[test]
    fn test_rejects_empty_bucket() {
        let result = S3Sink::new("http://localhost:9000", None, "", None);
        assert!(matches!(result, Err(UploadError::Config(_))));
    }

    #[test]
    fn test_builds_client_with_static_credentials() {
        let sink = S3Sink::new(
            "http://localhost:9000",
            Some("us-east-1"),
            "artifacts",
            Some(("minio", "minio123")),
        )
        .unwrap();
        assert_eq!(sink.bucket(), "artifacts");
        assert_eq!(sink.backend_type(), UploaderBackend::S3);
    }

    #[tokio::test]
    async fn test_put_object_streams_body() {
        let store = Arc::new(InMemory::new());
        let sink = S3Sink::with_store(store.clone(), "artifacts");

        let mut body: &[u8] = b"recorded frames";
        let written = sink
            .put_object("sessions/abc/video.mp4", &mut body, None)
            .await
            .unwrap();

        assert_eq!(written, 15);
        let stored = store
            .get(&Path::from("sessions/abc/video.mp4"))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), b"recorded frames");
    }

    #[tokio::test]
    async fn test_put_object_keeps_percent_in_key() {
        let store = Arc::new(InMemory::new());
        let sink = S3Sink::with_store(store.clone(), "artifacts");

        let mut body: &[u8] = b"half";
        sink.put_object("runs/50%.mp4", &mut body, None).await.unwrap();

        let stored = store
            .get(&Path::parse("runs/50%.mp4").unwrap())
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), b"half");
        assert!(store.get(&Path::from("runs/50%.mp4")).await.is_err());
    }

    #[tokio::test]
    async fn test_put_object_rejects_non_canonical_keys() {
        let store = Arc::new(InMemory::new());
        let sink = S3Sink::with_store(store.clone(), "artifacts");

        for key in ["//noext", "a/./v.mp4", "a/../v.mp4", "/leading.mp4", "trailing/", ""] {
            let mut body: &[u8] = b"x";
            let result = sink.put_object(key, &mut body, None).await;
            assert!(result.is_err(), "key {key:?} should be rejected");
        }
        assert!(store.get(&Path::from("noext")).await.is_err());
        assert!(store.get(&Path::from("leading.mp4")).await.is_err());
    }

    #[tokio::test]
    async fn test_put_object_tags_storage_class() {
        let store = Arc::new(InMemory::new());
        let sink = S3Sink::with_store(store.clone(), "artifacts");

        let mut body: &[u8] = b"log";
        sink.put_object("abc.log", &mut body, Some("REDUCED_REDUNDANCY"))
            .await
            .unwrap();

        let result = store.get(&Path::from("abc.log")).await.unwrap();
        let class = result
            .attributes
            .get(&Attribute::StorageClass)
            .map(|v| v.as_ref().to_string());
        assert_eq!(class.as_deref(), Some("REDUCED_REDUNDANCY"));
    }
}
