//! Shared pieces of the `stowage` binary: argument groups, concurrent upload
//! driving and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use stowage_core::{BrowserCaps, SessionMetadata, UploadRequest, UploaderBackend, UploaderConfig};
use stowage_storage::{UploadError, Uploader};

/// Uploader configuration flags.
///
/// Each flag overrides the matching environment variable (UPLOAD_BACKEND,
/// S3_ENDPOINT, ...), which is read by [`UploaderConfig::load_env`].
#[derive(Args, Debug, Clone, Default)]
pub struct UploaderArgs {
    /// Upload backend: s3, local or none [env: UPLOAD_BACKEND]
    #[arg(long)]
    pub backend: Option<UploaderBackend>,
    /// S3 endpoint URL; uploads are disabled when unset [env: S3_ENDPOINT]
    #[arg(long = "s3-endpoint")]
    pub endpoint: Option<String>,
    /// S3 region [env: S3_REGION]
    #[arg(long = "s3-region")]
    pub region: Option<String>,
    /// S3 access key [env: S3_ACCESS_KEY]
    #[arg(long = "s3-access-key")]
    pub access_key: Option<String>,
    /// S3 secret key [env: S3_SECRET_KEY]
    #[arg(long = "s3-secret-key")]
    pub secret_key: Option<String>,
    /// S3 bucket name [env: S3_BUCKET_NAME]
    #[arg(long = "s3-bucket-name")]
    pub bucket_name: Option<String>,
    /// Object key pattern, "$fileName" by default [env: S3_KEY_PATTERN]
    #[arg(long = "s3-key-pattern")]
    pub key_pattern: Option<String>,
    /// Use the reduced redundancy storage class [env: S3_REDUCED_REDUNDANCY]
    #[arg(long = "s3-reduced-redundancy")]
    pub reduced_redundancy: bool,
    /// Do not remove uploaded files [env: S3_KEEP_FILES]
    #[arg(long = "s3-keep-files")]
    pub keep_files: bool,
    /// Root directory of the local upload backend [env: LOCAL_UPLOAD_PATH]
    #[arg(long = "local-upload-path")]
    pub local_path: Option<PathBuf>,
}

impl UploaderArgs {
    /// Apply the flags given on the command line on top of `config`, then
    /// validate the result.
    pub fn apply(self, mut config: UploaderConfig) -> anyhow::Result<UploaderConfig> {
        let non_empty = |value: Option<String>| value.filter(|s| !s.trim().is_empty());

        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(endpoint) = non_empty(self.endpoint) {
            config.endpoint = Some(endpoint);
        }
        if let Some(region) = non_empty(self.region) {
            config.region = Some(region);
        }
        if let Some(access_key) = non_empty(self.access_key) {
            config.access_key = Some(access_key);
        }
        if let Some(secret_key) = non_empty(self.secret_key) {
            config.secret_key = Some(secret_key);
        }
        if let Some(bucket_name) = non_empty(self.bucket_name) {
            config.bucket_name = Some(bucket_name);
        }
        if let Some(key_pattern) = self.key_pattern {
            config.key_pattern = key_pattern;
        }
        config.reduced_redundancy |= self.reduced_redundancy;
        config.keep_files |= self.keep_files;
        if let Some(local_path) = self.local_path {
            config.local_path = Some(local_path);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Metadata of the session that produced the artifacts.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Session identifier
    #[arg(long, default_value = "")]
    pub session_id: String,
    /// Artifact type (video, log, download, ...)
    #[arg(long = "type", default_value = "")]
    pub artifact_type: String,
    #[arg(long, default_value = "")]
    pub browser_name: String,
    #[arg(long, default_value = "")]
    pub browser_version: String,
    #[arg(long = "platform", default_value = "")]
    pub platform_name: String,
    /// Quota (browser pool) name
    #[arg(long, default_value = "")]
    pub quota: String,
}

impl SessionArgs {
    /// Build one upload request per file, all sharing the same session metadata.
    pub fn requests(&self, files: &[PathBuf]) -> Vec<UploadRequest> {
        let session = Arc::new(SessionMetadata::new(
            BrowserCaps {
                name: self.browser_name.clone(),
                version: self.browser_version.clone(),
                platform: self.platform_name.clone(),
            },
            self.quota.clone(),
        ));

        files
            .iter()
            .map(|file| {
                UploadRequest::new(
                    absolute(file),
                    self.session_id.clone(),
                    self.artifact_type.clone(),
                    Arc::clone(&session),
                )
            })
            .collect()
    }
}

fn absolute(path: &std::path::Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploaded,
    /// Uploads are not configured
    Skipped,
    Failed,
}

/// Per-file result printed by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub file: PathBuf,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_file_removed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadReport {
    fn from_result(
        file: PathBuf,
        result: Result<stowage_core::UploadReceipt, UploadError>,
    ) -> Self {
        let mut report = UploadReport {
            file,
            status: UploadStatus::Uploaded,
            key: None,
            size_bytes: None,
            local_file_removed: None,
            error: None,
        };
        match result {
            Ok(receipt) => {
                report.key = Some(receipt.key);
                report.size_bytes = Some(receipt.size_bytes);
                report.local_file_removed = Some(receipt.local_file_removed);
            }
            Err(e) if e.is_not_initialized() => {
                report.status = UploadStatus::Skipped;
                report.error = Some(e.to_string());
            }
            Err(e) => {
                report.status = UploadStatus::Failed;
                report.error = Some(e.to_string());
            }
        }
        report
    }
}

/// Upload every request concurrently through the shared uploader.
///
/// Reports come back in request order. Failures are logged here, at the
/// caller of the uploader.
pub async fn upload_all(
    uploader: Arc<dyn Uploader>,
    requests: Vec<UploadRequest>,
) -> Vec<UploadReport> {
    let uploads = requests.into_iter().map(|request| {
        let uploader = Arc::clone(&uploader);
        async move {
            let result = uploader.upload(&request).await;
            if let Err(e) = &result {
                if !e.is_not_initialized() {
                    tracing::error!(
                        file = %request.filename.display(),
                        session_id = %request.session_id,
                        error = %e,
                        "Artifact upload failed"
                    );
                }
            }
            UploadReport::from_result(request.filename, result)
        }
    });

    futures::future::join_all(uploads).await
}

/// Initialize tracing for the binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;
    use stowage_storage::{create_uploader, DisabledUploader};

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        uploader: UploaderArgs,
    }

    fn env_config(vars: &[(&str, &str)]) -> UploaderConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        UploaderConfig::from_lookup(|name| vars.get(name).cloned()).unwrap()
    }

    fn resolve(flags: &[&str], vars: &[(&str, &str)]) -> anyhow::Result<UploaderConfig> {
        let cli = TestCli::try_parse_from(std::iter::once("stowage").chain(flags.iter().copied()))?;
        cli.uploader.apply(env_config(vars))
    }

    fn session_args() -> SessionArgs {
        SessionArgs {
            session_id: "abc123".to_string(),
            artifact_type: "video".to_string(),
            browser_name: "Chrome".to_string(),
            browser_version: "91".to_string(),
            platform_name: "LINUX".to_string(),
            quota: "default".to_string(),
        }
    }

    #[test]
    fn requests_share_session_metadata() {
        let requests = session_args().requests(&[PathBuf::from("/tmp/a.mp4"), PathBuf::from("/tmp/b.log")]);
        assert_eq!(requests.len(), 2);
        assert!(Arc::ptr_eq(&requests[0].session, &requests[1].session));
        assert_eq!(requests[1].filename, PathBuf::from("/tmp/b.log"));
        assert_eq!(requests[0].session.caps.name, "Chrome");
    }

    #[test]
    fn relative_files_are_made_absolute() {
        let requests = session_args().requests(&[PathBuf::from("video.mp4")]);
        assert!(requests[0].filename.is_absolute());
    }

    #[test]
    fn env_flags_accept_numeric_and_word_booleans() {
        let config = resolve(&[], &[("S3_KEEP_FILES", "1"), ("S3_REDUCED_REDUNDANCY", "yes")]).unwrap();
        assert!(config.keep_files);
        assert!(config.reduced_redundancy);
    }

    #[test]
    fn command_line_flags_override_environment() {
        let config = resolve(
            &["--s3-bucket-name", "from-flag", "--s3-keep-files", "--s3-key-pattern", "$sessionId/$fileName"],
            &[("S3_ENDPOINT", "http://localhost:9000"), ("S3_BUCKET_NAME", "from-env")],
        )
        .unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.bucket_name.as_deref(), Some("from-flag"));
        assert_eq!(config.key_pattern, "$sessionId/$fileName");
        assert!(config.keep_files);
    }

    #[test]
    fn flags_complete_an_environment_config() {
        let config = resolve(
            &["--s3-bucket-name", "artifacts"],
            &[("S3_ENDPOINT", "http://localhost:9000")],
        )
        .unwrap();
        assert!(config.is_enabled());
    }

    #[test]
    fn blank_flags_are_treated_as_unset() {
        let config = resolve(&["--s3-endpoint", "  "], &[]).unwrap();
        assert!(config.endpoint.is_none());
        assert!(!config.is_enabled());
    }

    #[test]
    fn invalid_flag_combination_is_rejected() {
        assert!(resolve(&["--s3-endpoint", "http://localhost:9000"], &[]).is_err());
        assert!(resolve(&["--backend", "gcs"], &[]).is_err());
    }

    #[tokio::test]
    async fn disabled_uploads_are_skipped() {
        let requests = session_args().requests(&[PathBuf::from("/nonexistent/video.mp4")]);
        let reports = upload_all(Arc::new(DisabledUploader::new()), requests).await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].status, UploadStatus::Skipped);
    }

    #[tokio::test]
    async fn reports_keep_request_order() {
        let root = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let config = resolve(
            &[
                "--backend",
                "local",
                "--local-upload-path",
                root.path().to_str().unwrap(),
                "--s3-key-pattern",
                "$sessionId/$fileName",
            ],
            &[],
        )
        .unwrap();
        let uploader = create_uploader(&config).await.unwrap();

        let good = work.path().join("one.log");
        std::fs::write(&good, b"1").unwrap();
        let missing = work.path().join("two.log");

        let reports = upload_all(uploader, session_args().requests(&[good.clone(), missing])).await;

        assert_eq!(reports[0].status, UploadStatus::Uploaded);
        assert_eq!(reports[0].key.as_deref(), Some("abc123/one.log"));
        assert_eq!(reports[1].status, UploadStatus::Failed);
        assert!(reports[1].error.as_deref().unwrap().contains("two.log"));
        assert!(!good.exists());
    }
}
