//! Configuration module
//!
//! Uploader configuration is read once at startup (environment variables,
//! optionally from a `.env` file) and is immutable afterwards. Uploads running
//! concurrently only ever read it.

use std::env;
use std::path::PathBuf;

use crate::storage_types::UploaderBackend;

/// Key pattern used when none is configured.
pub const DEFAULT_KEY_PATTERN: &str = "$fileName";

/// Storage class applied when reduced redundancy is requested.
pub const REDUCED_REDUNDANCY_STORAGE_CLASS: &str = "REDUCED_REDUNDANCY";

/// Uploader configuration
#[derive(Clone, Debug)]
pub struct UploaderConfig {
    pub backend: UploaderBackend,
    // S3 configuration
    pub endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, Ceph, etc.)
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub bucket_name: Option<String>,
    pub key_pattern: String,
    pub reduced_redundancy: bool,
    /// Keep local files after a successful upload
    pub keep_files: bool,
    // Local filesystem backend
    pub local_path: Option<PathBuf>,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            backend: UploaderBackend::S3,
            endpoint: None,
            region: None,
            access_key: None,
            secret_key: None,
            bucket_name: None,
            key_pattern: DEFAULT_KEY_PATTERN.to_string(),
            reduced_redundancy: false,
            keep_files: false,
            local_path: None,
        }
    }
}

impl UploaderConfig {
    /// Read the environment (and `.env`) without validating, so callers can
    /// layer overrides on top before calling [`UploaderConfig::validate`].
    pub fn load_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Parse configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset. The result is not validated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());
        let flag = |name: &str| -> Result<bool, anyhow::Error> {
            match var(name) {
                Some(value) => parse_flag(&value)
                    .ok_or_else(|| anyhow::anyhow!("{} must be a boolean, got '{}'", name, value)),
                None => Ok(false),
            }
        };

        let backend = match var("UPLOAD_BACKEND") {
            Some(value) => value.parse()?,
            None => UploaderBackend::S3,
        };

        let config = UploaderConfig {
            backend,
            endpoint: var("S3_ENDPOINT"),
            region: var("S3_REGION"),
            access_key: var("S3_ACCESS_KEY"),
            secret_key: var("S3_SECRET_KEY"),
            bucket_name: var("S3_BUCKET_NAME"),
            key_pattern: lookup("S3_KEY_PATTERN")
                .unwrap_or_else(|| DEFAULT_KEY_PATTERN.to_string()),
            reduced_redundancy: flag("S3_REDUCED_REDUNDANCY")?,
            keep_files: flag("S3_KEEP_FILES")?,
            local_path: var("LOCAL_UPLOAD_PATH").map(PathBuf::from),
        };

        Ok(config)
    }

    /// Whether uploads are enabled at all.
    ///
    /// The S3 backend stays disabled until an endpoint is configured.
    pub fn is_enabled(&self) -> bool {
        match self.backend {
            UploaderBackend::S3 => self.endpoint.is_some(),
            UploaderBackend::Local => true,
            UploaderBackend::Disabled => false,
        }
    }

    /// Static credentials, when both halves of the pair are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.access_key.as_deref(), self.secret_key.as_deref()) {
            (Some(access), Some(secret)) => Some((access, secret)),
            _ => None,
        }
    }

    pub fn storage_class(&self) -> Option<&'static str> {
        self.reduced_redundancy
            .then_some(REDUCED_REDUNDANCY_STORAGE_CLASS)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.is_enabled() {
            return Ok(());
        }

        match self.backend {
            UploaderBackend::S3 => {
                if self.bucket_name.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET_NAME must be set when S3_ENDPOINT is configured"
                    ));
                }
                if self.access_key.is_some() != self.secret_key.is_some() {
                    return Err(anyhow::anyhow!(
                        "S3_ACCESS_KEY and S3_SECRET_KEY must be set together"
                    ));
                }
            }
            UploaderBackend::Local => {
                if self.local_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_UPLOAD_PATH must be set when using the local upload backend"
                    ));
                }
            }
            UploaderBackend::Disabled => {}
        }

        Ok(())
    }
}

/// Parse a boolean setting; accepts true/false, 1/0, yes/no and on/off.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
