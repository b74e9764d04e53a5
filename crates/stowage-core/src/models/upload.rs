//! Upload request and receipt models.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::SessionMetadata;

/// A finished artifact ready to be uploaded.
///
/// Created by the artifact producer once per file and consumed by a single
/// upload call. The session metadata is shared and never mutated.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Absolute path of the local artifact
    pub filename: PathBuf,
    pub session_id: String,
    /// Logical artifact category, e.g. "video", "log" or "download"
    pub artifact_type: String,
    pub session: Arc<SessionMetadata>,
}

impl UploadRequest {
    pub fn new(
        filename: impl Into<PathBuf>,
        session_id: impl Into<String>,
        artifact_type: impl Into<String>,
        session: Arc<SessionMetadata>,
    ) -> Self {
        Self {
            filename: filename.into(),
            session_id: session_id.into(),
            artifact_type: artifact_type.into(),
            session,
        }
    }

    pub fn path(&self) -> &Path {
        &self.filename
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    /// Object key the artifact was stored under
    pub key: String,
    pub size_bytes: u64,
    /// False when the uploader is configured to keep local files
    pub local_file_removed: bool,
}
