use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Uploader backend types
///
/// Exactly one backend is selected per process. `Disabled` is used when no
/// storage endpoint has been configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploaderBackend {
    S3,
    Local,
    Disabled,
}

impl FromStr for UploaderBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(UploaderBackend::S3),
            "local" => Ok(UploaderBackend::Local),
            "none" | "disabled" | "" => Ok(UploaderBackend::Disabled),
            _ => Err(anyhow::anyhow!("Invalid uploader backend: {}", s)),
        }
    }
}

impl Display for UploaderBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploaderBackend::S3 => write!(f, "s3"),
            UploaderBackend::Local => write!(f, "local"),
            UploaderBackend::Disabled => write!(f, "disabled"),
        }
    }
}
