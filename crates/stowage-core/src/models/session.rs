//! Session metadata: descriptive attributes used only to name uploaded artifacts.

use serde::{Deserialize, Serialize};

/// Browser capabilities negotiated for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserCaps {
    /// Browser name (e.g. "chrome", "firefox")
    pub name: String,
    pub version: String,
    /// Platform name (e.g. "LINUX", "WINDOWS")
    pub platform: String,
}

/// Metadata of the automation session that produced an artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub caps: BrowserCaps,
    /// Quota (browser pool) the session was allocated from
    pub quota: String,
}

impl SessionMetadata {
    pub fn new(caps: BrowserCaps, quota: impl Into<String>) -> Self {
        Self {
            caps,
            quota: quota.into(),
        }
    }
}
