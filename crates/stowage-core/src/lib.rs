//! Stowage Core Library
//!
//! This crate provides the domain models and configuration shared by the
//! uploader backends and the `stowage` binary.

pub mod config;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{UploaderConfig, DEFAULT_KEY_PATTERN, REDUCED_REDUNDANCY_STORAGE_CLASS};
pub use models::{BrowserCaps, SessionMetadata, UploadReceipt, UploadRequest};
pub use storage_types::UploaderBackend;
