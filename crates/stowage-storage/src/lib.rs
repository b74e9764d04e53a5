//! Stowage Storage Library
//!
//! This crate provides the uploader abstraction for session artifacts and its
//! backends: S3 (and S3-compatible providers) and the local filesystem, plus a
//! disabled backend used when no storage is configured.
//!
//! # Object keys
//!
//! Object keys are derived from a key pattern such as
//! `$quota/$sessionId/$fileName` by substituting session and request metadata.
//! Key derivation lives in the `keys` module so every backend names objects
//! the same way.
//!
//! # Upload semantics
//!
//! An upload opens the local artifact, streams it to the backend under the
//! resolved key and, unless local files are kept, removes the artifact once the
//! transfer succeeded. A failed transfer never removes the local file.

pub mod disabled;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;
pub mod uploader;

// Re-export commonly used types
pub use disabled::DisabledUploader;
pub use factory::create_uploader;
pub use keys::{resolve_key, unrecognized_tokens};
#[cfg(feature = "storage-local")]
pub use local::LocalSink;
#[cfg(feature = "storage-s3")]
pub use s3::S3Sink;
pub use stowage_core::{UploadReceipt, UploadRequest, UploaderBackend};
pub use traits::{ObjectSink, SinkError, UploadError, UploadResult, Uploader};
pub use uploader::ArtifactUploader;
