//! Store abstraction trait
//!
//! This module defines the Store trait that processors write their output through.

use async_trait::async_trait;
use bytes::Bytes;
use hangout_core::StoredArtifact;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Store abstraction trait
///
/// Every write lands under a freshly generated `<uuid>.<extension>` name and never
/// replaces an existing entry. An entry is visible to `read` and `list` only once its
/// contents are complete.
#[async_trait]
pub trait Store: Send + Sync {
    /// Copy a file verbatim into a new entry.
    ///
    /// Callers never roll back: whatever a failed copy leaves behind stays, and the
    /// source is untouched.
    async fn put_file(&self, source: &Path, extension: &str) -> StorageResult<StoredArtifact>;

    /// Write an in-memory buffer into a new entry.
    async fn put_bytes(&self, data: Bytes, extension: &str) -> StorageResult<StoredArtifact>;

    /// Read an entry by name
    async fn read(&self, name: &str) -> StorageResult<Vec<u8>>;

    /// Check if an entry exists
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// List entry names, sorted
    async fn list(&self) -> StorageResult<Vec<String>>;

    /// Root location of the store, for logging
    fn location(&self) -> &Path;
}
