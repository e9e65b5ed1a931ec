use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Transient handle to an in-flight upload.
///
/// The backing file at `source_path` belongs to the ingestion layer until a processor
/// claims the matching pipeline message; from then on the processor owns it and is
/// responsible for deleting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadArtifact {
    pub source_path: PathBuf,
    /// Caller-supplied and untrusted. Never checked against the file's bytes.
    pub declared_content_type: String,
    /// Used for logging only, never for destination naming.
    pub original_filename: String,
}

impl UploadArtifact {
    pub fn new(
        source_path: impl Into<PathBuf>,
        declared_content_type: impl Into<String>,
        original_filename: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            declared_content_type: declared_content_type.into(),
            original_filename: original_filename.into(),
        }
    }
}

/// A processed output file owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredArtifact {
    /// Store-relative name: `<uuid>.<extension>`.
    pub name: String,
    /// Absolute or base-relative filesystem location of the stored file.
    pub path: PathBuf,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

impl StoredArtifact {
    pub fn new(name: String, path: PathBuf, size_bytes: u64) -> Self {
        Self {
            name,
            path,
            size_bytes,
            created_at: Utc::now(),
        }
    }

    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|e| e.to_str())
    }
}
