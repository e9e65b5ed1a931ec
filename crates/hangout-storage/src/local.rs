use crate::keys::{generate_entry_name, validate_entry_name};
use crate::traits::{Store, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use hangout_core::StoredArtifact;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Writes land in a hidden file with this prefix and are renamed into place when done.
const PARTIAL_PREFIX: &str = ".partial-";

/// Local filesystem store implementation
#[derive(Clone, Debug)]
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore instance
    ///
    /// # Arguments
    /// * `base_path` - Directory backing the store (e.g., "store"). Created if missing.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create store directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStore { base_path })
    }

    fn entry_path(&self, name: &str) -> StorageResult<PathBuf> {
        validate_entry_name(name)?;
        Ok(self.base_path.join(name))
    }

    /// Open a hidden scratch file in the store directory. It is deleted on drop unless
    /// passed to [`commit`](Self::commit).
    async fn open_partial(&self) -> StorageResult<(fs::File, TempPath)> {
        let base = self.base_path.clone();
        let temp = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(PARTIAL_PREFIX)
                .tempfile_in(&base)
        })
        .await
        .map_err(|e| StorageError::UploadFailed(format!("Partial file task failed: {}", e)))?
        .map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create partial file in {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let (file, path) = temp.into_parts();
        Ok((fs::File::from_std(file), path))
    }

    /// Publish a finished partial file under `name`. An existing entry is never
    /// replaced: the commit fails and the partial file is discarded.
    async fn commit(&self, partial: TempPath, name: &str) -> StorageResult<PathBuf> {
        let path = self.entry_path(name)?;
        let target = path.clone();

        tokio::task::spawn_blocking(move || partial.persist_noclobber(&target))
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Commit task failed: {}", e)))?
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e.error
                ))
            })?;

        Ok(path)
    }
}

fn is_partial(name: &str) -> bool {
    name.starts_with(PARTIAL_PREFIX)
}

#[async_trait]
impl Store for LocalStore {
    async fn put_file(&self, source: &Path, extension: &str) -> StorageResult<StoredArtifact> {
        let start = std::time::Instant::now();

        let mut reader = fs::File::open(source).await.map_err(|e| {
            StorageError::DownloadFailed(format!(
                "Failed to open source {}: {}",
                source.display(),
                e
            ))
        })?;

        let (mut file, partial) = self.open_partial().await?;

        let bytes_copied = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} into {}: {}",
                source.display(),
                self.base_path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync {}: {}", partial.display(), e))
        })?;
        drop(file);

        let name = generate_entry_name(extension);
        let path = self.commit(partial, &name).await?;

        tracing::info!(
            source = %source.display(),
            path = %path.display(),
            name = %name,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local store copy successful"
        );

        Ok(StoredArtifact::new(name, path, bytes_copied))
    }

    async fn put_bytes(&self, data: Bytes, extension: &str) -> StorageResult<StoredArtifact> {
        let start = std::time::Instant::now();
        let size = data.len() as u64;

        let (mut file, partial) = self.open_partial().await?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write {}: {}", partial.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync {}: {}", partial.display(), e))
        })?;
        drop(file);

        let name = generate_entry_name(extension);
        let path = self.commit(partial, &name).await?;

        tracing::info!(
            path = %path.display(),
            name = %name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local store write successful"
        );

        Ok(StoredArtifact::new(name, path, size))
    }

    async fn read(&self, name: &str) -> StorageResult<Vec<u8>> {
        let path = self.entry_path(name)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            name = %name,
            size_bytes = data.len(),
            "Local store read successful"
        );

        Ok(data)
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.entry_path(name)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.base_path).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    if !is_partial(name) {
                        names.push(name.to_string());
                    }
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn location(&self) -> &Path {
        &self.base_path
    }
}
