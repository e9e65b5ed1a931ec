//! Shared entry naming for store backends.

use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Generate a fresh store entry name: `<uuid-v4>.<extension>`.
pub fn generate_entry_name(extension: &str) -> String {
    format!(
        "{}.{}",
        Uuid::new_v4(),
        extension.trim_start_matches('.').to_lowercase()
    )
}

/// Entry names are flat: no separators, no parent references, not empty.
pub fn validate_entry_name(name: &str) -> StorageResult<()> {
    if name.is_empty()
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(StorageError::InvalidKey(format!(
            "Entry name contains invalid characters: {}",
            name
        )));
    }
    Ok(())
}
