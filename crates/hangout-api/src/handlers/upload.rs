//! `POST /upload`: spool the file part, classify it, hand it to its pipeline.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::multipart::{Field, MultipartRejection},
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use hangout_core::{AppError, UploadArtifact};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use crate::error::HttpAppError;
use crate::state::AppState;

const FILE_FIELD: &str = "file";
const DEFAULT_FILENAME: &str = "upload";

/// An upload written to `UPLOAD_PATH`. Dropping it deletes the file.
struct SpooledUpload {
    path: TempPath,
    content_type: String,
    filename: String,
    size_bytes: u64,
}

/// Upload handler
///
/// Responds as soon as the pipeline-init message is queued: `image uploaded` or
/// `video uploaded`. Processing happens afterwards and its outcome is only logged.
///
/// # Errors
/// - `400` - no file part, no content type, or an unsupported content type
/// - `413` - body exceeds `MAX_UPLOAD_SIZE_BYTES`
/// - `503` - the pipeline is not accepting work
#[tracing::instrument(skip_all, fields(operation = "upload"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut multipart = multipart?;

    let spooled = loop {
        let Some(field) = multipart.next_field().await? else {
            return Err(AppError::InvalidInput(format!(
                "Missing '{}' part in multipart body",
                FILE_FIELD
            ))
            .into());
        };
        if field.name() == Some(FILE_FIELD) {
            break spool_field(field, state.config.upload_path()).await?;
        }
    };

    tracing::debug!(
        path = %spooled.path.display(),
        content_type = %spooled.content_type,
        filename = %spooled.filename,
        size_bytes = spooled.size_bytes,
        "Upload spooled"
    );

    let SpooledUpload {
        path,
        content_type,
        filename,
        ..
    } = spooled;
    let artifact = UploadArtifact::new(path.to_path_buf(), content_type, filename);

    // On error `path` is dropped here and the spooled file goes with it.
    let accepted = state.uploads.submit(artifact).await?;

    // The pipeline owns the file from here on.
    if let Err(e) = path.keep() {
        tracing::warn!(error = %e, "Failed to hand spooled upload over to the pipeline");
    }

    Ok((StatusCode::OK, accepted.acknowledgement()))
}

async fn spool_field(mut field: Field<'_>, dir: &Path) -> Result<SpooledUpload, HttpAppError> {
    let content_type = field
        .content_type()
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidInput("File part has no content type".to_string()))?;
    let filename = field
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_FILENAME)
        .to_string();

    tokio::fs::create_dir_all(dir).await?;
    let (file, path) = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(dir)?
        .into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut size_bytes = 0u64;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
        size_bytes += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;

    Ok(SpooledUpload {
        path,
        content_type,
        filename,
        size_bytes,
    })
}
