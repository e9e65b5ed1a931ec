//! Upload service: classify an upload and hand it to its pipeline.
//!
//! `submit` returns as soon as the pipeline-init message is queued. Processing failures
//! are never reported here; they reach the logs and, if the caller keeps it, the
//! [`DispatchReceipt`].

use std::sync::Arc;
use thiserror::Error;

use hangout_core::{AppError, PipelineInitMessage, PipelineName, RejectedError, UploadArtifact};
use hangout_worker::{DispatchReceipt, Dispatcher, PublishError};

use crate::classifier::classify;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Rejected(#[from] RejectedError),

    #[error("Failed to dispatch upload: {0}")]
    Dispatch(#[from] PublishError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Rejected(rejected) => AppError::Rejected(rejected),
            UploadError::Dispatch(PublishError::QueueFull(topic)) => AppError::ServiceUnavailable(
                format!("{} pipeline is busy", topic.media_kind()),
            ),
            UploadError::Dispatch(PublishError::Closed(topic)) => AppError::ServiceUnavailable(
                format!("{} pipeline is shutting down", topic.media_kind()),
            ),
            UploadError::Dispatch(PublishError::NoSubscriber(topic)) => {
                AppError::ServiceUnavailable(format!(
                    "{} pipeline has no processor",
                    topic.media_kind()
                ))
            }
        }
    }
}

/// An upload that was classified and queued for processing.
#[derive(Debug)]
pub struct UploadAccepted {
    pub pipeline: PipelineName,
    pub receipt: DispatchReceipt,
}

impl UploadAccepted {
    /// Literal acknowledgement for the uploader.
    pub fn acknowledgement(&self) -> &'static str {
        self.pipeline.acknowledgement()
    }
}

#[derive(Clone)]
pub struct UploadService {
    dispatcher: Arc<Dispatcher>,
}

impl UploadService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Classify and publish. On `Ok`, the source file belongs to the pipeline; on `Err`,
    /// nothing was published and the caller still owns it.
    #[tracing::instrument(
        skip_all,
        fields(
            content_type = %artifact.declared_content_type,
            original_filename = %artifact.original_filename,
        )
    )]
    pub async fn submit(&self, artifact: UploadArtifact) -> Result<UploadAccepted, UploadError> {
        let pipeline = match classify(&artifact) {
            Ok(pipeline) => pipeline,
            Err(rejected) => {
                tracing::info!(reason = %rejected, "Upload rejected");
                return Err(rejected.into());
            }
        };

        let message = PipelineInitMessage::new(artifact.source_path, artifact.original_filename);
        let receipt = self.dispatcher.publish(pipeline, message).await?;

        tracing::info!(
            pipeline = %pipeline,
            message_id = %receipt.message_id,
            "Upload accepted"
        );

        Ok(UploadAccepted { pipeline, receipt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::register_pipelines;
    use hangout_core::{ErrorMetadata, ProcessingOutcome};
    use hangout_storage::{LocalStore, Store};
    use hangout_worker::DispatcherConfig;
    use std::path::PathBuf;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, Arc<LocalStore>, Arc<Dispatcher>, UploadService) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().join("store")).await.unwrap());
        let dispatcher = Arc::new(Dispatcher::new(DispatcherConfig::default()));
        register_pipelines(&dispatcher, store.clone()).await.unwrap();
        let service = UploadService::new(dispatcher.clone());
        (dir, store, dispatcher, service)
    }

    fn write_upload(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[tokio::test]
    async fn test_image_upload_acknowledged_then_stored() {
        let (dir, store, _dispatcher, service) = setup().await;
        let data = b"\x89PNG\r\n\x1a\nnot really a png".to_vec();
        let source = write_upload(&dir, "upload-1", &data);

        let accepted = service
            .submit(UploadArtifact::new(&source, "image/png", "cat.png"))
            .await
            .unwrap();
        assert_eq!(accepted.acknowledgement(), "image uploaded");

        let outcome = accepted.receipt.wait().await.unwrap();
        let artifact = outcome.artifact().unwrap();
        assert_eq!(store.read(&artifact.name).await.unwrap(), data);
        assert!(!source.exists());
    }

    #[tokio::test]
    async fn test_video_upload_acknowledged_without_artifact() {
        let (dir, store, _dispatcher, service) = setup().await;
        let source = write_upload(&dir, "upload-2", b"video bytes");

        let accepted = service
            .submit(UploadArtifact::new(&source, "video/mp4", "clip.mp4"))
            .await
            .unwrap();
        assert_eq!(accepted.acknowledgement(), "video uploaded");

        let outcome = accepted.receipt.wait().await.unwrap();
        assert!(matches!(outcome, ProcessingOutcome::Unimplemented { .. }));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pdf_rejected_before_publish() {
        let (dir, store, dispatcher, service) = setup().await;
        let source = write_upload(&dir, "upload-3", b"%PDF-1.7");

        let err = service
            .submit(UploadArtifact::new(&source, "application/pdf", "doc.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Rejected(ref r) if r.value == "application/pdf"));

        // Drain the pools: anything published would have run by now.
        dispatcher.shutdown().await;
        assert!(store.list().await.unwrap().is_empty());
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_missing_subscriber_surfaces_as_error() {
        let dispatcher = Arc::new(Dispatcher::new(DispatcherConfig::default()));
        let service = UploadService::new(dispatcher);

        let err = service
            .submit(UploadArtifact::new("/tmp/nowhere", "video/mp4", "clip.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UploadError::Dispatch(PublishError::NoSubscriber(PipelineName::Video))
        ));
    }

    #[test]
    fn test_upload_error_to_app_error() {
        let err = AppError::from(UploadError::Rejected(
            RejectedError::unsupported_content_type("text/plain"),
        ));
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "UNSUPPORTED_CONTENT_TYPE");

        let err = AppError::from(UploadError::Dispatch(PublishError::QueueFull(
            PipelineName::Image,
        )));
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(err.client_message(), "image pipeline is busy");

        let err = AppError::from(UploadError::Dispatch(PublishError::NoSubscriber(
            PipelineName::Video,
        )));
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(err.client_message(), "video pipeline has no processor");
    }
}
