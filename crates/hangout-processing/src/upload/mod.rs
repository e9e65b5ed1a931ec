//! Upload flow: classify → publish → process → store.

pub mod image_processor;
pub mod service;
pub mod video_processor;

pub use image_processor::ImagePipelineProcessor;
pub use service::{UploadAccepted, UploadError, UploadService};
pub use video_processor::VideoPipelineProcessor;

use std::sync::Arc;

use hangout_core::{PipelineName, ProcessingError, ProcessingErrorKind, ProcessingOutcome, StoredArtifact};
use hangout_storage::Store;
use hangout_worker::{Dispatcher, SubscribeError};

/// Subscribe the image and video processors to their topics.
pub async fn register_pipelines(
    dispatcher: &Dispatcher,
    store: Arc<dyn Store>,
) -> Result<(), SubscribeError> {
    dispatcher
        .subscribe(
            PipelineName::Image,
            Arc::new(ImagePipelineProcessor::new(store.clone())),
        )
        .await?;
    dispatcher
        .subscribe(
            PipelineName::Video,
            Arc::new(VideoPipelineProcessor::new(store)),
        )
        .await?;
    Ok(())
}

/// Fold a processor result into the outcome reported to the dispatcher.
pub(crate) fn into_outcome(result: Result<StoredArtifact, ProcessingError>) -> ProcessingOutcome {
    match result {
        Ok(artifact) => ProcessingOutcome::Success(artifact),
        Err(err) if err.kind == ProcessingErrorKind::NotImplemented => {
            ProcessingOutcome::Unimplemented {
                reason: err.message,
            }
        }
        Err(err) => ProcessingOutcome::Failed(err),
    }
}
