//! Video pipeline processor.
//!
//! Not implemented: the destination name is reserved and logged, nothing is written,
//! and the source upload is left where it is.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use hangout_core::{PipelineInitMessage, ProcessingError, ProcessingOutcome, StoredArtifact};
use hangout_storage::Store;
use hangout_worker::PipelineHandler;

const OUTPUT_EXTENSION: &str = "mp4";
const NOT_ACTIVE: &str = "this feature is not active yet";

pub struct VideoPipelineProcessor {
    store: Arc<dyn Store>,
}

impl VideoPipelineProcessor {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn on_video_init(
        &self,
        message: &PipelineInitMessage,
    ) -> Result<StoredArtifact, ProcessingError> {
        let destination = format!("{}.{}", Uuid::new_v4(), OUTPUT_EXTENSION);

        tracing::warn!(
            source_path = %message.source_path.display(),
            original_filename = %message.original_filename,
            destination = %self.store.location().join(&destination).display(),
            "Video processing is not implemented, upload left unprocessed"
        );

        Err(ProcessingError::not_implemented(NOT_ACTIVE))
    }
}

#[async_trait]
impl PipelineHandler for VideoPipelineProcessor {
    async fn handle(&self, message: PipelineInitMessage) -> ProcessingOutcome {
        super::into_outcome(self.on_video_init(&message).await)
    }

    fn name(&self) -> &'static str {
        "video-processor"
    }
}
