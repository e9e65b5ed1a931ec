use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

use super::media::StoredArtifact;
use crate::error::ProcessingError;

/// Routing key between the classifier and the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineName {
    Image,
    Video,
}

impl PipelineName {
    pub const ALL: [PipelineName; 2] = [PipelineName::Image, PipelineName::Video];

    /// Dispatcher topic this pipeline publishes on.
    pub fn topic(self) -> &'static str {
        match self {
            PipelineName::Image => "image-process-pipeline-init",
            PipelineName::Video => "video-process-pipeline-init",
        }
    }

    /// Acknowledgement returned to the uploader once the message is published.
    pub fn acknowledgement(self) -> &'static str {
        match self {
            PipelineName::Image => "image uploaded",
            PipelineName::Video => "video uploaded",
        }
    }

    pub fn media_kind(self) -> &'static str {
        match self {
            PipelineName::Image => "image",
            PipelineName::Video => "video",
        }
    }
}

impl Display for PipelineName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.topic())
    }
}

/// Event payload that triggers a media processor. Consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineInitMessage {
    pub source_path: PathBuf,
    pub original_filename: String,
}

impl PipelineInitMessage {
    pub fn new(source_path: impl Into<PathBuf>, original_filename: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            original_filename: original_filename.into(),
        }
    }
}

/// Result of running one pipeline message through its processor.
///
/// `Unimplemented` is distinct from `Success` so a stub processor can never be
/// mistaken for one that produced output.
#[derive(Debug)]
pub enum ProcessingOutcome {
    Success(StoredArtifact),
    Unimplemented { reason: String },
    Failed(ProcessingError),
}

impl ProcessingOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingOutcome::Success(_))
    }

    pub fn artifact(&self) -> Option<&StoredArtifact> {
        match self {
            ProcessingOutcome::Success(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ProcessingError> {
        match self {
            ProcessingOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Short label for structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            ProcessingOutcome::Success(_) => "success",
            ProcessingOutcome::Unimplemented { .. } => "unimplemented",
            ProcessingOutcome::Failed(_) => "failed",
        }
    }
}
