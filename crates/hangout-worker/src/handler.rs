//! Pipeline handler trait
//!
//! Processors implement this trait and are registered with the dispatcher, one per
//! topic. The dispatcher calls `handle` on a worker task for every message published
//! on that topic.

use async_trait::async_trait;

use hangout_core::{PipelineInitMessage, ProcessingOutcome};

/// Consumer of pipeline-init messages for a single topic.
#[async_trait]
pub trait PipelineHandler: Send + Sync {
    /// Process one message to completion. Failures are reported in the outcome,
    /// never retried.
    async fn handle(&self, message: PipelineInitMessage) -> ProcessingOutcome;

    /// Handler name for logs.
    fn name(&self) -> &'static str;
}
