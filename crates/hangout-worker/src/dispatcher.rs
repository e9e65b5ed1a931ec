//! Pipeline dispatcher: one bounded channel and one worker pool per topic.
//!
//! Publishing is fire-and-forget from the uploader's point of view: `publish` returns
//! as soon as the message is queued. The returned [`DispatchReceipt`] can be awaited
//! for the processing outcome, but nothing in the ingestion path does so.
//!
//! Shutdown: [`Dispatcher::shutdown`] closes every topic channel, lets the worker pools
//! drain what was already queued, and waits for in-flight messages to finish.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, RwLock, Semaphore};
use tokio::task::JoinHandle;
use uuid::Uuid;

use hangout_core::{
    PipelineConfig, PipelineInitMessage, PipelineName, ProcessingError, ProcessingOutcome,
};

use crate::handler::PipelineHandler;
use crate::metrics::PipelineMetrics;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("No subscriber registered for topic {0}")]
    NoSubscriber(PipelineName),

    #[error("Queue for topic {0} is full")]
    QueueFull(PipelineName),

    #[error("Dispatcher is shut down, topic {0} is closed")]
    Closed(PipelineName),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscribeError {
    #[error("Topic {0} already has a subscriber")]
    AlreadySubscribed(PipelineName),

    #[error("Dispatcher is shut down, cannot subscribe to topic {0}")]
    Closed(PipelineName),
}

#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    pub queue_size: usize,
    pub max_concurrent: usize,
    pub processing_timeout_secs: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_size: 100,
            max_concurrent: 4,
            processing_timeout_secs: 300,
        }
    }
}

impl From<&PipelineConfig> for DispatcherConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            queue_size: config.queue_size.max(1),
            max_concurrent: config.max_concurrent.max(1),
            processing_timeout_secs: config.processing_timeout_secs.max(1),
        }
    }
}

/// Handle to a published message.
///
/// Dropping it keeps the original fire-and-forget behaviour; awaiting [`wait`](Self::wait)
/// yields the outcome once the handler finishes.
#[derive(Debug)]
pub struct DispatchReceipt {
    pub message_id: Uuid,
    pub topic: PipelineName,
    completion: oneshot::Receiver<ProcessingOutcome>,
}

impl DispatchReceipt {
    /// Wait for the processing outcome. `None` if the worker died before reporting.
    pub async fn wait(self) -> Option<ProcessingOutcome> {
        self.completion.await.ok()
    }
}

struct Envelope {
    id: Uuid,
    message: PipelineInitMessage,
    completion: oneshot::Sender<ProcessingOutcome>,
}

struct Topic {
    tx: mpsc::Sender<Envelope>,
    worker: JoinHandle<()>,
}

#[derive(Default)]
struct Topics {
    registered: HashMap<PipelineName, Topic>,
    closed: bool,
}

pub struct Dispatcher {
    config: DispatcherConfig,
    metrics: PipelineMetrics,
    topics: RwLock<Topics>,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            metrics: PipelineMetrics::new(),
            topics: RwLock::new(Topics::default()),
        }
    }

    /// Register the single handler for `topic` and start its worker pool.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn subscribe(
        &self,
        topic: PipelineName,
        handler: Arc<dyn PipelineHandler>,
    ) -> Result<(), SubscribeError> {
        let mut topics = self.topics.write().await;
        if topics.closed {
            return Err(SubscribeError::Closed(topic));
        }
        if topics.registered.contains_key(&topic) {
            return Err(SubscribeError::AlreadySubscribed(topic));
        }

        let (tx, rx) = mpsc::channel(self.config.queue_size);
        let config = self.config.clone();
        let metrics = self.metrics.clone();
        let handler_name = handler.name();

        let worker = tokio::spawn(async move {
            Self::worker_pool(topic, rx, handler, config, metrics).await;
        });

        topics.registered.insert(topic, Topic { tx, worker });

        tracing::info!(
            topic = %topic,
            handler = handler_name,
            queue_size = self.config.queue_size,
            max_concurrent = self.config.max_concurrent,
            "Pipeline handler subscribed"
        );

        Ok(())
    }

    pub async fn has_subscriber(&self, topic: PipelineName) -> bool {
        self.topics.read().await.registered.contains_key(&topic)
    }

    /// Queue `message` on `topic` without waiting for it to be processed.
    #[tracing::instrument(skip_all, fields(topic = %topic))]
    pub async fn publish(
        &self,
        topic: PipelineName,
        message: PipelineInitMessage,
    ) -> Result<DispatchReceipt, PublishError> {
        let topics = self.topics.read().await;
        if topics.closed {
            return Err(PublishError::Closed(topic));
        }
        let Some(registered) = topics.registered.get(&topic) else {
            tracing::warn!(
                topic = %topic,
                source_path = %message.source_path.display(),
                "No subscriber for topic, message not published"
            );
            return Err(PublishError::NoSubscriber(topic));
        };

        let (completion_tx, completion_rx) = oneshot::channel();
        let id = Uuid::new_v4();
        let envelope = Envelope {
            id,
            message,
            completion: completion_tx,
        };

        registered.tx.try_send(envelope).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!(topic = %topic, "Pipeline queue is full, rejecting message");
                PublishError::QueueFull(topic)
            }
            mpsc::error::TrySendError::Closed(_) => PublishError::Closed(topic),
        })?;

        tracing::debug!(topic = %topic, message_id = %id, "Pipeline message published");

        Ok(DispatchReceipt {
            message_id: id,
            topic,
            completion: completion_rx,
        })
    }

    /// Close every topic and wait for queued and in-flight messages to finish.
    pub async fn shutdown(&self) {
        tracing::info!("Initiating dispatcher shutdown");

        let registered = {
            let mut topics = self.topics.write().await;
            topics.closed = true;
            std::mem::take(&mut topics.registered)
        };

        for (topic, Topic { tx, worker }) in registered {
            drop(tx);
            if let Err(e) = worker.await {
                tracing::error!(topic = %topic, error = %e, "Pipeline worker pool panicked");
            }
        }

        tracing::info!("Dispatcher stopped");
    }

    async fn worker_pool(
        topic: PipelineName,
        mut rx: mpsc::Receiver<Envelope>,
        handler: Arc<dyn PipelineHandler>,
        config: DispatcherConfig,
        metrics: PipelineMetrics,
    ) {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent));
        let timeout = Duration::from_secs(config.processing_timeout_secs);

        tracing::info!(topic = %topic, "Pipeline worker pool started");

        while let Some(envelope) = rx.recv().await {
            metrics.record_consumed(topic);
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let handler = handler.clone();
            let metrics = metrics.clone();

            tokio::spawn(async move {
                let _permit = permit;
                let Envelope {
                    id,
                    message,
                    completion,
                } = envelope;
                let outcome =
                    Self::process_message(topic, id, message, handler, timeout, &metrics).await;
                // The uploader usually dropped its receipt long ago.
                let _ = completion.send(outcome);
            });
        }

        // Channel closed: wait for in-flight messages before reporting the pool stopped.
        let _ = semaphore.acquire_many(config.max_concurrent as u32).await;
        tracing::info!(topic = %topic, "Pipeline worker pool stopped");
    }

    #[tracing::instrument(
        skip_all,
        fields(
            topic = %topic,
            message_id = %id,
            handler = handler.name(),
            source_path = %message.source_path.display(),
            original_filename = %message.original_filename,
        )
    )]
    async fn process_message(
        topic: PipelineName,
        id: Uuid,
        message: PipelineInitMessage,
        handler: Arc<dyn PipelineHandler>,
        timeout: Duration,
        metrics: &PipelineMetrics,
    ) -> ProcessingOutcome {
        let start = std::time::Instant::now();
        metrics.record_started(topic);

        let outcome = match tokio::time::timeout(timeout, handler.handle(message)).await {
            Ok(outcome) => outcome,
            Err(_) => ProcessingOutcome::Failed(ProcessingError::timed_out(timeout.as_secs())),
        };

        let elapsed = start.elapsed();
        metrics.record_processed(topic, &outcome, elapsed);

        let duration_ms = elapsed.as_secs_f64() * 1000.0;
        match &outcome {
            ProcessingOutcome::Success(artifact) => tracing::info!(
                dest = %artifact.name,
                size_bytes = artifact.size_bytes,
                duration_ms,
                "Pipeline message processed"
            ),
            ProcessingOutcome::Unimplemented { reason } => tracing::warn!(
                reason = %reason,
                duration_ms,
                "Pipeline message consumed by an unimplemented processor, no output produced"
            ),
            ProcessingOutcome::Failed(err) => tracing::error!(
                error_kind = %err.kind,
                error = %err,
                duration_ms,
                "Pipeline message failed, not retrying"
            ),
        }

        outcome
    }
}
