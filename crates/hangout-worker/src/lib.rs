//! Hangout Worker Library
//!
//! Decouples upload classification from media processing. A [`Dispatcher`] owns one
//! bounded channel per pipeline topic; each topic has exactly one registered
//! [`PipelineHandler`] draining it through a semaphore-bounded worker pool.

pub mod dispatcher;
pub mod handler;
pub mod metrics;

pub use dispatcher::{
    DispatchReceipt, Dispatcher, DispatcherConfig, PublishError, SubscribeError,
};
pub use handler::PipelineHandler;
pub use metrics::PipelineMetrics;
