//! Hangout Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every Hangout media component: the upload classifier, the pipeline dispatcher,
//! the media processors and the HTTP ingestion layer.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, LogFormat, PipelineConfig, TelemetryConfig};
pub use error::{
    AppError, ErrorMetadata, LogLevel, ProcessingError, ProcessingErrorKind, RejectedError,
};
pub use models::{
    PipelineInitMessage, PipelineName, ProcessingOutcome, StoredArtifact, UploadArtifact,
};
