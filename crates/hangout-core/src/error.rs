//! Error types module
//!
//! Two families live here. `RejectedError` and `ProcessingError` are the pipeline's own
//! taxonomy: a rejection is surfaced synchronously to the uploader, a processing error
//! only ever reaches the logs because processing runs after the uploader has been
//! acknowledged. `AppError` unifies whatever reaches the HTTP boundary and describes
//! itself through `ErrorMetadata`.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a saturated queue
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UNSUPPORTED_CONTENT_TYPE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Declared content type matches neither `image/*` nor `video/*`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}: {value}")]
pub struct RejectedError {
    pub reason: String,
    pub value: String,
}

impl RejectedError {
    pub fn unsupported_content_type(value: impl Into<String>) -> Self {
        Self {
            reason: "unsupported content type".to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingErrorKind {
    /// Source unreadable, store unwritable, disk exhausted.
    IoFailure,
    /// Codec decode/encode failure.
    ImageProcessingFailure,
    /// The pipeline exists but has no implementation behind it.
    NotImplemented,
    /// The processor did not finish within the dispatcher's timeout.
    TimedOut,
}

impl ProcessingErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingErrorKind::IoFailure => "io_failure",
            ProcessingErrorKind::ImageProcessingFailure => "image_processing_failure",
            ProcessingErrorKind::NotImplemented => "not_implemented",
            ProcessingErrorKind::TimedOut => "timed_out",
        }
    }
}

impl Display for ProcessingErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a single pipeline message. Never retried.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ProcessingError {
    pub kind: ProcessingErrorKind,
    pub message: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl ProcessingError {
    pub fn new(kind: ProcessingErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn io(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::new(ProcessingErrorKind::IoFailure, message).with_source(source)
    }

    pub fn image(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::new(ProcessingErrorKind::ImageProcessingFailure, message).with_source(source)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ProcessingErrorKind::NotImplemented, message)
    }

    pub fn timed_out(timeout_secs: u64) -> Self {
        Self::new(
            ProcessingErrorKind::TimedOut,
            format!("processing did not finish within {}s", timeout_secs),
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Rejected(#[from] RejectedError),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Rejected(_) => (
            400,
            "UNSUPPORTED_CONTENT_TYPE",
            false,
            Some("Upload an image/* or video/* file"),
            false,
            LogLevel::Debug,
        ),
        AppError::ServiceUnavailable(_) => (
            503,
            "SERVICE_UNAVAILABLE",
            true,
            Some("Wait a few seconds and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Rejected(_) => "Rejected",
            AppError::ServiceUnavailable(_) => "ServiceUnavailable",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Rejected(ref rejected) => {
                format!("Invalid file type: {}", rejected.value)
            }
            AppError::ServiceUnavailable(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
