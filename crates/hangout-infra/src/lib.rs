//! Hangout Infrastructure Library
//!
//! Shared pieces for the HTTP ingestion service:
//! - Middleware (request ID)
//! - Telemetry initialization
//! - Error response body

pub mod error;
pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use error::ErrorResponse;
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use telemetry::{init_telemetry, shutdown_telemetry};
