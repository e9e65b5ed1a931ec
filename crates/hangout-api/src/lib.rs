//! Hangout API Library
//!
//! The HTTP ingestion boundary: accepts uploads, hands them to the media pipeline
//! and acknowledges immediately.

pub mod error;
mod handlers;
pub mod setup;
pub mod state;

// Re-exports
pub use error::HttpAppError;
pub use state::AppState;
