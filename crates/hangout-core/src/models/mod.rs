//! Data models for the media pipeline
//!
//! `media` holds the artifacts that enter and leave the pipeline; `pipeline` holds the
//! routing key, the event payload and the processing outcome.

mod media;
mod pipeline;

pub use media::*;
pub use pipeline::*;
