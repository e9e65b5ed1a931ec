//! Hangout media processing
//!
//! Classification of incoming uploads, the JPEG re-encoder, and the pipeline
//! processors subscribed to the dispatcher's image and video topics.

pub mod classifier;
pub mod compression;
pub mod upload;

pub use classifier::classify;
pub use compression::{JPEG_QUALITY, SIZE_THRESHOLD_BYTES};
pub use upload::{
    register_pipelines, ImagePipelineProcessor, UploadAccepted, UploadError, UploadService,
    VideoPipelineProcessor,
};
