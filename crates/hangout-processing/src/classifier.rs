//! Upload classifier: routes an upload to a pipeline by its declared content type.
//!
//! The declared type is caller-supplied and is not checked against the file's bytes.
//! Matching is a case-sensitive prefix test on the raw string.

use hangout_core::{PipelineName, RejectedError, UploadArtifact};

const IMAGE_PREFIX: &str = "image/";
const VIDEO_PREFIX: &str = "video/";

pub fn classify(artifact: &UploadArtifact) -> Result<PipelineName, RejectedError> {
    let content_type = artifact.declared_content_type.as_str();

    if content_type.starts_with(IMAGE_PREFIX) {
        Ok(PipelineName::Image)
    } else if content_type.starts_with(VIDEO_PREFIX) {
        Ok(PipelineName::Video)
    } else {
        Err(RejectedError::unsupported_content_type(content_type))
    }
}
