use lightmap_core::CoreError;
use lightmap_detect::DetectError;

/// Errors produced by the facade helpers.
///
/// Failures of a single photograph inside [`crate::ReconstructionPipeline::run`]
/// are recorded in the report instead.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
}
