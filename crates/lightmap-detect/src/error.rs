/// Errors returned by signature decoding and clustering.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("empty brightness sequence")]
    EmptySequence,
    #[error("{frames} frames exceed the {max}-bit signature limit")]
    TooManyFrames { frames: usize, max: usize },
    #[error("non-finite brightness value at frame {frame}")]
    NonFiniteValue { frame: usize },
    #[error("frame data has {actual} values, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    Core(#[from] lightmap_core::CoreError),
}
