use lightmap_photo::GeometryError;

#[derive(thiserror::Error, Debug)]
pub enum TriangulationError {
    #[error("triangulation needs two or three photographs, got {got}")]
    CameraCount { got: usize },
    #[error("photographs {first:?} and {second:?} share no reliable lights")]
    NoSharedLights { first: String, second: String },
    #[error("angle sweep between {first:?} and {second:?} found no peak")]
    NoPeaks { first: String, second: String },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
