use lightmap_core::CoreError;

/// Errors that make a photograph unusable.
#[derive(thiserror::Error, Debug)]
pub enum GeometryError {
    #[error("degenerate projection angle {angle} rad, camera distance undefined")]
    DegenerateAngle { angle: f64 },
    #[error("camera distance must be finite and positive, got {distance}")]
    InvalidDistance { distance: f64 },
    #[error("camera position on the tree axis")]
    OnTreeAxis,
    #[error("photograph {name:?} has no reliable detections")]
    NoReliableDetections { name: String },
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
