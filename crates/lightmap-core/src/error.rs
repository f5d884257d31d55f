/// Errors produced by the core record helpers.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("identity map key {key:?} is not an unsigned integer")]
    InvalidIdentityKey { key: String },
    #[error("invalid log spec {0:?}")]
    InvalidLogSpec(String),
    #[error(transparent)]
    Logger(#[from] log::SetLoggerError),
    #[error("unknown color name {0:?}")]
    UnknownColor(String),
    #[error("image size mismatch ({left_width}x{left_height} vs {right_width}x{right_height})")]
    ImageSizeMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },
}
