use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Config(String),
    #[error("Frame source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f64),
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
    #[error("Signal {0} not found")]
    SignalNotFound(u64),
}
