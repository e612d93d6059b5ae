use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
    #[error("invalid submission JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid submission record: {0}")]
    Record(String),
    #[error("image decoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("unsupported image format: {0}")]
    UnsupportedImage(String),
    #[error("font error: {0}")]
    Font(String),
    #[error("drawing failed: {0}")]
    Canvas(String),
}
