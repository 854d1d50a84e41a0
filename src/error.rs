use thiserror::Error;

/// Errors raised by drawing-pad operations that touch pixels or files.
#[derive(Debug, Error)]
pub enum PadError {
    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Font unavailable: {0}")]
    Font(String),
}

/// Errors that can occur while exporting the surface as a PNG
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write export: {0}")]
    Write(#[from] std::io::Error),

    #[error("Browser refused the download: {0}")]
    Browser(String),
}

/// Result type for drawing-pad operations
pub type PadResult<T> = Result<T, PadError>;
