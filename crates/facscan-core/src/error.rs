//! Error types for the facscan-core library.

use thiserror::Error;

/// Main error type for the facscan library.
#[derive(Error, Debug)]
pub enum ScanError {
    /// OCR backend error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file that is not valid JSON for [`ScanConfig`](crate::ScanConfig).
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while normalizing a numeric token.
///
/// Extractors treat these as "no value" and move on to the next candidate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing left after stripping currency glyphs and whitespace.
    #[error("empty amount token")]
    Empty,

    /// The normalized token is not a decimal number.
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The backend failed while recognizing text.
    #[error("text recognition failed: {0}")]
    Backend(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Result type for the facscan library.
pub type Result<T> = std::result::Result<T, ScanError>;
