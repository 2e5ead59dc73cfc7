//! Error types for image I/O.
//!
//! Wraps the core pipeline error so that sources built on top of decoded
//! images report failures through one type.

use std::io;
use thiserror::Error;

/// Image I/O error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported file format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Unsupported bit depth or color type.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(String),

    /// Error from the core types (shape validation, pixel sources).
    #[error(transparent)]
    Core(#[from] lens_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

impl From<IoError> for lens_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Core(inner) => inner,
            IoError::Io(inner) => lens_core::Error::Io(inner),
            other => lens_core::Error::Source(other.to_string()),
        }
    }
}
