//! Error types for lens-core operations.
//!
//! One error enum is shared by the core types, the source providers and the
//! rendering pipeline in `lens-ops`. Conditions that the pipeline treats as
//! defined behaviour (out-of-image coordinates, cache thrashing) never show
//! up here; only genuine failures do.
//!
//! # Usage
//!
//! ```rust
//! use lens_core::{Error, Result};
//!
//! fn check_depth(depth: usize) -> Result<()> {
//!     if depth == 0 || depth > 4 {
//!         return Err(Error::UnsupportedDepth(depth));
//!     }
//!     Ok(())
//! }
//! assert!(check_depth(3).is_ok());
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or resampling pixels.
///
/// # Categories
///
/// - **Source errors**: [`Source`](Error::Source), [`Io`](Error::Io)
/// - **Bounds errors**: [`InvalidRegion`](Error::InvalidRegion)
/// - **Setup errors**: [`InvalidConfig`](Error::InvalidConfig),
///   [`BufferSize`](Error::BufferSize), [`UnsupportedDepth`](Error::UnsupportedDepth)
#[derive(Debug, Error)]
pub enum Error {
    /// The pixel source failed to deliver a rectangle.
    ///
    /// Aborts the render pass that triggered the fetch.
    #[error("pixel source failed: {0}")]
    Source(String),

    /// A rectangle request does not fit inside the source image.
    ///
    /// Providers return this when asked for pixels they do not have.
    #[error("region ({x}, {y}, {width}x{height}) exceeds image bounds {image_width}x{image_height}")]
    InvalidRegion {
        /// Region X origin
        x: i32,
        /// Region Y origin
        y: i32,
        /// Region width
        width: u32,
        /// Region height
        height: u32,
        /// Image width
        image_width: u32,
        /// Image height
        image_height: u32,
    },

    /// A cache or render configuration value is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A pixel buffer has the wrong length for its declared shape.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize {
        /// Required length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Bytes per pixel outside the supported 1..=4 range.
    #[error("unsupported pixel depth: {0} bytes per pixel")]
    UnsupportedDepth(usize),

    /// Underlying I/O failure of a source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a [`Error::Source`] from anything printable.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Returns `true` if the error came from the pixel source.
    pub fn is_source_error(&self) -> bool {
        matches!(self, Self::Source(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_region_message() {
        let err = Error::InvalidRegion {
            x: -1,
            y: 4,
            width: 10,
            height: 2,
            image_width: 8,
            image_height: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("-1"));
        assert!(msg.contains("8x8"));
    }

    #[test]
    fn test_source_classification() {
        assert!(Error::source("disk gone").is_source_error());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(Error::from(io).is_source_error());
        assert!(!Error::UnsupportedDepth(7).is_source_error());
    }
}
