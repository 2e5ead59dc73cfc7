//! # lens-io
//!
//! Image I/O and pixel sources for lens-rs.
//!
//! - [`ImageData`] - Decoded 8-bit interleaved image
//! - [`read`], [`write`] - File I/O dispatched on extension (PNG)
//! - [`MemorySource`] - Full-resolution [`SourceProvider`](lens_core::SourceProvider)
//! - [`PreviewSource`] - Box-filtered thumbnail source for preview renders
//!
//! # Example
//!
//! ```rust,ignore
//! use lens_io::{read, MemorySource};
//!
//! let image = read("photo.png")?;
//! let source = MemorySource::new(image);
//! ```

#![warn(missing_docs)]

mod error;
pub mod image;
pub mod png;
pub mod source;

use std::path::Path;

pub use error::{IoError, IoResult};
pub use image::ImageData;
pub use source::{preview_size, MemorySource, PreviewSource};

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Portable Network Graphics.
    Png,
    /// Anything else.
    Unknown,
}

impl Format {
    /// Detects the format from a file extension (case-insensitive).
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => Format::Png,
            _ => Format::Unknown,
        }
    }
}

fn unsupported(path: &Path) -> IoError {
    IoError::UnsupportedFormat(
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string(),
    )
}

/// Reads an image, choosing the decoder from the file extension.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageData> {
    let path = path.as_ref();
    match Format::from_extension(path) {
        Format::Png => png::read(path),
        Format::Unknown => Err(unsupported(path)),
    }
}

/// Writes an image, choosing the encoder from the file extension.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageData) -> IoResult<()> {
    let path = path.as_ref();
    match Format::from_extension(path) {
        Format::Png => png::write(path, image),
        Format::Unknown => Err(unsupported(path)),
    }
}
