//! The pixel source abstraction consumed by the region cache.
//!
//! A [`SourceProvider`] hands out raw, row-major pixel rectangles in absolute
//! image coordinates. It is the only way the resampling pipeline ever sees
//! source pixels, which is what lets the cache keep memory bounded for
//! images that are never resident as one surface.
//!
//! # Contract
//!
//! - Callers only request rectangles fully inside
//!   `[0, width) x [0, height)`; anything outside is the caller's business
//!   (the region cache zero-fills it).
//! - `buf` holds exactly `rect.width * rect.height * depth` bytes and is
//!   filled row by row with no padding.
//! - Failures are reported through [`Error`](crate::Error) and abort the
//!   render pass.

use crate::{Error, PixelRect, Result};

/// Random-access supplier of pixel rectangles.
pub trait SourceProvider {
    /// Image dimensions (width, height) in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Bytes per pixel; constant for the lifetime of the source.
    fn depth(&self) -> usize;

    /// Fills `buf` with the pixels of `rect`, row-major, no padding.
    ///
    /// # Errors
    ///
    /// Returns an error if the rectangle is outside the image, if `buf`
    /// has the wrong size, or if the underlying storage fails.
    fn get_rect(&mut self, rect: PixelRect, buf: &mut [u8]) -> Result<()>;

    /// Full extent of the image as a rectangle.
    fn bounds(&self) -> PixelRect {
        let (w, h) = self.dimensions();
        PixelRect::from_size(w, h)
    }
}

impl<S: SourceProvider + ?Sized> SourceProvider for &mut S {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn depth(&self) -> usize {
        (**self).depth()
    }

    fn get_rect(&mut self, rect: PixelRect, buf: &mut [u8]) -> Result<()> {
        (**self).get_rect(rect, buf)
    }
}

/// Validates a `get_rect` request against the source bounds and buffer size.
///
/// Shared by provider implementations so they all reject bad requests the
/// same way.
pub fn check_request(source_size: (u32, u32), depth: usize, rect: PixelRect, buf_len: usize) -> Result<()> {
    let (width, height) = source_size;
    if !PixelRect::from_size(width, height).contains_rect(&rect) {
        return Err(Error::InvalidRegion {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            image_width: width,
            image_height: height,
        });
    }
    let expected = rect.area() as usize * depth;
    if buf_len != expected {
        return Err(Error::BufferSize {
            expected,
            actual: buf_len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_request_accepts_inside() {
        assert!(check_request((10, 10), 3, PixelRect::new(2, 3, 8, 7), 8 * 7 * 3).is_ok());
    }

    #[test]
    fn test_check_request_rejects_outside() {
        let err = check_request((10, 10), 1, PixelRect::new(-1, 0, 4, 4), 16).unwrap_err();
        assert!(matches!(err, Error::InvalidRegion { x: -1, .. }));
        let err = check_request((10, 10), 1, PixelRect::new(8, 8, 4, 4), 16).unwrap_err();
        assert!(matches!(err, Error::InvalidRegion { .. }));
    }

    #[test]
    fn test_check_request_rejects_wrong_buffer() {
        let err = check_request((10, 10), 2, PixelRect::new(0, 0, 2, 2), 7).unwrap_err();
        assert!(matches!(err, Error::BufferSize { expected: 8, actual: 7 }));
    }
}
