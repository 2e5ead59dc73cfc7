//! Pixel sources backed by decoded images.
//!
//! Two [`SourceProvider`] implementations share the contract the region
//! cache relies on:
//!
//! - [`MemorySource`] serves rectangles of a full-resolution [`ImageData`].
//! - [`PreviewSource`] holds a box-filtered thumbnail of another source and
//!   serves rectangles of that, for quick interactive renders.
//!
//! # Example
//!
//! ```rust
//! use lens_core::{PixelRect, SourceProvider};
//! use lens_io::{ImageData, MemorySource, PreviewSource};
//!
//! let image = ImageData::filled(400, 200, 3, 128).unwrap();
//! let mut full = MemorySource::new(image);
//!
//! let mut buf = vec![0u8; 4 * 4 * 3];
//! full.get_rect(PixelRect::new(10, 10, 4, 4), &mut buf).unwrap();
//!
//! let preview = PreviewSource::from_source(&mut full, 100).unwrap();
//! assert_eq!(preview.dimensions(), (100, 50));
//! ```

use lens_core::{check_request, PixelRect, SourceProvider};
use tracing::debug;

use crate::{ImageData, IoResult};

/// Full-resolution source over an in-memory image.
#[derive(Debug, Clone)]
pub struct MemorySource {
    image: ImageData,
}

impl MemorySource {
    /// Wraps a decoded image.
    #[inline]
    pub fn new(image: ImageData) -> Self {
        Self { image }
    }
}

/// Copies `rect` out of a packed image into `buf`, one row at a time.
fn copy_rect(image: &ImageData, rect: PixelRect, buf: &mut [u8]) -> lens_core::Result<()> {
    let src = image.raster()?;
    check_request((src.width(), src.height()), src.depth(), rect, buf.len())?;
    if rect.is_empty() {
        return Ok(());
    }
    let row_len = rect.width as usize * src.depth();
    let start = rect.x as usize * src.depth();
    for (dst_row, y) in buf.chunks_exact_mut(row_len).zip(rect.y as u32..) {
        if let Some(src_row) = src.row(y) {
            dst_row.copy_from_slice(&src_row[start..start + row_len]);
        }
    }
    Ok(())
}

impl SourceProvider for MemorySource {
    fn dimensions(&self) -> (u32, u32) {
        (self.image.width, self.image.height)
    }

    fn depth(&self) -> usize {
        self.image.depth()
    }

    fn get_rect(&mut self, rect: PixelRect, buf: &mut [u8]) -> lens_core::Result<()> {
        copy_rect(&self.image, rect, buf)
    }
}

/// Downscaled in-memory copy of another source.
///
/// Built once per preview invalidation. The thumbnail fits inside a
/// `max_size x max_size` box with the source aspect ratio preserved; each
/// thumbnail pixel is the rounded mean of the source pixels it covers.
#[derive(Debug, Clone)]
pub struct PreviewSource {
    image: ImageData,
    scale_x: f64,
    scale_y: f64,
}

/// Preview dimensions fitting `width x height` inside `max_size`, never upscaling.
///
/// An image with a zero dimension has an empty preview.
pub fn preview_size(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    let max_size = max_size.max(1);
    if width <= max_size && height <= max_size {
        return (width, height);
    }
    if width >= height {
        let h = (height as u64 * max_size as u64 / width as u64).max(1) as u32;
        (max_size, h)
    } else {
        let w = (width as u64 * max_size as u64 / height as u64).max(1) as u32;
        (w, max_size)
    }
}

/// Source span `[start, end)` covered by preview index `i` of `dst` along an axis of `src`.
#[inline]
fn span(i: u32, dst: u32, src: u32) -> (u32, u32) {
    let start = (i as u64 * src as u64 / dst as u64) as u32;
    let end = (((i as u64 + 1) * src as u64 / dst as u64) as u32).max(start + 1).min(src);
    (start, end)
}

impl PreviewSource {
    /// Builds a thumbnail of `source` that fits inside `max_size`.
    ///
    /// Reads the source in horizontal strips, so at most one strip of
    /// full-resolution rows is resident at a time.
    pub fn from_source<S: SourceProvider + ?Sized>(source: &mut S, max_size: u32) -> IoResult<Self> {
        let (src_w, src_h) = source.dimensions();
        let depth = source.depth();
        let (dst_w, dst_h) = preview_size(src_w, src_h, max_size);
        if dst_w == 0 || dst_h == 0 {
            return Ok(Self {
                image: ImageData::from_u8(0, 0, depth as u32, Vec::new())?,
                scale_x: 1.0,
                scale_y: 1.0,
            });
        }

        let mut data = Vec::with_capacity(dst_w as usize * dst_h as usize * depth);
        let mut strip = Vec::new();
        let mut sums = vec![0u64; depth];

        for py in 0..dst_h {
            let (y0, y1) = span(py, dst_h, src_h);
            let rows = y1 - y0;
            strip.resize(src_w as usize * rows as usize * depth, 0);
            source.get_rect(PixelRect::new(0, y0 as i32, src_w, rows), &mut strip)?;

            for px in 0..dst_w {
                let (x0, x1) = span(px, dst_w, src_w);
                sums.iter_mut().for_each(|s| *s = 0);
                for row in strip.chunks_exact(src_w as usize * depth) {
                    for pixel in row[x0 as usize * depth..x1 as usize * depth].chunks_exact(depth) {
                        for (sum, &v) in sums.iter_mut().zip(pixel) {
                            *sum += v as u64;
                        }
                    }
                }
                let count = (x1 - x0) as u64 * rows as u64;
                data.extend(sums.iter().map(|&s| ((s + count / 2) / count) as u8));
            }
        }

        debug!(
            "preview {}x{} -> {}x{} ({} bytes/pixel)",
            src_w, src_h, dst_w, dst_h, depth
        );

        let image = ImageData::from_u8(dst_w, dst_h, depth as u32, data)?;
        Ok(Self {
            image,
            scale_x: src_w as f64 / dst_w as f64,
            scale_y: src_h as f64 / dst_h as f64,
        })
    }

    /// Builds a thumbnail directly from a decoded image.
    pub fn from_image(image: &ImageData, max_size: u32) -> IoResult<Self> {
        let mut source = MemorySource::new(image.clone());
        Self::from_source(&mut source, max_size)
    }

    /// Source pixels per preview pixel along (x, y).
    #[inline]
    pub fn scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    /// The thumbnail pixels.
    #[inline]
    pub fn image(&self) -> &ImageData {
        &self.image
    }
}

impl SourceProvider for PreviewSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.image.width, self.image.height)
    }

    fn depth(&self) -> usize {
        self.image.depth()
    }

    fn get_rect(&mut self, rect: PixelRect, buf: &mut [u8]) -> lens_core::Result<()> {
        copy_rect(&self.image, rect, buf)
    }
}
