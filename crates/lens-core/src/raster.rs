//! Stride-aware views over interleaved 8-bit pixel buffers.
//!
//! [`Raster`] and [`RasterMut`] describe a 2-D block of pixels living in a
//! flat byte slice: `width` pixels of `depth` bytes each per row, rows
//! `stride` bytes apart. Both validate their shape once at construction so
//! that per-pixel access is plain slice indexing with ordinary bounds checks.
//!
//! ```text
//! |<------------- stride ------------->|
//! |<---- width * depth ---->|          |
//! [px][px][px] ...     [px] | padding  |  row 0
//! [px][px][px] ...     [px] | padding  |  row 1
//! ```
//!
//! # Example
//!
//! ```rust
//! use lens_core::RasterMut;
//!
//! let mut buf = vec![0u8; 4 * 2 * 3];
//! let mut out = RasterMut::packed(&mut buf, 4, 2, 3).unwrap();
//! out.pixel_mut(3, 1).unwrap().copy_from_slice(&[1, 2, 3]);
//! assert_eq!(&buf[21..24], &[1, 2, 3]);
//! ```

use crate::{Error, Result};

/// Largest supported number of bytes per pixel (8-bit RGBA).
pub const MAX_DEPTH: usize = 4;

/// Checks that `depth` is in `1..=MAX_DEPTH`.
#[inline]
pub fn check_depth(depth: usize) -> Result<()> {
    if depth == 0 || depth > MAX_DEPTH {
        return Err(Error::UnsupportedDepth(depth));
    }
    Ok(())
}

/// Minimum number of bytes a strided buffer must hold.
#[inline]
fn required_len(width: u32, height: u32, depth: usize, stride: usize) -> usize {
    if width == 0 || height == 0 {
        0
    } else {
        stride * (height as usize - 1) + width as usize * depth
    }
}

fn check_shape(len: usize, width: u32, height: u32, depth: usize, stride: usize) -> Result<()> {
    check_depth(depth)?;
    let row_bytes = width as usize * depth;
    if stride < row_bytes {
        return Err(Error::InvalidConfig(format!(
            "row stride {stride} smaller than row size {row_bytes}"
        )));
    }
    let expected = required_len(width, height, depth, stride);
    if len < expected {
        return Err(Error::BufferSize {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Read-only view of a strided pixel buffer.
#[derive(Debug, Clone, Copy)]
pub struct Raster<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    depth: usize,
    stride: usize,
}

impl<'a> Raster<'a> {
    /// Creates a view with an explicit row stride in bytes.
    pub fn new(data: &'a [u8], width: u32, height: u32, depth: usize, stride: usize) -> Result<Self> {
        check_shape(data.len(), width, height, depth, stride)?;
        Ok(Self {
            data,
            width,
            height,
            depth,
            stride,
        })
    }

    /// Creates a view over tightly packed rows (`stride = width * depth`).
    pub fn packed(data: &'a [u8], width: u32, height: u32, depth: usize) -> Result<Self> {
        Self::new(data, width, height, depth, width as usize * depth)
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Pixel bytes of row `y`, without the stride padding.
    pub fn row(&self, y: u32) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        Some(&self.data[start..start + self.width as usize * self.depth])
    }
}

/// Mutable view of a strided pixel buffer.
///
/// The renderer writes its output through this type; it never owns or
/// allocates the memory behind it.
#[derive(Debug)]
pub struct RasterMut<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
    depth: usize,
    stride: usize,
}

impl<'a> RasterMut<'a> {
    /// Creates a mutable view with an explicit row stride in bytes.
    pub fn new(
        data: &'a mut [u8],
        width: u32,
        height: u32,
        depth: usize,
        stride: usize,
    ) -> Result<Self> {
        check_shape(data.len(), width, height, depth, stride)?;
        Ok(Self {
            data,
            width,
            height,
            depth,
            stride,
        })
    }

    /// Creates a mutable view over tightly packed rows.
    pub fn packed(data: &'a mut [u8], width: u32, height: u32, depth: usize) -> Result<Self> {
        let stride = width as usize * depth;
        Self::new(data, width, height, depth, stride)
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Mutable pixel bytes of row `y`, without the stride padding.
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        let len = self.width as usize * self.depth;
        Some(&mut self.data[start..start + len])
    }

    /// Mutable bytes of the pixel at (x, y), or `None` outside the view.
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        if x >= self.width {
            return None;
        }
        let depth = self.depth;
        let row = self.row_mut(y)?;
        let start = x as usize * depth;
        Some(&mut row[start..start + depth])
    }

}
