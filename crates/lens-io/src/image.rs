//! In-memory 8-bit images.

use lens_core::{check_depth, Error, Raster, RasterMut};

use crate::IoResult;

/// Decoded image: interleaved 8-bit channels, tightly packed rows.
///
/// The pipeline works on raw bytes, so one byte per channel and
/// `channels` in `1..=4` are the only layouts carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Channels per pixel (1 gray, 2 gray+alpha, 3 RGB, 4 RGBA).
    pub channels: u32,
    /// Raw pixel data, `width * height * channels` bytes.
    pub data: Vec<u8>,
}

impl ImageData {
    /// Wraps existing pixel data, validating its size.
    pub fn from_u8(width: u32, height: u32, channels: u32, data: Vec<u8>) -> IoResult<Self> {
        check_depth(channels as usize)?;
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: data.len(),
            }
            .into());
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Creates an image with every channel of every pixel set to `value`.
    pub fn filled(width: u32, height: u32, channels: u32, value: u8) -> IoResult<Self> {
        let len = width as usize * height as usize * channels as usize;
        Self::from_u8(width, height, channels, vec![value; len])
    }

    /// Creates an image by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn<F>(width: u32, height: u32, channels: u32, mut f: F) -> IoResult<Self>
    where
        F: FnMut(u32, u32, u32) -> u8,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize * channels as usize);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(x, y, c));
                }
            }
        }
        Self::from_u8(width, height, channels, data)
    }

    /// Bytes per pixel.
    #[inline]
    pub fn depth(&self) -> usize {
        self.channels as usize
    }

    /// Pixel bytes at (x, y), or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * self.depth();
        Some(&self.data[start..start + self.depth()])
    }

    /// Read-only raster view of the whole image.
    ///
    /// Fails only if the public fields were edited into an inconsistent
    /// shape after construction.
    pub fn raster(&self) -> lens_core::Result<Raster<'_>> {
        Raster::packed(&self.data, self.width, self.height, self.depth())
    }

    /// Mutable raster view of the whole image.
    pub fn raster_mut(&mut self) -> lens_core::Result<RasterMut<'_>> {
        let (w, h, d) = (self.width, self.height, self.depth());
        RasterMut::packed(&mut self.data, w, h, d)
    }
}
