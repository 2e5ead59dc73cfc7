//! Separable Catmull-Rom interpolation over a 4x4 pixel neighbourhood.
//!
//! For a sample point `(xi + dx, yi + dy)` the neighbourhood holds columns
//! `xi-1 ..= xi+2` and rows `yi-1 ..= yi+2`. Each channel is first
//! interpolated down the four rows with weights for `dy`, then across the
//! four column results with weights for `dx`:
//!
//! ```text
//! w(-1) = ((-0.5t + 1.0)t - 0.5)t
//! w( 0) = (1.5t - 2.5)t² + 1.0
//! w( 1) = ((-1.5t + 2.0)t + 0.5)t
//! w( 2) = (0.5t - 0.5)t²
//! ```
//!
//! The weights sum to one for every `t`, and at `t = 0` reduce to
//! `[0, 1, 0, 0]`, so integer sample points reproduce the source exactly.

use lens_core::{Error, Result};

/// Catmull-Rom weights for taps at offsets -1, 0, 1, 2.
#[inline]
pub fn catmull_rom_weights(t: f64) -> [f64; 4] {
    [
        ((-0.5 * t + 1.0) * t - 0.5) * t,
        (1.5 * t - 2.5) * t * t + 1.0,
        ((-1.5 * t + 2.0) * t + 0.5) * t,
        (0.5 * t - 0.5) * t * t,
    ]
}

/// A 4x4 block of source pixels plus the fractional sample offset.
///
/// `data` starts at the top-left pixel (column `xi-1`, row `yi-1`); rows are
/// `stride` bytes apart. Borrowed from a cache region, so it is valid only
/// until the next cache lookup.
#[derive(Debug, Clone, Copy)]
pub struct Neighborhood<'a> {
    data: &'a [u8],
    stride: usize,
    depth: usize,
    dx: f64,
    dy: f64,
}

impl<'a> Neighborhood<'a> {
    /// Creates a neighbourhood view, checking that `data` covers 4x4 pixels.
    pub fn new(data: &'a [u8], stride: usize, depth: usize, dx: f64, dy: f64) -> Result<Self> {
        lens_core::check_depth(depth)?;
        if stride < 4 * depth {
            return Err(Error::InvalidConfig(format!(
                "neighbourhood stride {stride} smaller than 4 pixels of depth {depth}"
            )));
        }
        let expected = 3 * stride + 4 * depth;
        if data.len() < expected {
            return Err(Error::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self::from_parts(data, stride, depth, dx, dy))
    }

    /// Unchecked constructor for callers that own the buffer geometry.
    #[inline]
    pub(crate) fn from_parts(data: &'a [u8], stride: usize, depth: usize, dx: f64, dy: f64) -> Self {
        Self {
            data,
            stride,
            depth,
            dx,
            dy,
        }
    }

    /// Fractional x offset in `[0, 1)`.
    #[inline]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Fractional y offset in `[0, 1)`.
    #[inline]
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Bytes per source pixel.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Sample of channel `c` at neighbourhood position (`col`, `row`), both in `0..4`.
    #[inline]
    pub fn sample(&self, col: usize, row: usize, c: usize) -> u8 {
        self.data[row * self.stride + col * self.depth + c]
    }
}

/// Interpolates one output pixel into `dst`.
///
/// Only `dst.len()` channels are computed, so writing RGB from an RGBA
/// source skips the alpha work entirely. Results are scaled by
/// `brightness`, clamped to `[0, 255]` and rounded.
pub fn interpolate(n: &Neighborhood<'_>, brightness: f64, dst: &mut [u8]) {
    let wy = catmull_rom_weights(n.dy);
    let wx = catmull_rom_weights(n.dx);
    let channels = dst.len().min(n.depth);

    for (c, out) in dst.iter_mut().take(channels).enumerate() {
        let mut acc = 0.0;
        for (col, &w_col) in wx.iter().enumerate() {
            let mut vert = 0.0;
            for (row, &w_row) in wy.iter().enumerate() {
                vert += w_row * n.sample(col, row, c) as f64;
            }
            acc += w_col * vert;
        }
        *out = (acc * brightness).clamp(0.0, 255.0).round() as u8;
    }
}
