//! Shared helpers for lens-ops integration tests.

#![allow(dead_code)]

use lens_core::{Error, PixelRect, Result, SourceProvider};
use lens_io::{ImageData, MemorySource};
use lens_ops::{interpolate, DistortionCalc, Neighborhood};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Memory source that counts fetches and can be told to fail.
pub struct CountingSource {
    inner: MemorySource,
    pub calls: usize,
    pub bytes: usize,
    pub fail_after: Option<usize>,
}

impl CountingSource {
    pub fn new(image: ImageData) -> Self {
        Self {
            inner: MemorySource::new(image),
            calls: 0,
            bytes: 0,
            fail_after: None,
        }
    }

    /// Fails every fetch after the first `n` successful ones.
    pub fn failing_after(image: ImageData, n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::new(image)
        }
    }
}

impl SourceProvider for CountingSource {
    fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    fn depth(&self) -> usize {
        self.inner.depth()
    }

    fn get_rect(&mut self, rect: PixelRect, buf: &mut [u8]) -> Result<()> {
        if self.fail_after.is_some_and(|n| self.calls >= n) {
            return Err(Error::source(format!("fetch of {rect} refused")));
        }
        self.inner.get_rect(rect, buf)?;
        self.calls += 1;
        self.bytes += buf.len();
        Ok(())
    }
}

/// Image of uniformly random bytes, reproducible from `seed`.
pub fn random_image(width: u32, height: u32, channels: u32, seed: u64) -> ImageData {
    let mut rng = StdRng::seed_from_u64(seed);
    ImageData::from_fn(width, height, channels, |_, _, _| rng.random()).unwrap()
}

/// Samples `image` at (x, y) without any cache, zero outside the image.
pub fn reference_sample(image: &ImageData, x: f64, y: f64, brightness: f64, dst: &mut [u8]) {
    let xf = x.floor();
    let yf = y.floor();
    let depth = image.depth();
    let mut block = vec![0u8; 16 * depth];
    for row in 0..4i64 {
        for col in 0..4i64 {
            let sx = xf as i64 - 1 + col;
            let sy = yf as i64 - 1 + row;
            if sx < 0 || sy < 0 || sx >= image.width as i64 || sy >= image.height as i64 {
                continue;
            }
            let start = ((row * 4 + col) as usize) * depth;
            let px = image.pixel(sx as u32, sy as u32).unwrap();
            block[start..start + depth].copy_from_slice(px);
        }
    }
    let n = Neighborhood::new(&block, 4 * depth, depth, x - xf, y - yf).unwrap();
    interpolate(&n, brightness, dst);
}

/// Renders the whole image through `calc` using [`reference_sample`].
pub fn reference_render(image: &ImageData, calc: &DistortionCalc) -> Vec<u8> {
    let depth = image.depth();
    let mut out = vec![0u8; image.data.len()];
    for y in 0..image.height {
        for x in 0..image.width {
            let m = calc.map(x as f64, y as f64);
            let start = (y as usize * image.width as usize + x as usize) * depth;
            reference_sample(
                image,
                m.src_x,
                m.src_y,
                calc.brightness(m.magnitude),
                &mut out[start..start + depth],
            );
        }
    }
    out
}
