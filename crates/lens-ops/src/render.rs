//! Rectangle renderer: distortion mapping, cached lookups, interpolation.
//!
//! For every destination pixel the renderer maps the pixel centre through a
//! [`DistortionCalc`], asks the [`RegionCache`] for the 4x4 neighbourhood
//! around the resulting source point, and interpolates it into the
//! destination [`RasterMut`] with the brightness compensation applied.
//!
//! The scan is row-major, which is the access order the cache's
//! "extend ahead" fault placement is tuned for. Between rows the renderer
//! reports progress and may be cancelled.
//!
//! # Example
//!
//! ```rust
//! use lens_core::RasterMut;
//! use lens_io::{ImageData, MemorySource};
//! use lens_ops::{CacheConfig, LensParams, RegionCache, RenderRect, Renderer};
//!
//! let image = ImageData::filled(64, 48, 3, 90).unwrap();
//! let params = LensParams { main: 30.0, ..Default::default() };
//! let renderer = Renderer::from_params(&params, 64, 48);
//!
//! let mut cache = RegionCache::new(MemorySource::new(image), CacheConfig::default()).unwrap();
//! let mut out = vec![0u8; 64 * 48 * 3];
//! let mut dst = RasterMut::packed(&mut out, 64, 48, 3).unwrap();
//! renderer.render(&mut cache, &mut dst, RenderRect::full(64, 48)).unwrap();
//! ```

use std::ops::ControlFlow;

use lens_core::{Error, RasterMut, Result, SourceProvider};
use lens_io::{ImageData, PreviewSource};
use tracing::debug;

use crate::cache::{CacheConfig, RegionCache};
use crate::distort::{DistortionCalc, LensParams};
use crate::stats::{CacheObserver, CacheStats};

/// Destination rectangle to render, in destination pixel coordinates.
///
/// Output pixel `(i, j)` of the raster is sampled at
/// `(x0 + i * step, y0 + j * step)`; `width` x `height` is the output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRect {
    /// First column.
    pub x0: i32,
    /// First row.
    pub y0: i32,
    /// Output pixels per row.
    pub width: u32,
    /// Output rows.
    pub height: u32,
    /// Distance between sampled destination pixels (1 = every pixel).
    pub step: u32,
}

impl RenderRect {
    /// Rectangle at step 1.
    pub fn new(x0: i32, y0: i32, width: u32, height: u32) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
            step: 1,
        }
    }

    /// Whole image of the given size at step 1.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns the same rectangle sampling every `step`-th pixel.
    pub fn with_step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }
}

/// How a render pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Every row was written.
    Completed,
    /// The progress callback stopped the pass; `rows_done` rows were written.
    Cancelled {
        /// Rows fully written before cancellation.
        rows_done: u32,
    },
}

impl RenderOutcome {
    /// Returns `true` if the pass wrote every row.
    pub fn is_completed(&self) -> bool {
        matches!(self, RenderOutcome::Completed)
    }
}

/// Drives one distortion over a destination rectangle.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    calc: DistortionCalc,
}

impl Renderer {
    /// Creates a renderer for an already computed mapping.
    pub fn new(calc: DistortionCalc) -> Self {
        Self { calc }
    }

    /// Creates a renderer from user parameters for an image of the given size.
    pub fn from_params(params: &LensParams, width: u32, height: u32) -> Self {
        Self::new(DistortionCalc::setup(params, width, height))
    }

    /// The mapping in use.
    pub fn calc(&self) -> &DistortionCalc {
        &self.calc
    }

    /// Renders `rect` into `dst` without progress reporting.
    pub fn render<S, O>(
        &self,
        cache: &mut RegionCache<S, O>,
        dst: &mut RasterMut<'_>,
        rect: RenderRect,
    ) -> Result<RenderOutcome>
    where
        S: SourceProvider,
        O: CacheObserver,
    {
        self.render_with_progress(cache, dst, rect, |_| ControlFlow::Continue(()))
    }

    /// Renders `rect` into `dst`, calling `on_row` with the completed fraction after each row.
    ///
    /// Returning [`ControlFlow::Break`] from `on_row` stops the pass; rows
    /// already written stay written and the cache remains usable.
    ///
    /// Only `min(dst.depth(), source depth)` channels are written per pixel.
    ///
    /// # Errors
    ///
    /// Fails if `step` is zero, if `dst` is smaller than the rectangle, or if
    /// the source provider fails during a cache refill.
    pub fn render_with_progress<S, O, F>(
        &self,
        cache: &mut RegionCache<S, O>,
        dst: &mut RasterMut<'_>,
        rect: RenderRect,
        mut on_row: F,
    ) -> Result<RenderOutcome>
    where
        S: SourceProvider,
        O: CacheObserver,
        F: FnMut(f64) -> ControlFlow<()>,
    {
        if rect.step == 0 {
            return Err(Error::InvalidConfig("render step must be at least 1".into()));
        }
        if dst.width() < rect.width || dst.height() < rect.height {
            return Err(Error::InvalidConfig(format!(
                "destination {}x{} smaller than render rectangle {}x{}",
                dst.width(),
                dst.height(),
                rect.width,
                rect.height
            )));
        }

        debug!(
            "render {}x{} at ({}, {}) step {}",
            rect.width, rect.height, rect.x0, rect.y0, rect.step
        );

        let dst_depth = dst.depth();
        let channels = dst_depth.min(cache.depth());
        let step = rect.step as f64;

        for j in 0..rect.height {
            let dst_y = rect.y0 as f64 + j as f64 * step;
            let Some(row) = dst.row_mut(j) else {
                break;
            };
            for (i, px) in row
                .chunks_exact_mut(dst_depth)
                .take(rect.width as usize)
                .enumerate()
            {
                let dst_x = rect.x0 as f64 + i as f64 * step;
                let mapped = self.calc.map(dst_x, dst_y);
                let brightness = self.calc.brightness(mapped.magnitude);
                cache.sample(mapped.src_x, mapped.src_y, brightness, &mut px[..channels])?;
            }

            if on_row((j + 1) as f64 / rect.height as f64).is_break() {
                debug!("render cancelled after {} of {} rows", j + 1, rect.height);
                return Ok(RenderOutcome::Cancelled { rows_done: j + 1 });
            }
        }

        debug!("render done: {}", cache.stats());
        Ok(RenderOutcome::Completed)
    }
}

/// Output size when sampling `size` pixels every `step` pixels.
fn stepped(size: u32, step: u32) -> u32 {
    size.div_ceil(step.max(1))
}

/// Renders a whole image into a newly allocated [`ImageData`].
///
/// Output has the source dimensions and depth. Returns the image together
/// with the cache counters of the pass.
pub fn render_image<S: SourceProvider>(
    source: S,
    params: &LensParams,
    config: CacheConfig,
) -> Result<(ImageData, CacheStats)> {
    let (width, height) = source.dimensions();
    let depth = source.depth();
    let renderer = Renderer::from_params(params, width, height);
    let mut cache = RegionCache::new(source, config)?;

    let mut output = ImageData::filled(width, height, depth as u32, 0)?;
    renderer.render(&mut cache, &mut output.raster_mut()?, RenderRect::full(width, height))?;

    Ok((output, *cache.stats()))
}

/// Renders a preview of the distortion from a downscaled source.
///
/// The mapping is computed for the preview dimensions, so centre and radius
/// normalisation match the full-size result. With `step > 1` only every
/// `step`-th preview pixel is rendered and the output shrinks accordingly.
pub fn render_preview(
    source: PreviewSource,
    params: &LensParams,
    config: CacheConfig,
    step: u32,
) -> Result<ImageData> {
    if step == 0 {
        return Err(Error::InvalidConfig("preview step must be at least 1".into()));
    }
    let (width, height) = source.dimensions();
    let depth = source.depth();
    let renderer = Renderer::from_params(params, width, height);
    let mut cache = RegionCache::new(source, config)?;

    let out_w = stepped(width, step);
    let out_h = stepped(height, step);
    let mut output = ImageData::filled(out_w, out_h, depth as u32, 0)?;
    renderer.render(
        &mut cache,
        &mut output.raster_mut()?,
        RenderRect::new(0, 0, out_w, out_h).with_step(step),
    )?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_io::MemorySource;

    fn gradient(w: u32, h: u32) -> ImageData {
        ImageData::from_fn(w, h, 1, |x, y, _| (x * 3 + y * 5) as u8).unwrap()
    }

    #[test]
    fn test_stepped_sizes() {
        assert_eq!(stepped(10, 1), 10);
        assert_eq!(stepped(10, 3), 4);
        assert_eq!(stepped(9, 3), 3);
    }

    #[test]
    fn test_identity_render_copies_source() {
        let image = gradient(30, 25);
        let (out, stats) =
            render_image(MemorySource::new(image.clone()), &LensParams::default(), CacheConfig::default())
                .unwrap();
        assert_eq!(out, image);
        assert_eq!(stats.lookups, 30 * 25);
    }

    #[test]
    fn test_subrect_with_step() {
        let image = gradient(40, 40);
        let renderer = Renderer::new(DistortionCalc::identity(40, 40));
        let mut cache = RegionCache::new(MemorySource::new(image.clone()), CacheConfig::default()).unwrap();

        let mut out = vec![0u8; 4 * 3];
        let mut dst = RasterMut::packed(&mut out, 4, 3, 1).unwrap();
        let rect = RenderRect::new(5, 7, 4, 3).with_step(2);
        assert!(renderer.render(&mut cache, &mut dst, rect).unwrap().is_completed());

        for j in 0..3u32 {
            for i in 0..4u32 {
                let expected = image.pixel(5 + 2 * i, 7 + 2 * j).unwrap()[0];
                assert_eq!(out[(j * 4 + i) as usize], expected);
            }
        }
    }

    #[test]
    fn test_respects_destination_stride() {
        let image = gradient(8, 8);
        let renderer = Renderer::new(DistortionCalc::identity(8, 8));
        let mut cache = RegionCache::new(MemorySource::new(image), CacheConfig::default()).unwrap();

        let mut out = vec![0xAAu8; 2 * 6];
        let mut dst = RasterMut::new(&mut out, 2, 2, 1, 6).unwrap();
        renderer.render(&mut cache, &mut dst, RenderRect::new(1, 1, 2, 2)).unwrap();
        // Padding bytes after each row are untouched.
        assert_eq!(&out[..6], &[8, 11, 0xAA, 0xAA, 0xAA, 0xAA]);
        assert_eq!(&out[6..8], &[13, 16]);
    }

    #[test]
    fn test_progress_reports_each_row() {
        let image = gradient(10, 4);
        let renderer = Renderer::new(DistortionCalc::identity(10, 4));
        let mut cache = RegionCache::new(MemorySource::new(image), CacheConfig::default()).unwrap();
        let mut out = vec![0u8; 40];
        let mut dst = RasterMut::packed(&mut out, 10, 4, 1).unwrap();

        let mut seen = Vec::new();
        renderer
            .render_with_progress(&mut cache, &mut dst, RenderRect::full(10, 4), |p| {
                seen.push(p);
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(seen, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_rejects_bad_rect() {
        let renderer = Renderer::new(DistortionCalc::identity(4, 4));
        let mut cache =
            RegionCache::new(MemorySource::new(gradient(4, 4)), CacheConfig::default()).unwrap();
        let mut out = vec![0u8; 16];
        let mut dst = RasterMut::packed(&mut out, 4, 4, 1).unwrap();
        assert!(renderer
            .render(&mut cache, &mut dst, RenderRect::full(4, 4).with_step(0))
            .is_err());
        assert!(renderer.render(&mut cache, &mut dst, RenderRect::full(5, 4)).is_err());
    }

    #[test]
    fn test_preview_render_size() {
        let image = ImageData::filled(200, 100, 3, 60).unwrap();
        let preview = PreviewSource::from_image(&image, 50).unwrap();
        let out = render_preview(preview, &LensParams::default(), CacheConfig::default(), 2).unwrap();
        assert_eq!((out.width, out.height, out.channels), (25, 13, 3));
        assert!(out.data.iter().all(|&v| v == 60));
    }
}
