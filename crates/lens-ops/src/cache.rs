//! Region cache for 4x4 neighbourhood lookups.
//!
//! The cache keeps `N` fixed-size pixel regions, each tagged with the window
//! of anchor pixels it can serve, ordered by recency (index 0 = most
//! recently used). A lookup for point `(x, y)` needs the 4x4 block around
//! anchor `(floor(x), floor(y))`:
//!
//! 1. **Fast path** - region 0 covers the anchor.
//! 2. **Warm path** - another region covers it; that region is rotated to
//!    the front, the others keep their relative order.
//! 3. **Cold path** - the least recently used region is moved to the front,
//!    repositioned so the anchor sits `x_offset`/`y_offset` pixels from its
//!    top-left corner (extending ahead of a left-to-right, top-to-bottom
//!    scan) and refilled from the [`SourceProvider`].
//!
//! # Region geometry
//!
//! ```text
//!  buffer column:   0      1  ...            w-3     w-2  w-1
//!  image column: xmin-1  xmin ...           xmax    xmax+1
//!                 pad    |<-- anchors xmin..xmax-1 -->|  pad
//! ```
//!
//! `xmax = xmin + width - 3`. An anchor `xi` is served when
//! `xmin <= xi < xmax`, which keeps `xi-1 ..= xi+2` inside the buffer.
//! Rows work the same way.
//!
//! # Edge policy
//!
//! Pixels outside `[0, width) x [0, height)` read as zero (black, zero
//! alpha). Edge pixels are **not** extended, so samples near the border are
//! darkened by the missing taps. This is the documented behaviour.
//!
//! # Memory
//!
//! `regions * region_width * region_height * depth` bytes plus one scratch
//! region for partial fills, independent of the image size.

use lens_core::{check_depth, Error, PixelRect, Result, SourceProvider, MAX_DEPTH};
use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::interp::{interpolate, Neighborhood};
use crate::stats::{CacheObserver, CacheStats, FillKind, NoObserver};

/// Default number of cached regions.
pub const DEFAULT_REGIONS: usize = 20;
/// Default region width in pixels.
pub const DEFAULT_REGION_WIDTH: u32 = 40;
/// Default region height in pixels.
pub const DEFAULT_REGION_HEIGHT: u32 = 20;
/// Default distance of a faulting anchor from the region's leading edge.
pub const DEFAULT_OFFSET: u32 = 3;

/// Largest accepted region width or height.
pub const MAX_REGION_SIZE: u32 = 4096;
/// Largest accepted number of regions.
pub const MAX_REGIONS: usize = 4096;
/// Largest accepted total of region buffers, at the deepest pixel format.
pub const MAX_CACHE_BYTES: usize = 256 << 20;

/// Anchors are clamped to `±COORD_LIMIT`; non-finite coordinates map to `-COORD_LIMIT`.
const COORD_LIMIT: i64 = 1 << 30;

/// Region cache geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheConfig {
    /// Number of regions kept resident.
    pub regions: usize,
    /// Region width in pixels, including padding.
    pub region_width: u32,
    /// Region height in pixels, including padding.
    pub region_height: u32,
    /// Columns between a faulting anchor and the region's first anchor column.
    pub x_offset: u32,
    /// Rows between a faulting anchor and the region's first anchor row.
    pub y_offset: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            regions: DEFAULT_REGIONS,
            region_width: DEFAULT_REGION_WIDTH,
            region_height: DEFAULT_REGION_HEIGHT,
            x_offset: DEFAULT_OFFSET,
            y_offset: DEFAULT_OFFSET,
        }
    }
}

impl CacheConfig {
    /// Checks that a repositioned region always contains its anchor.
    ///
    /// Requires `1..=MAX_REGIONS` regions, sides of at most
    /// [`MAX_REGION_SIZE`], `size >= offset + 4` on each axis, and no more
    /// than [`MAX_CACHE_BYTES`] of buffers for 4-byte pixels.
    pub fn validate(&self) -> Result<()> {
        if self.regions == 0 {
            return Err(Error::InvalidConfig("region cache needs at least one region".into()));
        }
        if self.regions > MAX_REGIONS {
            return Err(Error::InvalidConfig(format!(
                "{} regions exceeds the limit of {MAX_REGIONS}",
                self.regions
            )));
        }
        if self.region_width > MAX_REGION_SIZE || self.region_height > MAX_REGION_SIZE {
            return Err(Error::InvalidConfig(format!(
                "region {}x{} exceeds {MAX_REGION_SIZE} pixels per side",
                self.region_width, self.region_height
            )));
        }
        if (self.region_width as u64) < self.x_offset as u64 + 4 {
            return Err(Error::InvalidConfig(format!(
                "region width {} too small for x offset {} (need at least {})",
                self.region_width,
                self.x_offset,
                self.x_offset as u64 + 4
            )));
        }
        if (self.region_height as u64) < self.y_offset as u64 + 4 {
            return Err(Error::InvalidConfig(format!(
                "region height {} too small for y offset {} (need at least {})",
                self.region_height,
                self.y_offset,
                self.y_offset as u64 + 4
            )));
        }
        match self.checked_memory_bytes(MAX_DEPTH) {
            Some(bytes) if bytes <= MAX_CACHE_BYTES => Ok(()),
            _ => Err(Error::InvalidConfig(format!(
                "{} regions of {}x{} exceed the {MAX_CACHE_BYTES}-byte cache limit",
                self.regions, self.region_width, self.region_height
            ))),
        }
    }

    /// Bytes held by the region buffers for a given pixel depth.
    ///
    /// Saturates at `usize::MAX` instead of overflowing.
    pub fn memory_bytes(&self, depth: usize) -> usize {
        self.checked_memory_bytes(depth).unwrap_or(usize::MAX)
    }

    fn checked_memory_bytes(&self, depth: usize) -> Option<usize> {
        self.regions.checked_mul(self.region_bytes(depth)?)
    }

    fn region_bytes(&self, depth: usize) -> Option<usize> {
        (self.region_width as usize)
            .checked_mul(self.region_height as usize)?
            .checked_mul(depth)
    }
}

/// Anchor window of a region: anchors `xmin..xmax` by `ymin..ymax` (max exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    /// First anchor column.
    pub xmin: i64,
    /// One past the last anchor column; `xmin + region_width - 3`.
    pub xmax: i64,
    /// First anchor row.
    pub ymin: i64,
    /// One past the last anchor row; `ymin + region_height - 3`.
    pub ymax: i64,
}

impl RegionBounds {
    /// Bounds that contain no anchor.
    pub const EMPTY: RegionBounds = RegionBounds {
        xmin: 0,
        xmax: 0,
        ymin: 0,
        ymax: 0,
    };

    fn new(xmin: i64, ymin: i64, width: u32, height: u32) -> Self {
        Self {
            xmin,
            xmax: xmin + width as i64 - 3,
            ymin,
            ymax: ymin + height as i64 - 3,
        }
    }

    /// Returns `true` if the 4x4 block around anchor (`xi`, `yi`) is resident.
    #[inline]
    pub fn contains_anchor(&self, xi: i64, yi: i64) -> bool {
        xi >= self.xmin && xi < self.xmax && yi >= self.ymin && yi < self.ymax
    }

    /// Returns `true` for [`RegionBounds::EMPTY`]-like bounds.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xmin >= self.xmax || self.ymin >= self.ymax
    }
}

/// One cached region: a padded pixel buffer and the anchors it serves.
#[derive(Debug)]
struct CacheRegion {
    buffer: Vec<u8>,
    bounds: RegionBounds,
}

/// Splits a coordinate into a clamped integer anchor and fractional offset.
#[inline]
fn split(v: f64) -> (i64, f64) {
    if !v.is_finite() {
        return (-COORD_LIMIT, 0.0);
    }
    let floor = v.floor();
    let anchor = floor.clamp(-COORD_LIMIT as f64, COORD_LIMIT as f64) as i64;
    (anchor, v - floor)
}

/// LRU cache of padded source regions serving 4x4 neighbourhoods.
///
/// Owns its [`SourceProvider`]; one cache belongs to one render pass.
pub struct RegionCache<S, O = NoObserver> {
    regions: Vec<CacheRegion>,
    config: CacheConfig,
    source: S,
    image: PixelRect,
    depth: usize,
    stride: usize,
    scratch: Vec<u8>,
    stats: CacheStats,
    observer: O,
}

impl<S: SourceProvider> RegionCache<S> {
    /// Creates a cache over `source` and seeds the front region at the origin.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid configuration, an unsupported source
    /// depth, an image too large to address, or a failing seed fetch.
    pub fn new(source: S, config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let depth = source.depth();
        check_depth(depth)?;
        let image = source.bounds();
        let (width, height) = (image.width, image.height);
        if width as i64 > COORD_LIMIT || height as i64 > COORD_LIMIT {
            return Err(Error::InvalidConfig(format!(
                "image {width}x{height} exceeds addressable size {COORD_LIMIT}"
            )));
        }

        // Bounded by MAX_CACHE_BYTES after validate.
        let region_bytes = config.region_width as usize * config.region_height as usize * depth;
        let regions = (0..config.regions)
            .map(|_| CacheRegion {
                buffer: vec![0; region_bytes],
                bounds: RegionBounds::EMPTY,
            })
            .collect();

        let mut cache = Self {
            regions,
            config,
            source,
            image,
            depth,
            stride: config.region_width as usize * depth,
            scratch: vec![0; region_bytes],
            stats: CacheStats::default(),
            observer: NoObserver,
        };

        debug!(
            "region cache: {} x {}x{} regions, depth {}, {} bytes for {}x{} image",
            config.regions,
            config.region_width,
            config.region_height,
            depth,
            cache.memory_bytes(),
            width,
            height
        );

        cache.fill_front(RegionBounds::new(0, 0, config.region_width, config.region_height))?;
        cache.stats = CacheStats::default();
        Ok(cache)
    }
}

impl<S: SourceProvider, O: CacheObserver> RegionCache<S, O> {
    /// Replaces the observer, keeping all cached state.
    pub fn with_observer<O2: CacheObserver>(self, observer: O2) -> RegionCache<S, O2> {
        RegionCache {
            regions: self.regions,
            config: self.config,
            source: self.source,
            image: self.image,
            depth: self.depth,
            stride: self.stride,
            scratch: self.scratch,
            stats: self.stats,
            observer,
        }
    }

    /// Returns the 4x4 neighbourhood around `(x, y)`.
    ///
    /// The returned view borrows the front region and is valid until the
    /// next lookup.
    ///
    /// # Errors
    ///
    /// Propagates source provider failures from a cold-path refill. The
    /// cache stays usable afterwards; a retry refetches.
    pub fn fetch_neighborhood(&mut self, x: f64, y: f64) -> Result<Neighborhood<'_>> {
        let (xi, dx) = split(x);
        let (yi, dy) = split(y);
        self.stats.lookups += 1;

        if self.regions[0].bounds.contains_anchor(xi, yi) {
            self.stats.hits_fast += 1;
            self.observer.on_hit(0);
        } else if let Some(pos) = self.regions[1..]
            .iter()
            .position(|r| r.bounds.contains_anchor(xi, yi))
        {
            let slot = pos + 1;
            self.regions[..=slot].rotate_right(1);
            self.stats.hits_warm += 1;
            self.observer.on_hit(slot);
        } else {
            self.fault(xi, yi)?;
        }

        Ok(self.front_neighborhood(xi, yi, dx, dy))
    }

    /// Interpolates the pixel at `(x, y)` into `dst`, scaled by `brightness`.
    ///
    /// `dst.len()` selects how many channels are computed.
    pub fn sample(&mut self, x: f64, y: f64, brightness: f64, dst: &mut [u8]) -> Result<()> {
        let n = self.fetch_neighborhood(x, y)?;
        interpolate(&n, brightness, dst);
        Ok(())
    }

    /// Evicts the LRU region, moves it to the front and refills it around the anchor.
    fn fault(&mut self, xi: i64, yi: i64) -> Result<()> {
        self.regions.rotate_right(1);
        let bounds = RegionBounds::new(
            xi - self.config.x_offset as i64,
            yi - self.config.y_offset as i64,
            self.config.region_width,
            self.config.region_height,
        );

        let kind = match self.fill_front(bounds) {
            Ok(kind) => kind,
            Err(err) => {
                // Send the unusable region back to the LRU end.
                self.regions.rotate_left(1);
                return Err(err);
            }
        };

        self.stats.faults += 1;
        match kind {
            FillKind::Full => {}
            FillKind::Partial => self.stats.edge_fills += 1,
            FillKind::Empty => self.stats.empty_fills += 1,
        }
        let rect = self.buffer_rect(&bounds);
        trace!("cache fault at ({}, {}): {} {:?}", xi, yi, rect, kind);
        self.observer.on_fault(rect, kind);
        Ok(())
    }

    /// Absolute image rectangle stored by a region with `bounds`.
    fn buffer_rect(&self, bounds: &RegionBounds) -> PixelRect {
        PixelRect::new(
            (bounds.xmin - 1) as i32,
            (bounds.ymin - 1) as i32,
            self.config.region_width,
            self.config.region_height,
        )
    }

    /// Loads region 0 for `bounds`, zero-filling whatever lies outside the image.
    fn fill_front(&mut self, bounds: RegionBounds) -> Result<FillKind> {
        let rect = self.buffer_rect(&bounds);
        let depth = self.depth;
        let stride = self.stride;
        let region = &mut self.regions[0];
        region.bounds = RegionBounds::EMPTY;

        let kind = if self.image.contains_rect(&rect) {
            self.source.get_rect(rect, &mut region.buffer)?;
            self.stats.bytes_fetched += region.buffer.len() as u64;
            FillKind::Full
        } else {
            region.buffer.fill(0);
            match self.image.intersect(&rect) {
                None => FillKind::Empty,
                Some(valid) => {
                    let len = valid.area() as usize * depth;
                    let scratch = &mut self.scratch[..len];
                    self.source.get_rect(valid, scratch)?;
                    self.stats.bytes_fetched += len as u64;

                    let row_len = valid.width as usize * depth;
                    let col_start = (valid.x - rect.x) as usize * depth;
                    let row_start = (valid.y - rect.y) as usize;
                    for (i, src_row) in scratch.chunks_exact(row_len).enumerate() {
                        let start = (row_start + i) * stride + col_start;
                        region.buffer[start..start + row_len].copy_from_slice(src_row);
                    }
                    FillKind::Partial
                }
            }
        };

        region.bounds = bounds;
        Ok(kind)
    }

    fn front_neighborhood(&self, xi: i64, yi: i64, dx: f64, dy: f64) -> Neighborhood<'_> {
        let region = &self.regions[0];
        let col = (xi - region.bounds.xmin) as usize;
        let row = (yi - region.bounds.ymin) as usize;
        let start = row * self.stride + col * self.depth;
        Neighborhood::from_parts(&region.buffer[start..], self.stride, self.depth, dx, dy)
    }

    /// Forgets every cached region, e.g. after the source pixels changed.
    pub fn invalidate(&mut self) {
        for region in &mut self.regions {
            region.bounds = RegionBounds::EMPTY;
        }
    }

    /// Bounds of every region in MRU order (index 0 = most recent).
    pub fn region_bounds(&self) -> impl Iterator<Item = RegionBounds> + '_ {
        self.regions.iter().map(|r| r.bounds)
    }

    /// Counters accumulated since construction.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The attached observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// The cache geometry.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Bytes per pixel of the source.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bytes held by region buffers and the scratch buffer.
    pub fn memory_bytes(&self) -> usize {
        self.config.memory_bytes(self.depth) + self.scratch.len()
    }

    /// The source provider.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the source provider.
    ///
    /// Resident regions are not refreshed; call [`invalidate`](Self::invalidate)
    /// if the source pixels change.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
