//! # lens-ops
//!
//! Lens distortion rendering over a bounded-memory region cache.
//!
//! The source image is never materialised as one surface. Instead a
//! [`RegionCache`] holds a handful of small padded tiles fetched on demand
//! from a [`SourceProvider`](lens_core::SourceProvider), and serves the 4x4
//! neighbourhoods the Catmull-Rom interpolator needs for every output pixel.
//!
//! # Modules
//!
//! - [`distort`] - Lens parameters and the radial mapping
//! - [`cache`] - MRU region cache with zero-filled image edges
//! - [`interp`] - Catmull-Rom weights and 4x4 interpolation
//! - [`render`] - Rectangle renderer, whole-image and preview helpers
//! - [`stats`] - Cache counters and the observer hook
//!
//! # Example
//!
//! ```rust,ignore
//! use lens_io::MemorySource;
//! use lens_ops::{render_image, CacheConfig, LensParams};
//!
//! let params = LensParams { main: 25.0, edge: -10.0, ..Default::default() };
//! let (out, stats) = render_image(MemorySource::new(image), &params, CacheConfig::default())?;
//! println!("{stats}");
//! ```
//!
//! ## Driving the cache directly
//!
//! ```rust,ignore
//! let mut cache = RegionCache::new(source, CacheConfig::default())?;
//! let mut px = [0u8; 3];
//! cache.sample(12.25, 40.5, 1.0, &mut px)?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cache;
pub mod distort;
pub mod interp;
pub mod render;
pub mod stats;

pub use cache::{CacheConfig, RegionBounds, RegionCache};
pub use distort::{DistortionCalc, LensParams, Mapped};
pub use interp::{catmull_rom_weights, interpolate, Neighborhood};
pub use render::{render_image, render_preview, RenderOutcome, RenderRect, Renderer};
pub use stats::{CacheObserver, CacheStats, FillKind, NoObserver, SlotHistogram};
