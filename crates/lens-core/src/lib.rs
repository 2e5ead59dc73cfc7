//! # lens-core
//!
//! Core types shared by the lens-rs crates.
//!
//! - [`Error`], [`Result`] - Error handling for every pipeline stage
//! - [`PixelRect`] - Signed rectangles for regions that hang off the image
//! - [`Raster`], [`RasterMut`] - Bounds-checked, stride-aware pixel views
//! - [`SourceProvider`] - Random-access pixel rectangle supplier
//!
//! ## Crate Structure
//!
//! ```text
//! lens-core (this crate)
//!    ^
//!    |
//!    +-- lens-io  (PNG I/O, memory and preview sources)
//!    +-- lens-ops (distortion, region cache, cubic resampling, renderer)
//!    +-- lens-cli (the `lens` binary)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod raster;
pub mod rect;
pub mod source;

pub use error::{Error, Result};
pub use raster::{check_depth, Raster, RasterMut, MAX_DEPTH};
pub use rect::PixelRect;
pub use source::{check_request, SourceProvider};
