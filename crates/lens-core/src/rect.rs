//! Signed pixel rectangles.
//!
//! Cache regions are routinely positioned partly or entirely outside the
//! source image (a distorted lookup can land anywhere), so the origin of a
//! [`PixelRect`] is signed. Right/bottom edges are computed in `i64` so that
//! no combination of origin and size can overflow.
//!
//! # Coordinate System
//!
//! ```text
//! (0,0) ────────► X
//!   │
//!   │   ┌──────────┐
//!   │   │  Image   │
//!   │   └──────────┘
//!   ▼
//!   Y
//! ```
//!
//! Rectangles are inclusive on the left/top edge and exclusive on the
//! right/bottom edge.
//!
//! # Usage
//!
//! ```rust
//! use lens_core::PixelRect;
//!
//! let region = PixelRect::new(-2, -2, 10, 10);
//! let image = PixelRect::from_size(100, 100);
//! assert_eq!(region.intersect(&image), Some(PixelRect::new(0, 0, 8, 8)));
//! ```

/// A rectangle with a signed origin and unsigned dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    /// X coordinate of the left edge (inclusive)
    pub x: i32,
    /// Y coordinate of the top edge (inclusive)
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl PixelRect {
    /// Creates a new rectangle with the given origin and dimensions.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at the origin, e.g. the full extent of an image.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// X coordinate of the right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Y coordinate of the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Area in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if this rectangle fully contains `other`.
    ///
    /// An empty `other` is contained by any rectangle.
    #[inline]
    pub const fn contains_rect(&self, other: &PixelRect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Returns the overlap of two rectangles, or `None` if they are disjoint.
    #[inline]
    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if (x as i64) < right && (y as i64) < bottom {
            Some(PixelRect::new(
                x,
                y,
                (right - x as i64) as u32,
                (bottom - y as i64) as u32,
            ))
        } else {
            None
        }
    }

}

impl std::fmt::Display for PixelRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PixelRect({}, {}, {}x{})",
            self.x, self.y, self.width, self.height
        )
    }
}
