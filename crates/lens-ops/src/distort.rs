//! Radial lens distortion mapping.
//!
//! Maps every destination pixel to the source-space point it samples from,
//! using a polynomial radial model around a movable centre:
//!
//! ```text
//! r²   = |p - c|² * 4 / (width² + height²)      (corner -> r² = 1)
//! mag  = r² * square + r⁴ * quad
//! p'   = c + rescale * (1 + mag) * (p - c)
//! ```
//!
//! The same `mag` drives brightness compensation: `1 + mag * brighten`.
//!
//! User input arrives as [`LensParams`] in the UI range `[-100, 100]` and is
//! turned into a [`DistortionCalc`] once per render pass by
//! [`DistortionCalc::setup`]. Out-of-range values are not rejected here.
//!
//! # Example
//!
//! ```rust
//! use lens_ops::distort::{DistortionCalc, LensParams};
//!
//! let params = LensParams { main: 40.0, ..Default::default() };
//! let calc = DistortionCalc::setup(&params, 640, 480);
//!
//! // The centre never moves.
//! let m = calc.map(320.0, 240.0);
//! assert_eq!((m.src_x, m.src_y), (320.0, 240.0));
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// User-facing lens parameters, each nominally in `[-100, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LensParams {
    /// Horizontal centre shift; ±100 puts the centre on the left/right edge.
    pub centre_x: f64,
    /// Vertical centre shift; ±100 puts the centre on the top/bottom edge.
    pub centre_y: f64,
    /// Second-order (r²) distortion amount.
    pub main: f64,
    /// Fourth-order (r⁴) distortion amount, strongest at the edges.
    pub edge: f64,
    /// Zoom; positive values magnify.
    pub zoom: f64,
    /// Corner brightness compensation; negative values brighten where the
    /// radial magnitude is positive.
    pub brighten: f64,
}

/// Result of mapping one destination pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapped {
    /// Source-space x coordinate (may lie outside the image).
    pub src_x: f64,
    /// Source-space y coordinate (may lie outside the image).
    pub src_y: f64,
    /// Radial magnitude `r² * square + r⁴ * quad`.
    pub magnitude: f64,
}

/// Precomputed mapping state for one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionCalc {
    normalize_factor: f64,
    centre_x: f64,
    centre_y: f64,
    square_coeff: f64,
    quad_coeff: f64,
    rescale: f64,
    brighten: f64,
}

impl DistortionCalc {
    /// Identity mapping for an image of the given size, centred.
    ///
    /// Combine with the `with_*` builders to set raw coefficients directly.
    pub fn identity(width: u32, height: u32) -> Self {
        let w = width as f64;
        let h = height as f64;
        let denom = w * w + h * h;
        Self {
            normalize_factor: if denom > 0.0 { 4.0 / denom } else { 0.0 },
            centre_x: w / 2.0,
            centre_y: h / 2.0,
            square_coeff: 0.0,
            quad_coeff: 0.0,
            rescale: 1.0,
            brighten: 0.0,
        }
    }

    /// Derives the mapping state from user parameters (`setup_calc`).
    ///
    /// - centre: `size * (100 + shift) / 200`
    /// - square/quad: `main / 200`, `edge / 200`
    /// - rescale: `2^(-zoom / 100)`
    /// - brighten: `-brighten / 10`
    pub fn setup(params: &LensParams, width: u32, height: u32) -> Self {
        let w = width as f64;
        let h = height as f64;
        Self::identity(width, height)
            .with_centre(
                w * (100.0 + params.centre_x) / 200.0,
                h * (100.0 + params.centre_y) / 200.0,
            )
            .with_coefficients(params.main / 200.0, params.edge / 200.0)
            .with_rescale(2f64.powf(-params.zoom / 100.0))
            .with_brighten(-params.brighten / 10.0)
    }

    /// Sets the distortion centre in pixel coordinates.
    pub fn with_centre(mut self, x: f64, y: f64) -> Self {
        self.centre_x = x;
        self.centre_y = y;
        self
    }

    /// Sets the r² and r⁴ coefficients.
    pub fn with_coefficients(mut self, square: f64, quad: f64) -> Self {
        self.square_coeff = square;
        self.quad_coeff = quad;
        self
    }

    /// Sets the overall zoom factor.
    pub fn with_rescale(mut self, rescale: f64) -> Self {
        self.rescale = rescale;
        self
    }

    /// Sets the brightness compensation coefficient.
    pub fn with_brighten(mut self, brighten: f64) -> Self {
        self.brighten = brighten;
        self
    }

    /// Distortion centre in pixel coordinates.
    pub fn centre(&self) -> (f64, f64) {
        (self.centre_x, self.centre_y)
    }

    /// Overall zoom factor.
    pub fn rescale(&self) -> f64 {
        self.rescale
    }

    /// Returns `true` if [`map`](Self::map) leaves every point in place.
    pub fn is_identity(&self) -> bool {
        self.square_coeff == 0.0 && self.quad_coeff == 0.0 && self.rescale == 1.0
    }

    /// Maps a destination pixel to its source-space sample point.
    #[inline]
    pub fn map(&self, dst_x: f64, dst_y: f64) -> Mapped {
        let off_x = dst_x - self.centre_x;
        let off_y = dst_y - self.centre_y;
        let radius_sq = (off_x * off_x + off_y * off_y) * self.normalize_factor;

        let magnitude = radius_sq * self.square_coeff + radius_sq * radius_sq * self.quad_coeff;
        let radius_mult = self.rescale * (1.0 + magnitude);

        Mapped {
            src_x: self.centre_x + radius_mult * off_x,
            src_y: self.centre_y + radius_mult * off_y,
            magnitude,
        }
    }

    /// Brightness multiplier for a radial magnitude.
    #[inline]
    pub fn brightness(&self, magnitude: f64) -> f64 {
        1.0 + magnitude * self.brighten
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_setup_constants() {
        let params = LensParams {
            centre_x: 50.0,
            centre_y: -100.0,
            main: 20.0,
            edge: -40.0,
            zoom: 100.0,
            brighten: -5.0,
        };
        let calc = DistortionCalc::setup(&params, 300, 400);

        assert_relative_eq!(calc.normalize_factor, 4.0 / 250_000.0);
        assert_eq!(calc.centre(), (225.0, 0.0));
        assert_relative_eq!(calc.square_coeff, 0.1);
        assert_relative_eq!(calc.quad_coeff, -0.2);
        assert_relative_eq!(calc.rescale(), 0.5);
        assert_relative_eq!(calc.brighten, 0.5);
    }

    #[test]
    fn test_default_params_are_identity() {
        let calc = DistortionCalc::setup(&LensParams::default(), 101, 57);
        assert!(calc.is_identity());
        for &(x, y) in &[(0.0, 0.0), (100.0, 56.0), (13.0, 41.0), (-7.0, 300.0)] {
            let m = calc.map(x, y);
            assert_eq!((m.src_x, m.src_y), (x, y));
            assert_eq!(m.magnitude, 0.0);
        }
    }

    #[test]
    fn test_corner_has_unit_radius() {
        let calc = DistortionCalc::identity(200, 100).with_coefficients(1.0, 0.0);
        // Corner is half the diagonal away from the centre, so r² = 1.
        let m = calc.map(0.0, 0.0);
        assert_relative_eq!(m.magnitude, 1.0, epsilon = 1e-12);
        // radius_mult = 2 doubles the offset from the centre.
        assert_relative_eq!(m.src_x, -100.0, epsilon = 1e-9);
        assert_relative_eq!(m.src_y, -50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_quad_term_uses_r4() {
        let calc = DistortionCalc::identity(200, 100).with_coefficients(0.0, 0.5);
        // Halfway to the corner along the diagonal: r² = 0.25, r⁴ = 0.0625.
        let m = calc.map(50.0, 25.0);
        assert_relative_eq!(m.magnitude, 0.5 * 0.0625, epsilon = 1e-12);
    }

    #[test]
    fn test_positive_zoom_magnifies() {
        let params = LensParams { zoom: 100.0, ..Default::default() };
        let calc = DistortionCalc::setup(&params, 100, 100);
        let m = calc.map(100.0, 50.0);
        // Sampling closer to the centre enlarges the picture.
        assert_relative_eq!(m.src_x, 75.0);
        assert_relative_eq!(m.src_y, 50.0);
    }

    #[test]
    fn test_brightness_follows_magnitude() {
        let params = LensParams { brighten: -10.0, ..Default::default() };
        let calc = DistortionCalc::setup(&params, 10, 10);
        assert_relative_eq!(calc.brightness(0.0), 1.0);
        assert_relative_eq!(calc.brightness(0.5), 1.5);
        assert_relative_eq!(calc.brightness(-0.5), 0.5);
    }

    #[test]
    fn test_empty_image_does_not_produce_nan() {
        let calc = DistortionCalc::identity(0, 0).with_coefficients(1.0, 1.0);
        let m = calc.map(3.0, 4.0);
        assert!(m.src_x.is_finite() && m.src_y.is_finite());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_params_yaml_defaults_missing_fields() {
        let params: LensParams = serde_yaml::from_str("main: 25\nbrighten: -3.5\n").unwrap();
        assert_eq!(params.main, 25.0);
        assert_eq!(params.brighten, -3.5);
        assert_eq!(params.centre_x, 0.0);
    }
}
