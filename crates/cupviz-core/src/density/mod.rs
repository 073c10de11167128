// Density field builder: normalize raw event coordinates, bin them into a
// fixed grid and smooth the counts with a Gaussian kernel.

pub mod grid;
pub mod normalize;
pub mod smooth;

pub use grid::{bin_index, DensityGrid};
pub use normalize::{normalize, Normalization, NormalizedPoints};
pub use smooth::{gaussian_kernel, gaussian_smooth, SmoothedGrid};

use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default Gaussian standard deviation, in grid cells.
pub const DEFAULT_SIGMA: f64 = 1.0;

/// Largest accepted sigma. Wider kernels are already flat on every grid the
/// figures use, and the kernel length grows linearly with sigma.
pub const MAX_SIGMA: f64 = 64.0;

/// Grid resolution used for full-pitch match views.
pub const MATCH_BINS: (usize, usize) = (20, 10);

/// Grid resolution used for player-specific views.
pub const PLAYER_BINS: (usize, usize) = (25, 25);

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A raw or normalized 2-D event coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True when both coordinates are finite (not NaN or infinite).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DensityError {
    #[error("grid resolution must be positive, got {bins_x}x{bins_y}")]
    ZeroBins { bins_x: usize, bins_y: usize },

    #[error("smoothing sigma must be finite and within 0..=64, got {0}")]
    InvalidSigma(f64),

    #[error("output image must be at least 1x1 pixels, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
}

/// Parameters for a single density computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityParams {
    pub bins_x: usize,
    pub bins_y: usize,
    pub sigma: f64,
    pub normalization: Normalization,
}

impl DensityParams {
    /// Parameters with the default sigma and full-range normalization.
    pub fn new(bins_x: usize, bins_y: usize) -> Self {
        Self {
            bins_x,
            bins_y,
            sigma: DEFAULT_SIGMA,
            normalization: Normalization::FullRange,
        }
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn validate(&self) -> Result<(), DensityError> {
        if self.bins_x == 0 || self.bins_y == 0 {
            return Err(DensityError::ZeroBins {
                bins_x: self.bins_x,
                bins_y: self.bins_y,
            });
        }
        if !(0.0..=MAX_SIGMA).contains(&self.sigma) {
            return Err(DensityError::InvalidSigma(self.sigma));
        }
        Ok(())
    }
}

/// Result of the normalize -> bin -> smooth pipeline.
#[derive(Debug, Clone)]
pub struct DensityField {
    pub counts: DensityGrid,
    pub smoothed: SmoothedGrid,
    /// Input points rejected for non-finite coordinates.
    pub dropped_non_finite: usize,
}

impl DensityField {
    /// Number of points that landed in a grid cell.
    pub fn binned(&self) -> u64 {
        self.counts.total()
    }

    /// Number of finite points whose normalized coordinates fell outside the grid.
    pub fn out_of_range(&self) -> usize {
        self.counts.out_of_range()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Normalize, bin and smooth `points`.
///
/// The input slice is never modified. An empty input yields an all-zero
/// grid rather than an error.
pub fn build_density_field(
    points: &[Point],
    params: &DensityParams,
) -> Result<DensityField, DensityError> {
    params.validate()?;

    let normalized = normalize(points, params.normalization);
    let counts = DensityGrid::from_points(&normalized.points, params.bins_x, params.bins_y)?;
    let smoothed = gaussian_smooth(&counts, params.sigma);

    debug!(
        input = points.len(),
        binned = counts.total(),
        out_of_range = counts.out_of_range(),
        dropped = normalized.dropped_non_finite,
        "built {}x{} density field",
        params.bins_x,
        params.bins_y
    );

    Ok(DensityField {
        counts,
        smoothed,
        dropped_non_finite: normalized.dropped_non_finite,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-uniform points (LCG) so the test needs no RNG crate.
    fn uniform_points(n: usize, seed: u64) -> Vec<Point> {
        let mut state = seed;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 11) as f64) / ((1u64 << 53) as f64)
        };
        (0..n).map(|_| Point::new(next() * 100.0, next() * 100.0)).collect()
    }

    fn variance(values: &[f64]) -> f64 {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
    }

    #[test]
    fn zero_bins_rejected() {
        let params = DensityParams::new(0, 10);
        let err = build_density_field(&[Point::new(1.0, 1.0)], &params).unwrap_err();
        assert_eq!(err, DensityError::ZeroBins { bins_x: 0, bins_y: 10 });
    }

    #[test]
    fn negative_and_nan_sigma_rejected() {
        let params = DensityParams::new(20, 10).with_sigma(-1.0);
        assert!(matches!(
            build_density_field(&[], &params),
            Err(DensityError::InvalidSigma(_))
        ));
        let params = DensityParams::new(20, 10).with_sigma(f64::NAN);
        assert!(matches!(
            build_density_field(&[], &params),
            Err(DensityError::InvalidSigma(_))
        ));
    }

    #[test]
    fn oversized_sigma_rejected() {
        let params = DensityParams::new(20, 10).with_sigma(1e17);
        assert_eq!(params.validate(), Err(DensityError::InvalidSigma(1e17)));
        assert!(DensityParams::new(20, 10).with_sigma(MAX_SIGMA).validate().is_ok());
    }

    #[test]
    fn extreme_finite_points_are_all_binned() {
        let points = [
            Point::new(-1e308, 0.0),
            Point::new(0.0, 0.5),
            Point::new(1e308, 1.0),
        ];
        let field = build_density_field(&points, &DensityParams::new(20, 10)).unwrap();
        assert_eq!(field.binned(), 3);
        assert_eq!(field.out_of_range(), 0);
        assert_eq!(field.counts.get(0, 0), 1);
        assert_eq!(field.counts.get(10, 5), 1);
        assert_eq!(field.counts.get(19, 9), 1);
    }

    #[test]
    fn empty_input_is_flat_zero_grid() {
        let field = build_density_field(&[], &DensityParams::new(20, 10)).unwrap();
        assert_eq!(field.binned(), 0);
        assert_eq!(field.counts.counts().len(), 200);
        assert!(field.smoothed.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn uniform_hundred_points_match_grid() {
        let points = uniform_points(100, 7);
        let field = build_density_field(&points, &DensityParams::new(20, 10)).unwrap();

        assert_eq!(field.binned(), 100);
        assert!(u64::from(field.counts.max()) <= 100);

        let raw: Vec<f64> = field.counts.counts().iter().map(|c| f64::from(*c)).collect();
        assert!(variance(field.smoothed.values()) < variance(&raw));

        let raw_peak_ratio = f64::from(field.counts.max()) / 100.0;
        let smooth_peak_ratio = field.smoothed.max() / field.smoothed.total();
        assert!(smooth_peak_ratio < raw_peak_ratio);
    }

    #[test]
    fn repeated_center_point_spreads_after_smoothing() {
        let points = vec![Point::new(0.5, 0.5); 50];
        let field = build_density_field(&points, &DensityParams::new(20, 10)).unwrap();

        // Zero range on both axes maps every point to the midpoint (0.5, 0.5).
        let nonzero: Vec<_> = field.counts.counts().iter().filter(|c| **c > 0).collect();
        assert_eq!(nonzero.len(), 1);
        assert_eq!(field.counts.get(10, 5), 50);

        let center = field.smoothed.get(10, 5);
        assert!(field.smoothed.get(9, 5) > 0.0);
        assert!(field.smoothed.get(11, 5) > 0.0);
        assert!(field.smoothed.get(10, 4) > 0.0);
        assert!(field.smoothed.get(10, 6) > 0.0);
        assert!(center / field.smoothed.total() < 1.0);
        assert!(center < 50.0);
    }

    #[test]
    fn non_finite_points_reported_not_propagated() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(f64::NAN, 3.0),
            Point::new(10.0, 10.0),
            Point::new(5.0, f64::INFINITY),
        ];
        let field = build_density_field(&points, &DensityParams::new(2, 2)).unwrap();
        assert_eq!(field.dropped_non_finite, 2);
        assert_eq!(field.binned(), 2);
        assert_eq!(field.counts.get(0, 0), 1);
        assert_eq!(field.counts.get(1, 1), 1);
    }

    #[test]
    fn caller_points_untouched() {
        let points = uniform_points(30, 3);
        let before = points.clone();
        let _ = build_density_field(&points, &DensityParams::new(25, 25)).unwrap();
        assert_eq!(points, before);
    }

    #[test]
    fn identical_input_identical_output() {
        let points = uniform_points(80, 11);
        let params = DensityParams::new(25, 25);
        let a = build_density_field(&points, &params).unwrap();
        let b = build_density_field(&points, &params).unwrap();
        assert_eq!(a.counts, b.counts);
        assert_eq!(a.smoothed, b.smoothed);
    }

    #[test]
    fn pitch_mode_drops_points_off_the_pitch() {
        let points = vec![
            Point::new(50.0, 50.0),
            Point::new(120.0, 50.0),
            Point::new(-3.0, 10.0),
        ];
        let params = DensityParams::new(20, 10).with_normalization(Normalization::Pitch);
        let field = build_density_field(&points, &params).unwrap();
        assert_eq!(field.binned(), 1);
        assert_eq!(field.out_of_range(), 2);
    }
}
