// Separable Gaussian smoothing of a count grid.
//
// Boundary policy is reflect (half-sample symmetric: `d c b a | a b c d`),
// folded periodically when the kernel is wider than the grid. With a
// normalized symmetric kernel this keeps total mass equal to the input count
// up to floating point rounding.

use super::grid::DensityGrid;
use super::MAX_SIGMA;

/// Kernel half-width in standard deviations.
const TRUNCATE: f64 = 4.0;

/// Real-valued cell intensities after smoothing, row-major like [`DensityGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedGrid {
    bins_x: usize,
    bins_y: usize,
    values: Vec<f64>,
}

impl SmoothedGrid {
    pub fn bins_x(&self) -> usize {
        self.bins_x
    }

    pub fn bins_y(&self) -> usize {
        self.bins_y
    }

    pub fn get(&self, ix: usize, iy: usize) -> f64 {
        self.values[iy * self.bins_x + ix]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    pub fn min(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// Normalized 1-D Gaussian weights, `2r + 1` long with `r = round(4σ)`.
///
/// `sigma == 0` yields the identity kernel `[1.0]`. Sigma is capped at
/// [`MAX_SIGMA`].
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    if sigma.is_nan() || sigma <= 0.0 {
        return vec![1.0];
    }
    let sigma = sigma.min(MAX_SIGMA);
    let radius = (TRUNCATE * sigma + 0.5) as i64;
    let two_var = 2.0 * sigma * sigma;
    let raw: Vec<f64> = (-radius..=radius)
        .map(|k| (-((k * k) as f64) / two_var).exp())
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / sum).collect()
}

/// Reflect an out-of-bounds index back into `0..n`.
fn reflect(i: i64, n: usize) -> usize {
    let n = n as i64;
    let m = i.rem_euclid(2 * n);
    if m < n {
        m as usize
    } else {
        (2 * n - 1 - m) as usize
    }
}

/// Convolve every row (`along_x`) or every column with `kernel`.
fn convolve_axis(
    input: &[f64],
    bins_x: usize,
    bins_y: usize,
    kernel: &[f64],
    along_x: bool,
) -> Vec<f64> {
    let radius = (kernel.len() / 2) as i64;
    let mut out = vec![0.0; input.len()];
    for iy in 0..bins_y {
        for ix in 0..bins_x {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let offset = k as i64 - radius;
                let (sx, sy) = if along_x {
                    (reflect(ix as i64 + offset, bins_x), iy)
                } else {
                    (ix, reflect(iy as i64 + offset, bins_y))
                };
                acc += w * input[sy * bins_x + sx];
            }
            out[iy * bins_x + ix] = acc;
        }
    }
    out
}

/// Smooth `grid` with a Gaussian of standard deviation `sigma` cells.
pub fn gaussian_smooth(grid: &DensityGrid, sigma: f64) -> SmoothedGrid {
    let bins_x = grid.bins_x();
    let bins_y = grid.bins_y();
    let values: Vec<f64> = grid.counts().iter().map(|c| f64::from(*c)).collect();

    let kernel = gaussian_kernel(sigma);
    let values = if kernel.len() == 1 {
        values
    } else {
        let rows = convolve_axis(&values, bins_x, bins_y, &kernel, true);
        convolve_axis(&rows, bins_x, bins_y, &kernel, false)
    };

    SmoothedGrid {
        bins_x,
        bins_y,
        values,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
