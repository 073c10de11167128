// Fixed-resolution count grid over the normalized unit square.

use super::{DensityError, Point};

/// Map a normalized coordinate onto a bin index.
///
/// Bins are half-open `[i/n, (i+1)/n)` except the last, which is closed so
/// that `1.0` is counted. Values outside `[0, 1]` (and NaN) have no bin.
pub fn bin_index(v: f64, bins: usize) -> Option<usize> {
    if bins == 0 || !(0.0..=1.0).contains(&v) {
        return None;
    }
    let idx = (v * bins as f64).floor() as usize;
    Some(idx.min(bins - 1))
}

/// Per-cell point counts, stored row-major with row 0 at `y = 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityGrid {
    bins_x: usize,
    bins_y: usize,
    counts: Vec<u32>,
    out_of_range: usize,
}

impl DensityGrid {
    /// An all-zero grid.
    pub fn new(bins_x: usize, bins_y: usize) -> Result<Self, DensityError> {
        if bins_x == 0 || bins_y == 0 {
            return Err(DensityError::ZeroBins { bins_x, bins_y });
        }
        Ok(Self {
            bins_x,
            bins_y,
            counts: vec![0; bins_x * bins_y],
            out_of_range: 0,
        })
    }

    /// Count already-normalized points into a new grid.
    pub fn from_points(points: &[Point], bins_x: usize, bins_y: usize) -> Result<Self, DensityError> {
        let mut grid = Self::new(bins_x, bins_y)?;
        for p in points {
            grid.add(*p);
        }
        Ok(grid)
    }

    /// Increment the cell containing `p`. Returns false (and records the
    /// point as out of range) when `p` lies outside the unit square.
    pub fn add(&mut self, p: Point) -> bool {
        match self.cell_of(p) {
            Some((ix, iy)) => {
                self.counts[iy * self.bins_x + ix] += 1;
                true
            }
            None => {
                self.out_of_range += 1;
                false
            }
        }
    }

    pub fn cell_of(&self, p: Point) -> Option<(usize, usize)> {
        Some((bin_index(p.x, self.bins_x)?, bin_index(p.y, self.bins_y)?))
    }

    pub fn bins_x(&self) -> usize {
        self.bins_x
    }

    pub fn bins_y(&self) -> usize {
        self.bins_y
    }

    pub fn get(&self, ix: usize, iy: usize) -> u32 {
        self.counts[iy * self.bins_x + ix]
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| u64::from(*c)).sum()
    }

    pub fn max(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn out_of_range(&self) -> usize {
        self.out_of_range
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
