// Coordinate normalization: min-max scaling of raw event coordinates into
// the unit square (or a fixed inset of it).

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Point;

/// Wyscout pitch coordinates run 0..100 on both axes.
pub const WYSCOUT_EXTENT: (f64, f64) = (0.0, 100.0);

/// Target interval for the y axis under [`Normalization::InsetRange`].
pub const INSET_RANGE: (f64, f64) = (0.1, 0.9);

/// How raw coordinates are mapped into normalized space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    /// Both axes min-max scaled onto `[0, 1]`.
    #[default]
    FullRange,
    /// x onto `[0, 1]`, y onto `[0.1, 0.9]` so plots sit inside a pitch outline.
    InsetRange,
    /// Fixed Wyscout extents instead of the observed range. Points off the
    /// pitch fall outside `[0, 1]`.
    Pitch,
}

impl Normalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Normalization::FullRange => "full-range",
            Normalization::InsetRange => "inset-range",
            Normalization::Pitch => "pitch",
        }
    }
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized points plus the number of inputs that were discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPoints {
    pub points: Vec<Point>,
    pub dropped_non_finite: usize,
}

// ---------------------------------------------------------------------------
// Axis scaling
// ---------------------------------------------------------------------------

/// Linear map from a source interval to a target interval.
#[derive(Debug, Clone, Copy)]
struct AxisScale {
    min: f64,
    max: f64,
    lo: f64,
    hi: f64,
    clamp: bool,
}

impl AxisScale {
    /// A zero-width source interval maps every value to the target midpoint.
    ///
    /// Differences are taken on halved values so finite inputs spanning more
    /// than `f64::MAX` still map to a finite position.
    fn map(&self, v: f64) -> f64 {
        let midpoint = (self.lo + self.hi) / 2.0;
        let span = self.max / 2.0 - self.min / 2.0;
        if span == 0.0 {
            return midpoint;
        }
        let mapped = self.lo + (self.hi - self.lo) * ((v / 2.0 - self.min / 2.0) / span);
        if mapped.is_nan() {
            return midpoint;
        }
        if self.clamp {
            mapped.clamp(self.lo, self.hi)
        } else {
            mapped
        }
    }
}

fn observed_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Normalize `points` according to `mode`.
///
/// Non-finite points are removed before the observed min/max is computed so
/// a single bad row cannot distort the scaling of every other point.
pub fn normalize(points: &[Point], mode: Normalization) -> NormalizedPoints {
    let finite: Vec<Point> = points.iter().copied().filter(Point::is_finite).collect();
    let dropped_non_finite = points.len() - finite.len();
    if dropped_non_finite > 0 {
        warn!(
            "dropping {} of {} points with non-finite coordinates",
            dropped_non_finite,
            points.len()
        );
    }

    if finite.is_empty() {
        return NormalizedPoints {
            points: Vec::new(),
            dropped_non_finite,
        };
    }

    let (x_scale, y_scale) = match mode {
        Normalization::FullRange | Normalization::InsetRange => {
            let (min_x, max_x) = observed_bounds(finite.iter().map(|p| p.x));
            let (min_y, max_y) = observed_bounds(finite.iter().map(|p| p.y));
            let (y_lo, y_hi) = if mode == Normalization::InsetRange {
                INSET_RANGE
            } else {
                (0.0, 1.0)
            };
            (
                AxisScale { min: min_x, max: max_x, lo: 0.0, hi: 1.0, clamp: true },
                AxisScale { min: min_y, max: max_y, lo: y_lo, hi: y_hi, clamp: true },
            )
        }
        Normalization::Pitch => {
            let (min, max) = WYSCOUT_EXTENT;
            let scale = AxisScale { min, max, lo: 0.0, hi: 1.0, clamp: false };
            (scale, scale)
        }
    };

    let points = finite
        .iter()
        .map(|p| Point::new(x_scale.map(p.x), y_scale.map(p.y)))
        .collect();

    NormalizedPoints {
        points,
        dropped_non_finite,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn full_range_maps_extremes_to_unit_interval() {
        let pts = [Point::new(10.0, -5.0), Point::new(30.0, 5.0), Point::new(20.0, 0.0)];
        let out = normalize(&pts, Normalization::FullRange).points;
        assert_eq!(out[0], Point::new(0.0, 0.0));
        assert_eq!(out[1], Point::new(1.0, 1.0));
        assert!((out[2].x - 0.5).abs() < 1e-12);
        assert!((out[2].y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn inset_range_keeps_y_inside_outline() {
        let pts = [Point::new(0.0, 0.0), Point::new(100.0, 68.0), Point::new(50.0, 34.0)];
        let out = normalize(&pts, Normalization::InsetRange).points;
        assert!((out[0].y - 0.1).abs() < 1e-12);
        assert!((out[1].y - 0.9).abs() < 1e-12);
        assert!((out[2].y - 0.5).abs() < 1e-12);
        assert_eq!(out[1].x, 1.0);
    }

    #[test]
    fn zero_x_range_maps_to_half() {
        let pts = [Point::new(42.0, 1.0), Point::new(42.0, 9.0), Point::new(42.0, 5.0)];
        let out = normalize(&pts, Normalization::FullRange).points;
        assert!(out.iter().all(|p| p.x == 0.5));
        assert_eq!(out[0].y, 0.0);
        assert_eq!(out[1].y, 1.0);
    }

    #[test]
    fn zero_y_range_inset_maps_to_inset_midpoint() {
        let pts = [Point::new(1.0, 7.0), Point::new(2.0, 7.0)];
        let out = normalize(&pts, Normalization::InsetRange).points;
        assert!(out.iter().all(|p| (p.y - 0.5).abs() < 1e-12));
    }

    #[test]
    fn pitch_mode_uses_fixed_extent() {
        let pts = [Point::new(25.0, 75.0), Point::new(110.0, 50.0)];
        let out = normalize(&pts, Normalization::Pitch).points;
        assert_eq!(out[0], Point::new(0.25, 0.75));
        assert!(out[1].x > 1.0);
    }

    #[test]
    fn all_non_finite_yields_empty() {
        let pts = [Point::new(f64::NAN, 1.0), Point::new(2.0, f64::NEG_INFINITY)];
        let out = normalize(&pts, Normalization::FullRange);
        assert!(out.points.is_empty());
        assert_eq!(out.dropped_non_finite, 2);
    }

    #[test]
    fn non_finite_does_not_affect_scaling() {
        let pts = [Point::new(0.0, 0.0), Point::new(f64::INFINITY, 1e9), Point::new(10.0, 10.0)];
        let out = normalize(&pts, Normalization::FullRange).points;
        assert_eq!(out, vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
    }

    #[test]
    fn extreme_finite_range_stays_finite() {
        let pts = [Point::new(-1e308, 0.0), Point::new(0.0, 0.5), Point::new(1e308, 1.0)];
        let out = normalize(&pts, Normalization::FullRange).points;
        assert_eq!(out[0].x, 0.0);
        assert!((out[1].x - 0.5).abs() < 1e-12);
        assert_eq!(out[2].x, 1.0);
        assert!(out.iter().all(Point::is_finite));
    }

    #[test]
    fn extreme_values_in_pitch_mode_stay_finite() {
        let pts = [Point::new(f64::MAX, -f64::MAX)];
        let out = normalize(&pts, Normalization::Pitch).points;
        assert!(out[0].is_finite());
        assert!(out[0].x > 1.0 && out[0].y < 0.0);
    }

    #[test]
    fn serde_names_are_kebab_case() {
        use serde::de::value::{Error, StrDeserializer};
        use serde::de::IntoDeserializer;

        let de: StrDeserializer<'_, Error> = "inset-range".into_deserializer();
        assert_eq!(Normalization::deserialize(de).unwrap(), Normalization::InsetRange);
        assert_eq!(Normalization::Pitch.to_string(), "pitch");
    }

    fn finite_points() -> impl Strategy<Value = Vec<(f64, f64)>> {
        let coord = prop_oneof![-1.0e6..1.0e6f64, prop::num::f64::NORMAL];
        prop::collection::vec((coord.clone(), coord), 1..200)
    }

    proptest! {
        #[test]
        fn full_range_stays_in_unit_square(raw in finite_points()) {
            let pts: Vec<Point> = raw.into_iter().map(Point::from).collect();
            for p in normalize(&pts, Normalization::FullRange).points {
                prop_assert!((0.0..=1.0).contains(&p.x));
                prop_assert!((0.0..=1.0).contains(&p.y));
            }
        }

        #[test]
        fn inset_range_stays_in_inset(raw in finite_points()) {
            let pts: Vec<Point> = raw.into_iter().map(Point::from).collect();
            for p in normalize(&pts, Normalization::InsetRange).points {
                prop_assert!((0.0..=1.0).contains(&p.x));
                prop_assert!((0.1..=0.9).contains(&p.y));
            }
        }

        #[test]
        fn normalization_is_deterministic(raw in finite_points()) {
            let pts: Vec<Point> = raw.into_iter().map(Point::from).collect();
            prop_assert_eq!(
                normalize(&pts, Normalization::FullRange),
                normalize(&pts, Normalization::FullRange)
            );
        }
    }
}
