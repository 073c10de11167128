// Color palettes and the numeric intensity -> color scale shown in legends.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Maximum number of labelled ticks on a color bar.
pub const MAX_TICKS: usize = 6;

/// Sequential palettes available to heatmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// Black -> red -> yellow -> white.
    #[default]
    Hot,
}

impl Palette {
    /// Color for a fraction `t` in `[0, 1]` (clamped).
    pub fn color(&self, t: f64) -> Rgba<u8> {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            Palette::Hot => hot(t),
        }
    }
}

// Segment breakpoints of the "hot" map.
const HOT_RED_END: f64 = 0.365079;
const HOT_GREEN_END: f64 = 0.746032;
const HOT_RED_START: f64 = 0.0416;

fn ramp(t: f64, start: f64, end: f64) -> f64 {
    ((t - start) / (end - start)).clamp(0.0, 1.0)
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn hot(t: f64) -> Rgba<u8> {
    let r = HOT_RED_START + (1.0 - HOT_RED_START) * ramp(t, 0.0, HOT_RED_END);
    let g = ramp(t, HOT_RED_END, HOT_GREEN_END);
    let b = ramp(t, HOT_GREEN_END, 1.0);
    Rgba([channel(r), channel(g), channel(b), 255])
}

// ---------------------------------------------------------------------------
// Color scale
// ---------------------------------------------------------------------------

/// Linear mapping of intensities `min..=max` onto a palette, plus the tick
/// values a legend labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
    pub palette: Palette,
    pub ticks: Vec<f64>,
}

impl ColorScale {
    pub fn new(min: f64, max: f64, palette: Palette) -> Self {
        Self {
            min,
            max,
            palette,
            ticks: nice_ticks(min, max, MAX_TICKS),
        }
    }

    /// Scale spanning the observed range of `values`. An empty slice gives
    /// the `0..=0` scale.
    pub fn from_values(values: &[f64], palette: Palette) -> Self {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if min > max {
            return Self::new(0.0, 0.0, palette);
        }
        Self::new(min, max, palette)
    }

    /// Position of `v` within the scale; a flat scale maps everything to 0.
    pub fn fraction(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || !v.is_finite() {
            return 0.0;
        }
        ((v - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, v: f64) -> Rgba<u8> {
        self.palette.color(self.fraction(v))
    }
}

// ---------------------------------------------------------------------------
// Tick placement
// ---------------------------------------------------------------------------

/// Round `x` to a 1, 2, 5 or 10 multiple of a power of ten.
fn nice_number(x: f64, round: bool) -> f64 {
    let exp = x.log10().floor();
    let f = x / 10f64.powf(exp);
    let nice = if round {
        if f < 1.5 {
            1.0
        } else if f < 3.0 {
            2.0
        } else if f < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if f <= 1.0 {
        1.0
    } else if f <= 2.0 {
        2.0
    } else if f <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * 10f64.powf(exp)
}

/// Evenly spaced "nice" values inside `[min, max]`, at most `max_ticks` of them.
///
/// A flat range yields the single value `min`.
pub fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if max <= min || max_ticks < 2 {
        return vec![min];
    }

    let mut step = nice_number(nice_number(max - min, false) / (max_ticks - 1) as f64, true);
    loop {
        let first = (min / step).ceil();
        let last = (max / step).floor();
        let count = ((last - first) as i64 + 1).max(0) as usize;
        if count <= max_ticks {
            let decimals = (-step.log10().floor()).max(0.0) as i32;
            let unit = 10f64.powi(decimals);
            return (0..count)
                .map(|i| {
                    // Round to the step's precision to strip noise like 0.6000000000000001.
                    let v = ((first + i as f64) * step * unit).round() / unit;
                    if v == 0.0 {
                        0.0
                    } else {
                        v
                    }
                })
                .collect();
        }
        step = nice_number(step * 1.5, true);
    }
}

/// Compact label for a tick value: integers without a decimal point, others
/// with up to three decimals and trailing zeros removed.
pub fn format_tick(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hot_endpoints() {
        assert_eq!(Palette::Hot.color(0.0), Rgba([11, 0, 0, 255]));
        assert_eq!(Palette::Hot.color(1.0), Rgba([255, 255, 255, 255]));
        assert_eq!(Palette::Hot.color(HOT_RED_END), Rgba([255, 0, 0, 255]));
        assert_eq!(Palette::Hot.color(HOT_GREEN_END), Rgba([255, 255, 0, 255]));
    }

    #[test]
    fn hot_is_monotonic_in_every_channel() {
        let mut prev = Palette::Hot.color(0.0);
        for i in 1..=200 {
            let c = Palette::Hot.color(i as f64 / 200.0);
            for ch in 0..3 {
                assert!(c.0[ch] >= prev.0[ch], "channel {ch} decreased at step {i}");
            }
            prev = c;
        }
    }

    #[test]
    fn out_of_range_fraction_clamped() {
        assert_eq!(Palette::Hot.color(-4.0), Palette::Hot.color(0.0));
        assert_eq!(Palette::Hot.color(9.0), Palette::Hot.color(1.0));
        assert_eq!(Palette::Hot.color(f64::NAN), Palette::Hot.color(0.0));
    }

    #[test]
    fn flat_scale_maps_to_zero() {
        let scale = ColorScale::from_values(&[2.0, 2.0, 2.0], Palette::Hot);
        assert_eq!(scale.fraction(2.0), 0.0);
        assert_eq!(scale.ticks, vec![2.0]);
    }

    #[test]
    fn empty_values_give_zero_scale() {
        let scale = ColorScale::from_values(&[], Palette::Hot);
        assert_eq!((scale.min, scale.max), (0.0, 0.0));
    }

    #[test]
    fn ticks_are_nice_and_inside_range() {
        assert_eq!(nice_ticks(0.0, 1.0, 6), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(nice_ticks(0.0, 10.0, 6), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);

        let ticks = nice_ticks(0.013, 3.87, 6);
        assert!(ticks.len() <= 6 && ticks.len() >= 2);
        assert!(ticks.iter().all(|t| (0.013..=3.87).contains(t)));
    }

    #[test]
    fn tick_labels_are_compact() {
        assert_eq!(format_tick(2.0), "2");
        assert_eq!(format_tick(0.5), "0.5");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(1.0 / 3.0), "0.333");
        assert_eq!(format_tick(-0.0001), "0");
    }
}
