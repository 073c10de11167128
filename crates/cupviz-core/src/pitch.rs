// Soccer pitch geometry: the pixel rectangle a plot occupies and the
// Wyscout-convention markings drawn into it.
//
// Wyscout coordinates run 0..100 on both axes: x along the length from the
// left goal line, y across the width from the top touchline.

use image::Rgba;

use crate::canvas::{rgb, Canvas};

/// Real pitch dimensions in metres, used for aspect ratio and circle radii.
pub const PITCH_LENGTH_M: f64 = 105.0;
pub const PITCH_WIDTH_M: f64 = 68.0;
const CIRCLE_RADIUS_M: f64 = 9.15;

// Marking positions in Wyscout units.
const PENALTY_BOX_DEPTH: f64 = 16.0;
const PENALTY_BOX_Y: (f64, f64) = (19.0, 81.0);
const SIX_YARD_DEPTH: f64 = 6.0;
const SIX_YARD_Y: (f64, f64) = (37.0, 63.0);
const PENALTY_SPOT: f64 = 10.0;
const GOAL_Y: (f64, f64) = (45.0, 55.0);
const GOAL_DEPTH: f64 = 1.5;

pub const DARK_PITCH: Rgba<u8> = rgb(0x22, 0x31, 0x2b);
pub const DARK_LINES: Rgba<u8> = rgb(0xc7, 0xd5, 0xcc);
pub const GRASS: Rgba<u8> = rgb(0x5a, 0x9e, 0x3c);
pub const GRASS_STRIPE: Rgba<u8> = rgb(0x52, 0x93, 0x36);

// ---------------------------------------------------------------------------
// Plot area
// ---------------------------------------------------------------------------

/// Axis-aligned pixel rectangle with unit-square coordinates: `u` runs left
/// to right and `v` top to bottom, both over `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Largest rectangle with `aspect` (width / height) that fits inside the
    /// `width` x `height` canvas after `margins` (left, top, right, bottom),
    /// centred in the remaining space.
    pub fn fit(width: u32, height: u32, margins: (f64, f64, f64, f64), aspect: f64) -> Self {
        let (ml, mt, mr, mb) = margins;
        let avail_w = (f64::from(width) - ml - mr).max(1.0);
        let avail_h = (f64::from(height) - mt - mb).max(1.0);
        let (w, h) = if avail_w / avail_h > aspect {
            (avail_h * aspect, avail_h)
        } else {
            (avail_w, avail_w / aspect)
        };
        Self::new(ml + (avail_w - w) / 2.0, mt + (avail_h - h) / 2.0, w, h)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Pixel position of unit coordinates `(u, v)`.
    pub fn to_px(&self, u: f64, v: f64) -> (f64, f64) {
        (self.left + u * self.width, self.top + v * self.height)
    }

    /// Pixel position of a Wyscout coordinate.
    pub fn wyscout(&self, x: f64, y: f64) -> (f64, f64) {
        self.to_px(x / 100.0, y / 100.0)
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.left && px <= self.right() && py >= self.top && py <= self.bottom()
    }
}

// ---------------------------------------------------------------------------
// Markings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchStyle {
    pub surface: Rgba<u8>,
    /// Alternate mowing stripe color, if any.
    pub stripe: Option<Rgba<u8>>,
    pub line: Rgba<u8>,
    pub line_width: f64,
}

impl PitchStyle {
    /// Dark green-gray surface with pale lines.
    pub fn dark() -> Self {
        Self {
            surface: DARK_PITCH,
            stripe: None,
            line: DARK_LINES,
            line_width: 2.0,
        }
    }

    /// Striped grass with lines in `line`.
    pub fn grass(line: Rgba<u8>) -> Self {
        Self {
            surface: GRASS,
            stripe: Some(GRASS_STRIPE),
            line,
            line_width: 2.0,
        }
    }
}

const STRIPES: usize = 12;

/// Paint the surface and all markings into `area`.
pub fn draw_pitch(canvas: &mut Canvas, area: &PlotArea, style: &PitchStyle) {
    canvas.fill_rect(area.left, area.top, area.right(), area.bottom(), style.surface);
    if let Some(stripe) = style.stripe {
        for i in (1..STRIPES).step_by(2) {
            let (x0, _) = area.to_px(i as f64 / STRIPES as f64, 0.0);
            let (x1, _) = area.to_px((i + 1) as f64 / STRIPES as f64, 0.0);
            canvas.fill_rect(x0, area.top, x1, area.bottom(), stripe);
        }
    }
    draw_markings(canvas, area, style.line, style.line_width);
}

/// Lines only, for drawing over an existing surface (e.g. a heatmap).
pub fn draw_markings(canvas: &mut Canvas, area: &PlotArea, color: Rgba<u8>, width: f64) {
    let rect = |canvas: &mut Canvas, x0: f64, y0: f64, x1: f64, y1: f64| {
        let (px0, py0) = area.wyscout(x0, y0);
        let (px1, py1) = area.wyscout(x1, y1);
        canvas.stroke_rect(px0, py0, px1, py1, width, color);
    };

    rect(canvas, 0.0, 0.0, 100.0, 100.0);

    let (hx, top) = area.wyscout(50.0, 0.0);
    let (_, bottom) = area.wyscout(50.0, 100.0);
    canvas.line(hx, top, hx, bottom, width, color);

    let (cx, cy) = area.wyscout(50.0, 50.0);
    let rx = area.width * CIRCLE_RADIUS_M / PITCH_LENGTH_M;
    let ry = area.height * CIRCLE_RADIUS_M / PITCH_WIDTH_M;
    canvas.ellipse(cx, cy, rx, ry, width, color);
    canvas.fill_circle(cx, cy, width * 1.5, color);

    for (goal_x, into) in [(0.0, 1.0), (100.0, -1.0)] {
        let box_x = goal_x + into * PENALTY_BOX_DEPTH;
        rect(canvas, goal_x, PENALTY_BOX_Y.0, box_x, PENALTY_BOX_Y.1);
        rect(canvas, goal_x, SIX_YARD_Y.0, goal_x + into * SIX_YARD_DEPTH, SIX_YARD_Y.1);
        rect(canvas, goal_x - into * GOAL_DEPTH, GOAL_Y.0, goal_x, GOAL_Y.1);

        let (sx, sy) = area.wyscout(goal_x + into * PENALTY_SPOT, 50.0);
        canvas.fill_circle(sx, sy, width * 1.5, color);

        // Arc of the penalty circle outside the box.
        let (edge_x, _) = area.wyscout(box_x, 50.0);
        let arc: Vec<(f64, f64)> = (0..=64)
            .map(|i| {
                let a = i as f64 / 64.0 * std::f64::consts::TAU;
                (sx + rx * a.cos(), sy + ry * a.sin())
            })
            .filter(|(px, _)| (px - edge_x) * into > 0.0)
            .collect();
        canvas.polyline(&arc, false, width, color);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
