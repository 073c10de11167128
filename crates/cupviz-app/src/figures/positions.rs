// Event positions: every match event as an open hexagon on a schematic pitch.
//
// Coordinates are inset-range normalized. The horizontal axis shows the
// normalized y (`0.1..=0.9`), the vertical axis the normalized x, upwards.

use cupviz_core::canvas::{rgb, rgba, Canvas};
use cupviz_core::density::{normalize, Normalization};
use cupviz_core::pitch::PlotArea;
use cupviz_core::Point;
use image::Rgba;
use tracing::debug;

use super::BLACK;
use crate::figure::Figure;
use crate::visualization::VizError;

const PITCH_FILL: Rgba<u8> = rgba(0, 191, 255, 128);
const MARKER: Rgba<u8> = rgb(128, 128, 128);
const SPOT: Rgba<u8> = rgb(169, 169, 169);
const TRANSPARENT: Rgba<u8> = rgba(0, 0, 0, 0);

/// Penalty spots in plot coordinates.
pub const PENALTY_SPOTS: [(f64, f64); 2] = [(0.185, 0.5), (0.815, 0.5)];

/// Outline rectangles `(u0, v0, u1, v1)`: pitch, penalty boxes, goal boxes.
const OUTLINES: [(f64, f64, f64, f64); 5] = [
    (0.1, 0.0, 0.9, 1.0),
    (0.1, 0.2, 0.22, 0.8),
    (0.1, 0.35, 0.15, 0.65),
    (0.78, 0.2, 0.9, 0.8),
    (0.85, 0.35, 0.9, 0.65),
];

/// Marker radius in pixels for a figure of this size.
fn marker_radius(size: (u32, u32)) -> f64 {
    13.5 * f64::from(size.0.min(size.1)) / 600.0
}

pub fn match_positions(game: &str, points: &[Point], size: (u32, u32)) -> Result<Figure, VizError> {
    let normalized = normalize(points, Normalization::InsetRange);
    debug!(
        game,
        plotted = normalized.points.len(),
        dropped = normalized.dropped_non_finite,
        "event positions"
    );

    let area = PlotArea::new(0.0, 0.0, f64::from(size.0), f64::from(size.1));
    // Plot coordinates have v pointing up.
    let at = |u: f64, v: f64| area.to_px(u, 1.0 - v);
    let line = 2.0;

    let mut canvas = Canvas::new(size.0, size.1, TRANSPARENT);
    let (x0, y0) = at(0.1, 1.0);
    let (x1, y1) = at(0.9, 0.0);
    canvas.fill_rect(x0, y0, x1, y1, PITCH_FILL);

    for (u0, v0, u1, v1) in OUTLINES {
        let (ax, ay) = at(u0, v0);
        let (bx, by) = at(u1, v1);
        canvas.stroke_rect(ax, ay, bx, by, line, BLACK);
    }
    let (hx, top) = at(0.5, 1.0);
    let (_, bottom) = at(0.5, 0.0);
    canvas.line(hx, top, hx, bottom, line, BLACK);

    let (cx, cy) = at(0.5, 0.5);
    canvas.ellipse(cx, cy, 0.05 * area.width, 0.1 * area.height, line, BLACK);

    let r = marker_radius(size);
    for p in &normalized.points {
        let (px, py) = at(p.y, p.x);
        canvas.hexagon(px, py, r, 1.5, MARKER);
        canvas.fill_circle(px, py, 2.0, MARKER);
    }

    for (u, v) in PENALTY_SPOTS {
        let (px, py) = at(u, v);
        canvas.fill_circle(px, py, 2.0, SPOT);
    }

    Ok(Figure::new("match-positions", format!("{game} event positions"), canvas.into_raster()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_drawn_at_swapped_axes() {
        // Two events so both axes have range: normalized (0, 0.1) and (1, 0.9).
        let points = [Point::new(0.0, 0.0), Point::new(100.0, 100.0)];
        let fig = match_positions("ARG-AUS", &points, (600, 600)).unwrap();
        // First event: horizontal 0.1, vertical 0.0 -> centre dot at (60, 600).
        assert_eq!(fig.image.pixel(60, 598), MARKER);
        // Second event: horizontal 0.9, vertical 1.0 -> (540, 0).
        assert_eq!(fig.image.pixel(540, 1), MARKER);
    }

    #[test]
    fn outside_pitch_is_transparent() {
        let fig = match_positions("ARG-AUS", &[], (400, 300)).unwrap();
        assert_eq!(fig.image.pixel(5, 150).0[3], 0);
        // Inside the pitch the fill is translucent blue.
        let inside = fig.image.pixel(120, 150);
        assert!(inside.0[2] > inside.0[0]);
        assert!(inside.0[3] > 0);
    }

    #[test]
    fn penalty_spots_marked() {
        let fig = match_positions("ARG-AUS", &[], (1000, 1000)).unwrap();
        assert_eq!(fig.image.pixel(185, 500), SPOT);
        assert_eq!(fig.image.pixel(815, 500), SPOT);
    }

    #[test]
    fn degenerate_points_plot_at_midpoint() {
        let points = [Point::new(5.0, 5.0); 3];
        let fig = match_positions("ARG-AUS", &points, (600, 600)).unwrap();
        // Both axes collapse to 0.5 -> centre of the canvas.
        assert_eq!(fig.image.pixel(300, 300), MARKER);
    }
}
