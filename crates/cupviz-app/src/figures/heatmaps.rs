// Density heatmaps over a pitch: the whole-match view and the single-player
// view with portrait.

use cupviz_core::canvas::Canvas;
use cupviz_core::heatmap::{build_density_image, paint_colorbar, paint_heatmap};
use cupviz_core::pitch::{self, PitchStyle, PlotArea, PITCH_LENGTH_M, PITCH_WIDTH_M};
use cupviz_core::density::normalize::WYSCOUT_EXTENT;
use cupviz_core::{DensityParams, Point};
use cupviz_data::PlayerEvent;
use image::RgbaImage;
use tracing::debug;

use super::{draw_title, overlay_portrait, title_band, title_scale, LABEL_LIGHT, WHITE};
use crate::figure::Figure;
use crate::visualization::VizError;

const PITCH_ASPECT: f64 = PITCH_LENGTH_M / PITCH_WIDTH_M;
const COLORBAR_WIDTH: f64 = 16.0;
const COLORBAR_GAP: f64 = 20.0;
/// Room right of the pitch for the bar and its tick labels.
const COLORBAR_BAND: f64 = 110.0;

/// Pitch area plus a color bar of `shrink` times its height, vertically centred.
fn layout(size: (u32, u32), top: f64, shrink: f64) -> (PlotArea, PlotArea) {
    let area = PlotArea::fit(size.0, size.1, (20.0, top, COLORBAR_BAND, 20.0), PITCH_ASPECT);
    let bar_height = area.height * shrink;
    let bar = PlotArea::new(
        area.right() + COLORBAR_GAP,
        area.top + (area.height - bar_height) / 2.0,
        COLORBAR_WIDTH,
        bar_height,
    );
    (area, bar)
}

/// Cell grid for the pitch area, at least one pixel per cell.
fn raster_size(area: &PlotArea) -> (u32, u32) {
    (area.width.round().max(1.0) as u32, area.height.round().max(1.0) as u32)
}

/// Match files carry the pitch length in `y` and the width in `x`. Length runs
/// left to right, width bottom to top, as in the event positions view.
fn match_orientation(p: &Point) -> Point {
    let (lo, hi) = WYSCOUT_EXTENT;
    Point::new(p.y, lo + hi - p.x)
}

/// Whole-match event density on the dark pitch. An empty event list renders
/// a flat heatmap.
pub fn match_heatmap(
    game: &str,
    points: &[Point],
    params: &DensityParams,
    size: (u32, u32),
) -> Result<Figure, VizError> {
    let (area, bar) = layout(size, 20.0, 0.6);
    let oriented: Vec<Point> = points.iter().map(match_orientation).collect();
    let density = build_density_image(&oriented, params, raster_size(&area))?;
    debug!(game, binned = density.field.binned(), "match heatmap");

    let mut canvas = Canvas::new(size.0, size.1, pitch::DARK_PITCH);
    paint_heatmap(&mut canvas, &area, &density, Some(pitch::DARK_PITCH));
    pitch::draw_markings(&mut canvas, &area, pitch::DARK_LINES, 2.0);
    paint_colorbar(&mut canvas, &bar, &density.scale, LABEL_LIGHT, 2);

    Ok(Figure::new("match-heatmap", format!("{game} heatmap"), canvas.into_raster())
        .with_scale(density.scale))
}

/// One player's touch density on grass, with title and optional portrait.
/// A selection with no events is [`VizError::NoData`].
pub fn player_heatmap(
    player: &str,
    events: &[PlayerEvent],
    params: &DensityParams,
    size: (u32, u32),
    portrait: Option<&RgbaImage>,
) -> Result<Figure, VizError> {
    if events.is_empty() {
        return Err(VizError::NoData(format!("no events for player '{player}'")));
    }
    let points: Vec<Point> = events.iter().map(|e| e.start).collect();

    let scale = title_scale(size.0);
    let (area, bar) = layout(size, title_band(scale) + 4.0, 0.5);
    let density = build_density_image(&points, params, raster_size(&area))?;

    let mut canvas = Canvas::new(size.0, size.1, pitch::DARK_PITCH);
    pitch::draw_pitch(&mut canvas, &area, &PitchStyle::grass(WHITE));
    paint_heatmap(&mut canvas, &area, &density, Some(pitch::DARK_PITCH));
    pitch::draw_markings(&mut canvas, &area, WHITE, 2.0);
    paint_colorbar(&mut canvas, &bar, &density.scale, WHITE, 1);

    let title = format!("{player}'s Heatmap");
    draw_title(&mut canvas, &title, scale, WHITE);
    overlay_portrait(&mut canvas, portrait);

    Ok(Figure::new("player-heatmap", title, canvas.into_raster()).with_scale(density.scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cupviz_core::{DensityError, Normalization};
    use image::Rgba;

    fn events(points: &[(f64, f64)]) -> Vec<PlayerEvent> {
        points
            .iter()
            .map(|(x, y)| PlayerEvent {
                team: "Argentina".into(),
                player: "Messi".into(),
                start: Point::new(*x, *y),
                end: None,
            })
            .collect()
    }

    fn pitch_params(bins: (usize, usize)) -> DensityParams {
        DensityParams::new(bins.0, bins.1).with_normalization(Normalization::Pitch)
    }

    #[test]
    fn match_heatmap_has_requested_size_and_scale() {
        let points: Vec<Point> = (0..50).map(|i| Point::new(i as f64 * 2.0, 50.0)).collect();
        let fig = match_heatmap("ARG-AUS", &points, &pitch_params((20, 10)), (1000, 600)).unwrap();
        assert_eq!((fig.image.width(), fig.image.height()), (1000, 600));
        assert_eq!(fig.kind, "match-heatmap");
        assert!(fig.scale.as_ref().unwrap().max > 0.0);
    }

    #[test]
    fn match_event_lands_in_length_by_width_cell() {
        // x = 10 (near one touchline), y = 90 (near the right-hand goal).
        let params = pitch_params((20, 10)).with_sigma(0.0);
        let size = (1000, 600);
        let fig = match_heatmap("ARG-AUS", &[Point::new(10.0, 90.0)], &params, size).unwrap();
        let scale = fig.scale.clone().unwrap();
        let (area, _) = layout(size, 20.0, 0.6);

        let cell = |ix: f64, iy: f64| {
            let (px, py) = area.to_px((ix + 0.5) / 20.0, (iy + 0.5) / 10.0);
            fig.image.pixel(px as u32, py as u32)
        };
        assert_eq!(cell(18.0, 9.0), scale.color(scale.max));
        assert_eq!(cell(2.0, 1.0), scale.color(0.0));
        assert_eq!(cell(18.0, 0.0), scale.color(0.0));
    }

    #[test]
    fn empty_match_renders_flat() {
        let fig = match_heatmap("ARG-AUS", &[], &pitch_params((20, 10)), (400, 300)).unwrap();
        let scale = fig.scale.unwrap();
        assert_eq!((scale.min, scale.max), (0.0, 0.0));
    }

    #[test]
    fn invalid_params_reported() {
        let err = match_heatmap("ARG-AUS", &[], &pitch_params((0, 10)), (400, 300)).unwrap_err();
        assert!(matches!(
            err,
            VizError::InvalidParameters(DensityError::ZeroBins { .. })
        ));
    }

    #[test]
    fn player_heatmap_titles_and_overlays_portrait() {
        let evs = events(&[(60.0, 30.0), (62.0, 33.0), (80.0, 50.0)]);
        let portrait = RgbaImage::from_pixel(100, 100, Rgba([1, 2, 3, 255]));
        let fig = player_heatmap("Messi", &evs, &pitch_params((25, 25)), (660, 420), Some(&portrait)).unwrap();
        assert_eq!(fig.title, "Messi's Heatmap");
        assert_eq!(fig.image.pixel(50, 50), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn player_heatmap_without_portrait_keeps_background() {
        let evs = events(&[(60.0, 30.0)]);
        let fig = player_heatmap("Messi", &evs, &pitch_params((25, 25)), (660, 420), None).unwrap();
        assert_eq!(fig.image.pixel(2, 2), pitch::DARK_PITCH);
    }

    #[test]
    fn player_without_events_is_no_data() {
        let err = player_heatmap("Nobody", &[], &pitch_params((25, 25)), (660, 420), None).unwrap_err();
        assert!(matches!(err, VizError::NoData(_)));
    }
}
