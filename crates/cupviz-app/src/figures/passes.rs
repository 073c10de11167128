// Chances created: a player's line-breaking passes as arrows on grass.

use cupviz_core::canvas::{rgb, Canvas};
use cupviz_core::pitch::{self, PitchStyle, PlotArea, PITCH_LENGTH_M, PITCH_WIDTH_M};
use cupviz_data::PlayerEvent;
use image::{Rgba, RgbaImage};
use tracing::debug;

use super::{draw_title, overlay_portrait, title_band, title_scale, BLACK, WHITE};
use crate::figure::Figure;
use crate::visualization::VizError;

const PASS: Rgba<u8> = rgb(255, 0, 0);

/// Arrow from each event's start to its end point, with an open circle at the
/// end. Events without an end point are skipped; a selection with no events
/// at all is [`VizError::NoData`].
pub fn chances_created(
    player: &str,
    events: &[PlayerEvent],
    size: (u32, u32),
    portrait: Option<&RgbaImage>,
) -> Result<Figure, VizError> {
    if events.is_empty() {
        return Err(VizError::NoData(format!("no events for player '{player}'")));
    }

    let scale = title_scale(size.0);
    let area = PlotArea::fit(
        size.0,
        size.1,
        (20.0, title_band(scale) + 8.0, 20.0, 20.0),
        PITCH_LENGTH_M / PITCH_WIDTH_M,
    );
    let unit = area.width / 600.0;

    let mut canvas = Canvas::new(size.0, size.1, WHITE);
    pitch::draw_pitch(&mut canvas, &area, &PitchStyle::grass(BLACK));

    let mut drawn = 0usize;
    for event in events {
        let Some(end) = event.end else {
            continue;
        };
        let (x0, y0) = area.wyscout(event.start.x, event.start.y);
        let (x1, y1) = area.wyscout(end.x, end.y);
        canvas.arrow(x0, y0, x1, y1, 2.0 * unit, 9.0 * unit, 7.0 * unit, PASS);
        canvas.circle(x1, y1, 5.0 * unit, 1.5 * unit.max(1.0), PASS);
        drawn += 1;
    }
    debug!(player, drawn, skipped = events.len() - drawn, "chances created");

    let title = format!("{player}'s Line-Breaking Passes");
    draw_title(&mut canvas, &title, scale, BLACK);
    overlay_portrait(&mut canvas, portrait);

    Ok(Figure::new("chances-created", title, canvas.into_raster()))
}
