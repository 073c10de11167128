// Figure renderers, one per visualization. Each takes already-loaded data and
// returns a finished `Figure`; none touches files or the network.

mod charts;
mod heatmaps;
mod passes;
mod positions;

pub use charts::{team_performance, top_players};
pub use heatmaps::{match_heatmap, player_heatmap};
pub use passes::chances_created;
pub use positions::match_positions;

use cupviz_core::canvas::{rgb, Canvas};
use cupviz_core::font;
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use tracing::warn;

/// Portrait edge length after resizing, in pixels.
pub const PORTRAIT_SIZE: u32 = 100;
const PORTRAIT_MARGIN: i64 = 8;

pub(crate) const WHITE: Rgba<u8> = rgb(255, 255, 255);
pub(crate) const BLACK: Rgba<u8> = rgb(0, 0, 0);
pub(crate) const LABEL_LIGHT: Rgba<u8> = rgb(0xef, 0xef, 0xef);

/// Title height in pixels including padding, at `scale`.
pub(crate) fn title_band(scale: u32) -> f64 {
    f64::from(font::text_height(scale) + 16)
}

pub(crate) fn draw_title(canvas: &mut Canvas, title: &str, scale: u32, color: Rgba<u8>) {
    let cx = f64::from(canvas.width()) / 2.0;
    canvas.text_centered(cx, 8, title, scale, color);
}

/// Font scale for titles on a canvas of this width.
pub(crate) fn title_scale(width: u32) -> u32 {
    (width / 300).clamp(2, 4)
}

/// Decode portrait bytes and resize to [`PORTRAIT_SIZE`] square. Undecodable
/// bytes are logged and ignored.
pub fn decode_portrait(player: &str, bytes: &[u8]) -> Option<RgbaImage> {
    match image::load_from_memory(bytes) {
        Ok(img) => Some(image::imageops::resize(
            &img.to_rgba8(),
            PORTRAIT_SIZE,
            PORTRAIT_SIZE,
            FilterType::Triangle,
        )),
        Err(e) => {
            warn!("portrait for '{}' could not be decoded: {}", player, e);
            None
        }
    }
}

/// Composite `portrait` into the top-left corner.
pub(crate) fn overlay_portrait(canvas: &mut Canvas, portrait: Option<&RgbaImage>) {
    if let Some(img) = portrait {
        canvas.overlay(img, PORTRAIT_MARGIN, PORTRAIT_MARGIN);
    }
}

/// Shorten `text` with a trailing `.` until it fits in `max_px` at `scale`.
pub(crate) fn fit_label(text: &str, max_px: f64, scale: u32) -> String {
    if f64::from(font::text_width(text, scale)) <= max_px {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().chain(std::iter::once(&'.')).collect();
        if f64::from(font::text_width(&candidate, scale)) <= max_px {
            return candidate;
        }
    }
    String::new()
}
