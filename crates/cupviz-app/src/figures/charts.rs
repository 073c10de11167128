// Bar charts over the tournament statistics: top scorers and team records.

use cupviz_core::canvas::{rgb, Canvas};
use cupviz_core::colormap::{format_tick, nice_ticks};
use cupviz_core::font;
use cupviz_core::pitch::PlotArea;
use cupviz_data::{PlayerStat, TeamStat};
use image::{Rgba, RgbaImage};
use tracing::debug;

use super::{draw_title, fit_label, title_band, title_scale, BLACK, PORTRAIT_SIZE, WHITE};
use crate::figure::Figure;
use crate::visualization::VizError;

const GOALS: Rgba<u8> = rgb(0x63, 0x6e, 0xfa);
const ASSISTS: Rgba<u8> = rgb(0xef, 0x55, 0x3b);
const WINS: Rgba<u8> = rgb(0, 128, 0);
const LOSSES: Rgba<u8> = rgb(255, 0, 0);
const PLOT_BG: Rgba<u8> = rgb(0xe5, 0xec, 0xf6);
const AXIS_TEXT: Rgba<u8> = rgb(0x2a, 0x3f, 0x5f);
const SEPARATOR: Rgba<u8> = rgb(0x80, 0x80, 0x80);

const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 40.0;
const LEGEND_BAND: f64 = 24.0;
const MAX_TICKS: usize = 6;
/// Width kept free right of the plot when a portrait accompanies the chart.
const PORTRAIT_COLUMN: f64 = PORTRAIT_SIZE as f64 + 20.0;

/// Plot rectangle below the title and legend, leaving room for axis labels
/// and `reserve_right` extra pixels on the right.
fn chart_area(size: (u32, u32), scale: u32, reserve_right: f64) -> PlotArea {
    let top = title_band(scale) + LEGEND_BAND;
    PlotArea::new(
        MARGIN_LEFT,
        top,
        (f64::from(size.0) - MARGIN_LEFT - MARGIN_RIGHT - reserve_right).max(1.0),
        (f64::from(size.1) - top - MARGIN_BOTTOM).max(1.0),
    )
}

/// Linear value range along the vertical axis, `lo < hi`.
#[derive(Debug, Clone, Copy)]
struct ValueAxis {
    lo: f64,
    hi: f64,
}

impl ValueAxis {
    fn y(&self, area: &PlotArea, v: f64) -> f64 {
        area.bottom() - (v - self.lo) / (self.hi - self.lo) * area.height
    }

    /// Horizontal gridlines with tick labels left of the plot.
    fn draw(&self, canvas: &mut Canvas, area: &PlotArea) {
        let label_h = i64::from(font::text_height(1));
        for tick in nice_ticks(self.lo, self.hi, MAX_TICKS) {
            let y = self.y(area, tick);
            canvas.line(area.left, y, area.right(), y, 1.0, WHITE);
            canvas.text_right(
                (area.left - 6.0) as i64,
                y.round() as i64 - label_h / 2,
                &format_tick(tick),
                1,
                AXIS_TEXT,
            );
        }
    }
}

/// Category labels centred under each group.
fn draw_categories(canvas: &mut Canvas, area: &PlotArea, names: &[String]) {
    let group = area.width / names.len() as f64;
    for (i, name) in names.iter().enumerate() {
        let cx = area.left + group * (i as f64 + 0.5);
        let label = fit_label(name, group - 4.0, 1);
        canvas.text_centered(cx, (area.bottom() + 8.0) as i64, &label, 1, AXIS_TEXT);
    }
}

/// Legend swatches right-aligned in the band above the plot.
fn draw_legend(canvas: &mut Canvas, area: &PlotArea, entries: &[(&str, Rgba<u8>)]) {
    let y = area.top - LEGEND_BAND + 6.0;
    let mut right = area.right();
    for (label, color) in entries.iter().rev() {
        let w = f64::from(font::text_width(label, 1));
        canvas.text((right - w) as i64, y as i64 + 2, label, 1, AXIS_TEXT);
        right -= w + 16.0;
        canvas.fill_rect(right, y, right + 10.0, y + 10.0, *color);
        right -= 12.0;
    }
}

fn bar_label(canvas: &mut Canvas, cx: f64, y: f64, value: u32) {
    canvas.text_centered(cx, y as i64, &value.to_string(), 1, AXIS_TEXT);
}

/// Grouped goal and assist bars, one group per player in row order. A
/// portrait of the leading player sits right of the plot when given.
pub fn top_players(
    stats: &[PlayerStat],
    size: (u32, u32),
    portrait: Option<&RgbaImage>,
) -> Result<Figure, VizError> {
    if stats.is_empty() {
        return Err(VizError::NoData("no player statistics".to_string()));
    }

    let scale = title_scale(size.0);
    let reserve = if portrait.is_some() { PORTRAIT_COLUMN } else { 0.0 };
    let area = chart_area(size, scale, reserve);
    let peak = stats.iter().map(|s| s.goals.max(s.assists)).max().unwrap_or(0);
    let axis = ValueAxis {
        lo: 0.0,
        hi: f64::from(peak.max(1)) * 1.1,
    };
    debug!(players = stats.len(), peak, "top players");

    let mut canvas = Canvas::new(size.0, size.1, WHITE);
    canvas.fill_rect(area.left, area.top, area.right(), area.bottom(), PLOT_BG);
    axis.draw(&mut canvas, &area);

    let label_h = f64::from(font::text_height(1));
    let group = area.width / stats.len() as f64;
    let bar_w = group * 0.4;
    let zero = axis.y(&area, 0.0);
    for (i, stat) in stats.iter().enumerate() {
        let cx = area.left + group * (i as f64 + 0.5);
        for (x0, value, color) in [(cx - bar_w, stat.goals, GOALS), (cx, stat.assists, ASSISTS)] {
            let top = axis.y(&area, f64::from(value));
            canvas.fill_rect(x0, top, x0 + bar_w, zero, color);
            bar_label(&mut canvas, x0 + bar_w / 2.0, top - label_h - 3.0, value);
        }
    }

    let names: Vec<String> = stats.iter().map(|s| s.player.clone()).collect();
    draw_categories(&mut canvas, &area, &names);
    draw_legend(&mut canvas, &area, &[("Goals", GOALS), ("Assists", ASSISTS)]);
    draw_title(&mut canvas, "Goals & Assists", scale, BLACK);
    if let Some(img) = portrait {
        let (x, y) = portrait_origin(&area);
        canvas.overlay(img, x, y);
    }

    Ok(Figure::new("top-players", "Goals & Assists", canvas.into_raster()).with_labels(names))
}

/// Top-left pixel of the portrait, vertically centred on the plot.
fn portrait_origin(area: &PlotArea) -> (i64, i64) {
    let size = f64::from(PORTRAIT_SIZE);
    let x = area.right() + (PORTRAIT_COLUMN - size) / 2.0;
    let y = (area.top + (area.height - size) / 2.0).max(0.0);
    (x.round() as i64, y.round() as i64)
}

/// Wins above and losses below a zero line, with dotted separators between
/// teams.
pub fn team_performance(stats: &[TeamStat], size: (u32, u32)) -> Result<Figure, VizError> {
    if stats.is_empty() {
        return Err(VizError::NoData("no team statistics".to_string()));
    }

    let scale = title_scale(size.0);
    let area = chart_area(size, scale, 0.0);
    let peak = stats.iter().map(|s| s.wins.max(s.losses)).max().unwrap_or(0);
    let reach = f64::from(peak.max(1)) * 1.15;
    let axis = ValueAxis { lo: -reach, hi: reach };
    debug!(teams = stats.len(), peak, "team performance");

    let mut canvas = Canvas::new(size.0, size.1, WHITE);
    canvas.fill_rect(area.left, area.top, area.right(), area.bottom(), PLOT_BG);
    axis.draw(&mut canvas, &area);

    let label_h = f64::from(font::text_height(1));
    let group = area.width / stats.len() as f64;
    let bar_w = group * 0.6;
    let zero = axis.y(&area, 0.0);
    for (i, stat) in stats.iter().enumerate() {
        let cx = area.left + group * (i as f64 + 0.5);
        let (x0, x1) = (cx - bar_w / 2.0, cx + bar_w / 2.0);

        let win_top = axis.y(&area, f64::from(stat.wins));
        canvas.fill_rect(x0, win_top, x1, zero, WINS);
        bar_label(&mut canvas, cx, win_top - label_h - 3.0, stat.wins);

        let loss_bottom = axis.y(&area, -f64::from(stat.losses));
        canvas.fill_rect(x0, zero, x1, loss_bottom, LOSSES);
        bar_label(&mut canvas, cx, loss_bottom + 3.0, stat.losses);
    }

    canvas.line(area.left, zero, area.right(), zero, 2.0, BLACK);
    for i in 0..=stats.len() {
        let x = area.left + group * i as f64;
        canvas.dashed_line(x, area.top, x, area.bottom(), 1.0, 2.0, 3.0, SEPARATOR);
    }

    let names: Vec<String> = stats.iter().map(|s| s.team.clone()).collect();
    draw_categories(&mut canvas, &area, &names);
    draw_legend(&mut canvas, &area, &[("Wins", WINS), ("Losses", LOSSES)]);

    let title = "Team Performance - Wins/Losses";
    draw_title(&mut canvas, title, scale, BLACK);

    Ok(Figure::new("team-performance", title, canvas.into_raster()).with_labels(names))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use cupviz_core::RasterImage;

    fn player(name: &str, goals: u32, assists: u32) -> PlayerStat {
        PlayerStat {
            player: name.into(),
            goals,
            assists,
        }
    }

    fn team(name: &str, wins: u32, losses: u32) -> TeamStat {
        TeamStat {
            team: name.into(),
            wins,
            losses,
        }
    }

    /// Pixels of `color` in column `x` inside the plot rows.
    fn column_count(img: &RasterImage, area: &PlotArea, x: f64, color: Rgba<u8>) -> usize {
        (area.top as u32..area.bottom() as u32)
            .filter(|&y| img.pixel(x as u32, y) == color)
            .count()
    }

    #[test]
    fn taller_bar_for_more_goals() {
        let size = (800, 400);
        let stats = vec![player("Mbappe", 8, 2), player("Messi", 4, 3)];
        let fig = top_players(&stats, size, None).unwrap();
        assert_eq!(fig.labels, vec!["Mbappe".to_string(), "Messi".to_string()]);
        assert_eq!(fig.title, "Goals & Assists");

        let area = chart_area(size, title_scale(size.0), 0.0);
        let group = area.width / 2.0;
        let goal_col = |i: f64| area.left + group * (i + 0.5) - group * 0.2;
        let first = column_count(&fig.image, &area, goal_col(0.0), GOALS);
        let second = column_count(&fig.image, &area, goal_col(1.0), GOALS);
        assert!(second > 0);
        assert!(first > second);
    }

    #[test]
    fn zero_assists_draw_no_bar() {
        let size = (800, 400);
        let fig = top_players(&[player("Kane", 6, 0)], size, None).unwrap();
        let area = chart_area(size, title_scale(size.0), 0.0);
        let assist_col = area.left + area.width / 2.0 + area.width * 0.2;
        assert_eq!(column_count(&fig.image, &area, assist_col, ASSISTS), 0);
    }

    #[test]
    fn portrait_gets_its_own_column() {
        let size = (800, 400);
        let portrait = RgbaImage::from_pixel(PORTRAIT_SIZE, PORTRAIT_SIZE, Rgba([1, 2, 3, 255]));
        let fig = top_players(&[player("Mbappe", 8, 2)], size, Some(&portrait)).unwrap();

        let area = chart_area(size, title_scale(size.0), PORTRAIT_COLUMN);
        let (x, y) = portrait_origin(&area);
        assert!(x as f64 >= area.right());
        assert_eq!(fig.image.pixel(x as u32 + 50, y as u32 + 50), Rgba([1, 2, 3, 255]));

        let plain = top_players(&[player("Mbappe", 8, 2)], size, None).unwrap();
        assert_ne!(plain.image.pixel(x as u32 + 50, y as u32 + 50), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn wins_above_losses_below_zero_line() {
        let size = (800, 400);
        let fig = team_performance(&[team("Argentina", 4, 1)], size).unwrap();
        assert_eq!(fig.title, "Team Performance - Wins/Losses");

        let area = chart_area(size, title_scale(size.0), 0.0);
        let axis = ValueAxis { lo: -4.6, hi: 4.6 };
        let zero = axis.y(&area, 0.0);
        let cx = (area.left + area.width / 2.0) as u32;
        assert_eq!(fig.image.pixel(cx, (zero - 4.0) as u32), WINS);
        assert_eq!(fig.image.pixel(cx, (zero + 4.0) as u32), LOSSES);
    }

    #[test]
    fn separators_at_team_boundaries() {
        let size = (800, 400);
        let fig = team_performance(&[team("Argentina", 4, 1), team("France", 3, 2)], size).unwrap();
        let area = chart_area(size, title_scale(size.0), 0.0);
        let top = area.top as u32;
        assert_eq!(fig.image.pixel(area.left as u32, top), SEPARATOR);
        let mid = (area.left + area.width / 2.0) as u32;
        assert_eq!(fig.image.pixel(mid, top), SEPARATOR);
    }

    #[test]
    fn empty_stats_are_no_data() {
        assert!(matches!(top_players(&[], (800, 400), None), Err(VizError::NoData(_))));
        assert!(matches!(team_performance(&[], (800, 400)), Err(VizError::NoData(_))));
    }
}
