// Density field -> colored raster, plus the color bar legend painted next to
// heatmap figures.

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::canvas::Canvas;
use crate::colormap::{format_tick, ColorScale, Palette};
use crate::density::{build_density_field, DensityError, DensityField, DensityParams, Point};
use crate::font;
use crate::pitch::PlotArea;
use crate::raster::RasterImage;

/// A rendered density heatmap with the data it was drawn from.
#[derive(Debug, Clone)]
pub struct DensityImage {
    pub image: RasterImage,
    pub scale: ColorScale,
    pub field: DensityField,
}

/// Run the full pipeline: normalize, bin, smooth, color, rasterize.
///
/// The raster is exactly `width` x `height`. Grid row 0 (`y = 0`) is the top
/// row of pixels.
pub fn build_density_image(
    points: &[Point],
    params: &DensityParams,
    (width, height): (u32, u32),
) -> Result<DensityImage, DensityError> {
    if width == 0 || height == 0 {
        return Err(DensityError::ZeroSize { width, height });
    }
    let field = build_density_field(points, params)?;
    let scale = ColorScale::from_values(field.smoothed.values(), Palette::Hot);

    let bins_x = field.smoothed.bins_x();
    let bins_y = field.smoothed.bins_y();
    let pixels = RgbaImage::from_fn(width, height, |x, y| {
        let ix = (x as usize * bins_x) / width as usize;
        let iy = (y as usize * bins_y) / height as usize;
        scale.color(field.smoothed.get(ix, iy))
    });

    debug!(width, height, max = scale.max, "rasterized density field");

    Ok(DensityImage {
        image: RasterImage::from_rgba(pixels),
        scale,
        field,
    })
}

// ---------------------------------------------------------------------------
// Painting onto figures
// ---------------------------------------------------------------------------

/// Fill `area` with one rectangle per grid cell, optionally outlined in
/// `cell_edge`.
pub fn paint_heatmap(
    canvas: &mut Canvas,
    area: &PlotArea,
    image: &DensityImage,
    cell_edge: Option<Rgba<u8>>,
) {
    let grid = &image.field.smoothed;
    let (bx, by) = (grid.bins_x() as f64, grid.bins_y() as f64);
    for iy in 0..grid.bins_y() {
        for ix in 0..grid.bins_x() {
            let (x0, y0) = area.to_px(ix as f64 / bx, iy as f64 / by);
            let (x1, y1) = area.to_px((ix + 1) as f64 / bx, (iy + 1) as f64 / by);
            canvas.fill_rect(x0, y0, x1, y1, image.scale.color(grid.get(ix, iy)));
            if let Some(edge) = cell_edge {
                canvas.stroke_rect(x0, y0, x1, y1, 1.0, edge);
            }
        }
    }
}

/// Vertical color bar in `bar` (min at the bottom), tick labels to its right.
pub fn paint_colorbar(
    canvas: &mut Canvas,
    bar: &PlotArea,
    scale: &ColorScale,
    label_color: Rgba<u8>,
    label_scale: u32,
) {
    let top = bar.top.round() as i64;
    let bottom = bar.bottom().round() as i64;
    let span = (bottom - top).max(1) as f64;
    for py in top..bottom {
        // Fraction of the bar from the bottom edge, at the row's centre.
        let t = (bottom as f64 - (py as f64 + 0.5)) / span;
        let color = scale.palette.color(t);
        canvas.fill_rect(bar.left, py as f64, bar.right(), (py + 1) as f64, color);
    }
    canvas.stroke_rect(bar.left, bar.top, bar.right(), bar.bottom(), 1.0, label_color);

    let half_text = i64::from(font::text_height(label_scale)) / 2;
    for tick in &scale.ticks {
        let t = scale.fraction(*tick);
        let y = bar.bottom() - t * bar.height;
        canvas.line(bar.right(), y, bar.right() + 4.0, y, 1.0, label_color);
        canvas.text(
            (bar.right() + 7.0).round() as i64,
            y.round() as i64 - half_text,
            &format_tick(*tick),
            label_scale,
            label_color,
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
