// RGBA drawing surface with the handful of primitives the figures need:
// filled and stroked shapes, anti-aliasing-free thick lines, arrows, text
// from the bitmap font, and image overlays. Coordinates are pixels with the
// origin at the top-left corner.

use image::{Rgba, RgbaImage};

use crate::font;
use crate::raster::RasterImage;

/// Opaque color from components.
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Color with explicit alpha.
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Rgba<u8> {
    Rgba([r, g, b, a])
}

/// Parse `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex(s: &str) -> Option<Rgba<u8>> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        6 => Some(rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// Source-over blend of `src` onto `dst`.
fn blend(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let a = f64::from(src.0[3]) / 255.0;
    if a >= 1.0 {
        return src;
    }
    let da = f64::from(dst.0[3]) / 255.0;
    let out_a = a + da * (1.0 - a);
    if out_a <= 0.0 {
        return rgba(0, 0, 0, 0);
    }
    let mix = |s: u8, d: u8| {
        let v = (f64::from(s) * a + f64::from(d) * da * (1.0 - a)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(src.0[0], dst.0[0]),
        mix(src.0[1], dst.0[1]),
        mix(src.0[2], dst.0[2]),
        (out_a * 255.0).round() as u8,
    ])
}

/// Squared distance from `(px, py)` to the segment `a..b`.
fn segment_distance_sq(px: f64, py: f64, a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((px - a.0) * dx + (py - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    (px - cx).powi(2) + (py - cy).powi(2)
}

#[derive(Debug, Clone)]
pub struct Canvas {
    img: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            img: RgbaImage::from_pixel(width, height, background),
        }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.img.get_pixel(x, y)
    }

    pub fn into_raster(self) -> RasterImage {
        RasterImage::from_rgba(self.img)
    }

    /// Blend one pixel; coordinates off the canvas are ignored.
    pub fn plot(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        if x < 0 || y < 0 || x >= i64::from(self.width()) || y >= i64::from(self.height()) {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        let dst = *self.img.get_pixel(x, y);
        self.img.put_pixel(x, y, blend(dst, color));
    }

    /// Integer pixel bounds covering `[x0, x1] x [y0, y1]`, clipped to the canvas.
    fn clip(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Option<(i64, i64, i64, i64)> {
        let w = i64::from(self.width());
        let h = i64::from(self.height());
        let (lx, hx) = (x0.min(x1).floor() as i64, x0.max(x1).ceil() as i64);
        let (ly, hy) = (y0.min(y1).floor() as i64, y0.max(y1).ceil() as i64);
        let (lx, ly, hx, hy) = (lx.max(0), ly.max(0), hx.min(w - 1), hy.min(h - 1));
        (lx <= hx && ly <= hy).then_some((lx, ly, hx, hy))
    }

    /// Fill every pixel whose center lies inside the rectangle.
    pub fn fill_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba<u8>) {
        let (left, right) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (y0.min(y1), y0.max(y1));
        let Some((lx, ly, hx, hy)) = self.clip(left, top, right, bottom) else {
            return;
        };
        for y in ly..=hy {
            let cy = y as f64 + 0.5;
            if cy < top || cy >= bottom {
                continue;
            }
            for x in lx..=hx {
                let cx = x as f64 + 0.5;
                if cx >= left && cx < right {
                    self.plot(x, y, color);
                }
            }
        }
    }

    /// Thick line segment: pixels within `width / 2` of the segment.
    pub fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, width: f64, color: Rgba<u8>) {
        let half = (width / 2.0).max(0.5);
        let Some((lx, ly, hx, hy)) =
            self.clip(x0 - half, y0 - half, x1 + half, y1 + half)
        else {
            return;
        };
        let limit = half * half;
        for y in ly..=hy {
            for x in lx..=hx {
                let d = segment_distance_sq(x as f64 + 0.5, y as f64 + 0.5, (x0, y0), (x1, y1));
                if d <= limit {
                    self.plot(x, y, color);
                }
            }
        }
    }

    /// Dotted/dashed line: `dash` pixels drawn, `gap` pixels skipped.
    #[allow(clippy::too_many_arguments)]
    pub fn dashed_line(
        &mut self,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        width: f64,
        dash: f64,
        gap: f64,
        color: Rgba<u8>,
    ) {
        let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        if len == 0.0 || dash <= 0.0 {
            return;
        }
        let (ux, uy) = ((x1 - x0) / len, (y1 - y0) / len);
        let mut t = 0.0;
        while t < len {
            let end = (t + dash).min(len);
            self.line(x0 + ux * t, y0 + uy * t, x0 + ux * end, y0 + uy * end, width, color);
            t += dash + gap.max(0.0);
        }
    }

    pub fn stroke_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, width: f64, color: Rgba<u8>) {
        self.polyline(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)], true, width, color);
    }

    /// Connected segments; `closed` joins the last point back to the first.
    pub fn polyline(&mut self, points: &[(f64, f64)], closed: bool, width: f64, color: Rgba<u8>) {
        if points.len() < 2 {
            return;
        }
        // Collect the covered pixels first so joints are not blended twice.
        let mut mask = vec![false; (self.width() * self.height()) as usize];
        let mut segments: Vec<((f64, f64), (f64, f64))> =
            points.windows(2).map(|w| (w[0], w[1])).collect();
        if closed {
            segments.push((points[points.len() - 1], points[0]));
        }
        let half = (width / 2.0).max(0.5);
        let limit = half * half;
        for (a, b) in segments {
            let Some((lx, ly, hx, hy)) =
                self.clip(a.0.min(b.0) - half, a.1.min(b.1) - half, a.0.max(b.0) + half, a.1.max(b.1) + half)
            else {
                continue;
            };
            for y in ly..=hy {
                for x in lx..=hx {
                    if segment_distance_sq(x as f64 + 0.5, y as f64 + 0.5, a, b) <= limit {
                        mask[(y as u32 * self.width() + x as u32) as usize] = true;
                    }
                }
            }
        }
        self.apply_mask(&mask, color);
    }

    fn apply_mask(&mut self, mask: &[bool], color: Rgba<u8>) {
        let w = self.width();
        for (i, hit) in mask.iter().enumerate() {
            if *hit {
                let i = i as u32;
                self.plot(i64::from(i % w), i64::from(i / w), color);
            }
        }
    }

    /// Ellipse outline centred on `(cx, cy)`.
    pub fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, width: f64, color: Rgba<u8>) {
        const SEGMENTS: usize = 96;
        let points: Vec<(f64, f64)> = (0..SEGMENTS)
            .map(|i| {
                let a = i as f64 / SEGMENTS as f64 * std::f64::consts::TAU;
                (cx + rx * a.cos(), cy + ry * a.sin())
            })
            .collect();
        self.polyline(&points, true, width, color);
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, width: f64, color: Rgba<u8>) {
        self.ellipse(cx, cy, r, r, width, color);
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgba<u8>) {
        let Some((lx, ly, hx, hy)) = self.clip(cx - r, cy - r, cx + r, cy + r) else {
            return;
        };
        for y in ly..=hy {
            for x in lx..=hx {
                let (dx, dy) = (x as f64 + 0.5 - cx, y as f64 + 0.5 - cy);
                if dx * dx + dy * dy <= r * r {
                    self.plot(x, y, color);
                }
            }
        }
    }

    /// Regular hexagon outline with a vertex pointing up.
    pub fn hexagon(&mut self, cx: f64, cy: f64, r: f64, width: f64, color: Rgba<u8>) {
        let points: Vec<(f64, f64)> = (0..6)
            .map(|i| {
                let a = (i as f64 * 60.0 - 90.0).to_radians();
                (cx + r * a.cos(), cy + r * a.sin())
            })
            .collect();
        self.polyline(&points, true, width, color);
    }

    pub fn fill_triangle(&mut self, a: (f64, f64), b: (f64, f64), c: (f64, f64), color: Rgba<u8>) {
        let Some((lx, ly, hx, hy)) = self.clip(
            a.0.min(b.0).min(c.0),
            a.1.min(b.1).min(c.1),
            a.0.max(b.0).max(c.0),
            a.1.max(b.1).max(c.1),
        ) else {
            return;
        };
        let edge = |p: (f64, f64), q: (f64, f64), x: f64, y: f64| {
            (q.0 - p.0) * (y - p.1) - (q.1 - p.1) * (x - p.0)
        };
        for y in ly..=hy {
            for x in lx..=hx {
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                let e0 = edge(a, b, px, py);
                let e1 = edge(b, c, px, py);
                let e2 = edge(c, a, px, py);
                let inside = (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0)
                    || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0);
                if inside {
                    self.plot(x, y, color);
                }
            }
        }
    }

    /// Arrow from `(x0, y0)` to `(x1, y1)` with a filled triangular head.
    #[allow(clippy::too_many_arguments)]
    pub fn arrow(
        &mut self,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        width: f64,
        head_length: f64,
        head_width: f64,
        color: Rgba<u8>,
    ) {
        let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        if len == 0.0 {
            return;
        }
        let (ux, uy) = ((x1 - x0) / len, (y1 - y0) / len);
        let head = head_length.min(len);
        let (bx, by) = (x1 - ux * head, y1 - uy * head);
        self.line(x0, y0, bx, by, width, color);
        let (nx, ny) = (-uy * head_width / 2.0, ux * head_width / 2.0);
        self.fill_triangle((x1, y1), (bx + nx, by + ny), (bx - nx, by - ny), color);
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgba<u8>) {
        for (dx, dy) in font::rasterize(text, scale) {
            self.plot(x + i64::from(dx), y + i64::from(dy), color);
        }
    }

    /// Draw `text` horizontally centred on `cx`.
    pub fn text_centered(&mut self, cx: f64, y: i64, text: &str, scale: u32, color: Rgba<u8>) {
        let w = f64::from(font::text_width(text, scale));
        self.text((cx - w / 2.0).round() as i64, y, text, scale, color);
    }

    /// Draw `text` so that it ends at `right`.
    pub fn text_right(&mut self, right: i64, y: i64, text: &str, scale: u32, color: Rgba<u8>) {
        let w = i64::from(font::text_width(text, scale));
        self.text(right - w, y, text, scale, color);
    }

    /// Alpha-composite `src` with its top-left corner at `(x, y)`.
    pub fn overlay(&mut self, src: &RgbaImage, x: i64, y: i64) {
        for (sx, sy, px) in src.enumerate_pixels() {
            self.plot(x + i64::from(sx), y + i64::from(sy), *px);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
