//! Drawing surface adapter.
//!
//! Render code speaks centimeters; a [`Renderer`] multiplies by the render
//! scale and floors to whole pixels before handing the primitive to a
//! [`DrawSurface`] backend:
//!
//! ```text
//! ball (meters) ──×100──▶ renderer (cm) ──×rs, floor──▶ surface (px)
//! ```
//!
//! Two backends ship with the crate: [`RasterSurface`] paints into an RGB
//! image that can be saved as PNG, and [`RecordingSurface`] just records
//! the calls.

use std::path::Path;

use image::{ImageResult, Rgb as Pixel, RgbImage};

use crate::body::Ball;
use crate::config::{SimConfig, TableConfig};
use crate::types::Rgb;
use crate::units::m_to_cm;

/// Stroke width of [`Renderer::line`] in pixels.
pub const LINE_WIDTH: i32 = 2;

/// A pixel-space drawing backend.
pub trait DrawSurface {
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb);
    fn fill_circle(&mut self, x: i32, y: i32, r: i32, color: Rgb);
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb);
}

/// Pixel dimensions of a surface showing the whole table.
pub fn surface_size(table: &TableConfig, render_scale: f64) -> (u32, u32) {
    let width = (m_to_cm(table.width) * render_scale).floor() as u32;
    let height = (m_to_cm(table.height) * render_scale).floor() as u32;
    (width, height)
}

// =============================================================================
// Renderer
// =============================================================================

/// Scales centimeter coordinates onto a [`DrawSurface`].
pub struct Renderer<S> {
    surface: S,
    render_scale: f64,
}

impl<S: DrawSurface> Renderer<S> {
    pub fn new(surface: S, render_scale: f64) -> Self {
        Self {
            surface,
            render_scale,
        }
    }

    pub fn render_scale(&self) -> f64 {
        self.render_scale
    }

    fn px(&self, cm: f64) -> i32 {
        (cm * self.render_scale).floor() as i32
    }

    /// Filled rectangle with top-left corner `(x, y)`, all in cm.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        let (x, y, w, h) = (self.px(x), self.px(y), self.px(w), self.px(h));
        self.surface.fill_rect(x, y, w, h, color);
    }

    /// Filled circle centered at `(x, y)` with radius `r`, all in cm.
    pub fn circle(&mut self, x: f64, y: f64, r: f64, color: Rgb) {
        let (x, y, r) = (self.px(x), self.px(y), self.px(r));
        self.surface.fill_circle(x, y, r, color);
    }

    /// Line segment from `(x1, y1)` to `(x2, y2)` in cm.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Rgb) {
        let (x1, y1, x2, y2) = (self.px(x1), self.px(y1), self.px(x2), self.px(y2));
        self.surface.draw_line(x1, y1, x2, y2, color);
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

/// Anything that knows how to draw itself through a [`Renderer`].
pub trait Render {
    fn render<S: DrawSurface>(&self, renderer: &mut Renderer<S>);
}

impl Render for Ball {
    fn render<S: DrawSurface>(&self, renderer: &mut Renderer<S>) {
        let pos = self.pos();
        renderer.circle(
            m_to_cm(pos.x),
            m_to_cm(pos.y),
            m_to_cm(self.radius),
            self.color,
        );
    }
}

// =============================================================================
// Backends
// =============================================================================

/// A primitive as seen by the surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Rect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Rgb,
    },
    Circle {
        x: i32,
        y: i32,
        r: i32,
        color: Rgb,
    },
    Line {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Rgb,
    },
}

/// Surface that records every call instead of drawing.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Drain the recorded calls.
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }
}

impl DrawSurface for RecordingSurface {
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb) {
        self.calls.push(DrawCall::Rect { x, y, w, h, color });
    }

    fn fill_circle(&mut self, x: i32, y: i32, r: i32, color: Rgb) {
        self.calls.push(DrawCall::Circle { x, y, r, color });
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb) {
        self.calls.push(DrawCall::Line {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }
}

/// Software rasterizer over an RGB image. Everything is clipped to the
/// image bounds.
pub struct RasterSurface {
    image: RgbImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::new(width, height),
        }
    }

    /// Surface sized to show the configured table.
    pub fn for_config(config: &SimConfig) -> Self {
        let (width, height) = surface_size(&config.table, config.render_scale);
        Self::new(width, height)
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let Pixel([r, g, b]) = *self.image.get_pixel(x, y);
        Rgb::new(r, g, b)
    }

    /// Write the current frame as PNG.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.image.save(path)
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 {
            return;
        }
        let (w, h) = self.bounds();
        if x < w && y < h {
            self.image
                .put_pixel(x as u32, y as u32, Pixel([color.r, color.g, color.b]));
        }
    }

    fn bounds(&self) -> (i64, i64) {
        (i64::from(self.image.width()), i64::from(self.image.height()))
    }

    /// Clip a segment to the image grown by the line width (Liang-Barsky).
    /// Segments fully inside are returned untouched.
    fn clip_segment(
        &self,
        from: (i64, i64),
        to: (i64, i64),
    ) -> Option<((i64, i64), (i64, i64))> {
        let (w, h) = self.bounds();
        let pad = i64::from(LINE_WIDTH);
        let (min_x, min_y, max_x, max_y) = (-pad, -pad, w, h);
        let inside =
            |(x, y): (i64, i64)| (min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y);
        if inside(from) && inside(to) {
            return Some((from, to));
        }

        let (x1, y1) = (from.0 as f64, from.1 as f64);
        let (dx, dy) = (to.0 as f64 - x1, to.1 as f64 - y1);
        let edges = [
            (-dx, x1 - min_x as f64),
            (dx, max_x as f64 - x1),
            (-dy, y1 - min_y as f64),
            (dy, max_y as f64 - y1),
        ];
        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let t = q / p;
                if p < 0.0 {
                    if t > t1 {
                        return None;
                    }
                    t0 = t0.max(t);
                } else {
                    if t < t0 {
                        return None;
                    }
                    t1 = t1.min(t);
                }
            }
        }
        let at = |t: f64| ((x1 + t * dx).round() as i64, (y1 + t * dy).round() as i64);
        Some((at(t0), at(t1)))
    }
}

impl DrawSurface for RasterSurface {
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb) {
        let (width, height) = self.bounds();
        let (x, y) = (i64::from(x), i64::from(y));
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i64::from(w)).min(width);
        let y1 = (y + i64::from(h)).min(height);
        for py in y0..y1 {
            for px in x0..x1 {
                self.put(px, py, color);
            }
        }
    }

    fn fill_circle(&mut self, x: i32, y: i32, r: i32, color: Rgb) {
        let (width, height) = self.bounds();
        let (cx, cy, r) = (i64::from(x), i64::from(y), i64::from(r.max(0)));
        // only the part of the bounding box that lands on the image
        let x0 = (cx - r).max(0);
        let x1 = (cx + r).min(width - 1);
        let y0 = (cy - r).max(0);
        let y1 = (cy + r).min(height - 1);
        let r2 = i128::from(r) * i128::from(r);
        for py in y0..=y1 {
            let dy = i128::from(py - cy);
            for px in x0..=x1 {
                let dx = i128::from(px - cx);
                if dx * dx + dy * dy <= r2 {
                    self.put(px, py, color);
                }
            }
        }
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb) {
        let from = (i64::from(x1), i64::from(y1));
        let to = (i64::from(x2), i64::from(y2));
        let Some(((x1, y1), (x2, y2))) = self.clip_segment(from, to) else {
            return;
        };

        // Bresenham, stamping a LINE_WIDTH square at each step
        let stroke = i64::from(LINE_WIDTH);
        let dx = (x2 - x1).abs();
        let dy = -(y2 - y1).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let sy = if y1 < y2 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x1, y1);
        loop {
            for oy in 0..stroke {
                for ox in 0..stroke {
                    self.put(x + ox, y + oy, color);
                }
            }
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
