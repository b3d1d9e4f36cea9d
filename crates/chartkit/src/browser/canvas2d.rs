//! `Canvas` over an HTML5 canvas 2D context.

use chartkit_core::{Canvas, Color, Point, Rect, TextAlign, TextStyle};
use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::BrowserError;

/// Draws chart frames into a `<canvas>` element.
///
/// Coordinates are device pixels: the backing store is sized to the CSS box
/// times the device-pixel ratio and no context transform is applied.
pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    /// Wrap a canvas element.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, BrowserError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| BrowserError::Context(format!("{e:?}")))?
            .ok_or_else(|| BrowserError::Context("no 2d context available".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| BrowserError::Context("not a CanvasRenderingContext2d".to_string()))?;
        Ok(Self { canvas, ctx })
    }

    /// The canvas element.
    pub const fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Resize the backing store in device pixels. No-op when unchanged, so
    /// the context state survives steady-state frames.
    pub fn set_backing_size(&self, width: f64, height: f64) {
        let (w, h) = (width.round().max(0.0) as u32, height.round().max(0.0) as u32);
        if self.canvas.width() != w {
            self.canvas.set_width(w);
        }
        if self.canvas.height() != h {
            self.canvas.set_height(h);
        }
    }

    fn trace(&self, points: &[Point]) -> bool {
        let Some((first, rest)) = points.split_first() else {
            return false;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        true
    }
}

impl Canvas for Canvas2dSurface {
    fn clear(&mut self, background: Option<Color>) {
        let (w, h) = (f64::from(self.canvas.width()), f64::from(self.canvas.height()));
        self.ctx.clear_rect(0.0, 0.0, w, h);
        if let Some(color) = background {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill_rect(0.0, 0.0, w, h);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn fill_sector(
        &mut self,
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
        color: Color,
    ) {
        self.ctx.begin_path();
        self.ctx
            .arc(center.x, center.y, outer_radius, start_angle, end_angle)
            .ok();
        if inner_radius > 0.0 {
            self.ctx
                .arc_with_anticlockwise(center.x, center.y, inner_radius, end_angle, start_angle, true)
                .ok();
        } else {
            self.ctx.line_to(center.x, center.y);
        }
        self.ctx.close_path();
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.ctx.begin_path();
        self.ctx.arc(center.x, center.y, radius.max(0.0), 0.0, TAU).ok();
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill();
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        if self.trace(points) {
            self.ctx.close_path();
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill();
        }
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool, color: Color, width: f64) {
        if self.trace(points) {
            if closed {
                self.ctx.close_path();
            }
            self.ctx.set_line_join("round");
            self.ctx.set_stroke_style_str(&color.to_css());
            self.ctx.set_line_width(width);
            self.ctx.stroke();
        }
    }

    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle) {
        self.ctx.set_font(&style.css_font());
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(&style.color.to_css());
        self.ctx.fill_text(text, position.x, position.y).ok();
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> f64 {
        self.ctx.set_font(&style.css_font());
        self.ctx
            .measure_text(text)
            .map_or_else(|_| text.chars().count() as f64 * style.size * 0.6, |m| m.width())
    }
}
