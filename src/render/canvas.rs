use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use super::color::Color;
use super::surface::Surface;
use crate::math::Vec2;

/// HTML canvas 2D context as a drawing surface
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f32,
    height: f32,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("Failed to get 2D context: {:?}", e))?
            .ok_or("Canvas has no 2D context")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "Context is not a CanvasRenderingContext2d".to_string())?;

        ctx.set_line_cap("round");

        Ok(Self {
            ctx,
            width: canvas.width() as f32,
            height: canvas.height() as f32,
        })
    }

    /// Resizing the canvas element resets the context state, so styles set in
    /// `new` are applied again here.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.ctx.set_line_cap("round");
    }
}

#[allow(deprecated)]
impl Surface for CanvasSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self, background: Color) {
        self.ctx.set_fill_style(&JsValue::from_str(&background.to_css()));
        self.ctx.fill_rect(0.0, 0.0, self.width as f64, self.height as f64);
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        let ctx = &self.ctx;
        ctx.set_stroke_style(&JsValue::from_str(&color.to_css()));
        ctx.set_line_width(width as f64);
        ctx.begin_path();
        ctx.move_to(from.x as f64, from.y as f64);
        ctx.line_to(to.x as f64, to.y as f64);
        ctx.stroke();
    }

    fn line_batch(&mut self, segments: &[(Vec2, Vec2)], width: f32, color: Color) {
        if segments.is_empty() {
            return;
        }
        let ctx = &self.ctx;
        ctx.set_stroke_style(&JsValue::from_str(&color.to_css()));
        ctx.set_line_width(width as f64);
        ctx.begin_path();
        for (from, to) in segments {
            ctx.move_to(from.x as f64, from.y as f64);
            ctx.line_to(to.x as f64, to.y as f64);
        }
        ctx.stroke();
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let ctx = &self.ctx;
        ctx.set_fill_style(&JsValue::from_str(&color.to_css()));
        ctx.begin_path();
        // arc only fails for negative radii
        if ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, std::f64::consts::TAU)
            .is_ok()
        {
            ctx.fill();
        }
    }
}
