use super::color::Color;
use crate::math::Vec2;

/// Anything the garden can be drawn onto
pub trait Surface {
    /// Drawable size in pixels
    fn size(&self) -> (f32, f32);

    fn clear(&mut self, background: Color);

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);

    /// Stroke many segments sharing one width and color as a single path
    fn line_batch(&mut self, segments: &[(Vec2, Vec2)], width: f32, color: Color);

    fn circle(&mut self, center: Vec2, radius: f32, color: Color);
}

/// Draw call captured by [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear(Color),
    Line { from: Vec2, to: Vec2, width: f32, color: Color },
    Lines { segments: Vec<(Vec2, Vec2)>, width: f32, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
}

/// Surface that records draw calls instead of rasterizing them
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub width: f32,
    pub height: f32,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(|c| matches!(c, DrawCall::Line { .. }))
    }

    pub fn batches(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(|c| matches!(c, DrawCall::Lines { .. }))
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(|c| matches!(c, DrawCall::Circle { .. }))
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self, background: Color) {
        self.calls.clear();
        self.calls.push(DrawCall::Clear(background));
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.calls.push(DrawCall::Line { from, to, width, color });
    }

    fn line_batch(&mut self, segments: &[(Vec2, Vec2)], width: f32, color: Color) {
        if segments.is_empty() {
            return;
        }
        self.calls.push(DrawCall::Lines {
            segments: segments.to_vec(),
            width,
            color,
        });
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.calls.push(DrawCall::Circle { center, radius, color });
    }
}
