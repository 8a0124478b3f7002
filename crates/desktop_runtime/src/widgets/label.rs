//! Single-line text.

use platform_host::{Color, RenderSurface, Vec2};

use crate::theme;

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub size: f32,
    pub color: Color,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: theme::TEXT_SIZE,
            color: theme::TEXT,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub(crate) fn draw(&self, origin: Vec2, opacity: f32, surface: &mut dyn RenderSurface) {
        surface.draw_text(&self.text, origin, self.size, self.color.with_opacity(opacity));
    }
}
