//! Filled, optionally bordered rounded rectangles.

use platform_host::{Color, RenderSurface, WindowRect};
use serde::{Deserialize, Serialize};

use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelStyle {
    pub fill: Color,
    pub border: Option<Color>,
    pub radius: f32,
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            fill: theme::WINDOW_FRAME,
            border: None,
            radius: theme::CORNER_RADIUS,
        }
    }
}

impl PanelStyle {
    pub fn filled(fill: Color) -> Self {
        Self {
            fill,
            ..Self::default()
        }
    }

    pub fn with_border(mut self, border: Color) -> Self {
        self.border = Some(border);
        self
    }

    pub(crate) fn draw(&self, bounds: WindowRect, opacity: f32, surface: &mut dyn RenderSurface) {
        surface.fill_rounded_rect(bounds, self.radius, self.fill.with_opacity(opacity));
        if let Some(border) = self.border {
            surface.stroke_rounded_rect(
                bounds,
                self.radius,
                theme::BORDER_WIDTH,
                border.with_opacity(opacity),
            );
        }
    }
}
