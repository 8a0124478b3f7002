//! Title-bar behavior objects selected per window.

use platform_host::{RenderSurface, Vec2, WindowRect};

use crate::theme;
use crate::window::WindowFlags;

/// Caption buttons laid out by a chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChromeButton {
    Minimize,
    Maximize,
    Close,
}

/// Everything a chrome needs to draw one frame.
#[derive(Debug, Clone)]
pub struct ChromeFrame<'a> {
    /// Absolute window bounds.
    pub bounds: WindowRect,
    pub title: &'a str,
    /// Window is the active window.
    pub active: bool,
    /// Flash highlight phase is on.
    pub flashing: bool,
    pub maximized: bool,
    /// Composited window opacity.
    pub opacity: f32,
    pub hovered_button: Option<ChromeButton>,
    pub pressed_button: Option<ChromeButton>,
    pub flags: WindowFlags,
}

/// Title-bar layout and drawing, composed into a window instead of subclassing it.
pub trait WindowChrome {
    /// Height reserved above the content area.
    fn title_bar_height(&self) -> f32;

    /// Caption buttons and their window-local rectangles.
    fn button_rects(&self, size: Vec2, flags: &WindowFlags) -> Vec<(ChromeButton, WindowRect)>;

    /// Draws the frame, title bar, and caption buttons.
    fn draw(&self, frame: &ChromeFrame<'_>, surface: &mut dyn RenderSurface);

    /// Caption button under a window-local point.
    fn button_at(&self, local: Vec2, size: Vec2, flags: &WindowFlags) -> Option<ChromeButton> {
        self.button_rects(size, flags)
            .into_iter()
            .find(|(_, rect)| rect.contains(local))
            .map(|(button, _)| button)
    }
}

/// Classic caption bar with minimize, maximize, and close buttons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardChrome {
    title_bar_height: f32,
}

impl StandardChrome {
    const BUTTON_SIZE: f32 = 18.0;
    const BUTTON_GAP: f32 = 2.0;

    pub fn new(title_bar_height: f32) -> Self {
        Self {
            title_bar_height: title_bar_height.max(Self::BUTTON_SIZE),
        }
    }
}

impl WindowChrome for StandardChrome {
    fn title_bar_height(&self) -> f32 {
        self.title_bar_height
    }

    fn button_rects(&self, size: Vec2, flags: &WindowFlags) -> Vec<(ChromeButton, WindowRect)> {
        let top = (self.title_bar_height - Self::BUTTON_SIZE) / 2.0;
        let mut right = size.x - 4.0;
        let mut rects = Vec::with_capacity(3);
        for (button, shown) in [
            (ChromeButton::Close, flags.closable),
            (ChromeButton::Maximize, flags.maximizable),
            (ChromeButton::Minimize, flags.minimizable),
        ] {
            if !shown {
                continue;
            }
            right -= Self::BUTTON_SIZE;
            rects.push((
                button,
                WindowRect::new(right, top, Self::BUTTON_SIZE, Self::BUTTON_SIZE),
            ));
            right -= Self::BUTTON_GAP;
        }
        rects.reverse();
        rects
    }

    fn draw(&self, frame: &ChromeFrame<'_>, surface: &mut dyn RenderSurface) {
        let opacity = frame.opacity;
        let bounds = frame.bounds;
        surface.fill_rounded_rect(
            bounds,
            theme::CORNER_RADIUS,
            theme::WINDOW_FRAME.with_opacity(opacity),
        );
        surface.stroke_rounded_rect(
            bounds,
            theme::CORNER_RADIUS,
            theme::BORDER_WIDTH,
            theme::WINDOW_BORDER.with_opacity(opacity),
        );

        let title_fill = if frame.flashing {
            theme::TITLE_FLASH
        } else if frame.active {
            theme::TITLE_ACTIVE
        } else {
            theme::TITLE_INACTIVE
        };
        let bar = WindowRect::new(bounds.x, bounds.y, bounds.w, self.title_bar_height).inset(2.0);
        surface.fill_rounded_rect(bar, theme::CORNER_RADIUS, title_fill.with_opacity(opacity));

        let text_y = bounds.y + (self.title_bar_height - theme::TEXT_SIZE) / 2.0;
        surface.draw_text(
            frame.title,
            Vec2::new(bounds.x + 8.0, text_y),
            theme::TEXT_SIZE,
            theme::TITLE_TEXT.with_opacity(opacity),
        );

        for (button, local) in self.button_rects(bounds.size(), &frame.flags) {
            let rect = local.offset(bounds.position());
            let face = if frame.pressed_button == Some(button) {
                theme::BUTTON_PRESSED
            } else if frame.hovered_button == Some(button) {
                theme::BUTTON_HOVER
            } else {
                theme::BUTTON_FACE
            };
            surface.fill_rounded_rect(rect, 2.0, face.with_opacity(opacity));
            let glyph = match button {
                ChromeButton::Minimize => "_",
                ChromeButton::Maximize if frame.maximized => "o",
                ChromeButton::Maximize => "[]",
                ChromeButton::Close => "x",
            };
            surface.draw_text(
                glyph,
                Vec2::new(rect.x + 5.0, rect.y + 2.0),
                theme::TEXT_SIZE,
                theme::TEXT.with_opacity(opacity),
            );
        }
    }
}

/// No title bar and no caption buttons; content fills the whole window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BorderlessChrome;

impl WindowChrome for BorderlessChrome {
    fn title_bar_height(&self) -> f32 {
        0.0
    }

    fn button_rects(&self, _size: Vec2, _flags: &WindowFlags) -> Vec<(ChromeButton, WindowRect)> {
        Vec::new()
    }

    fn draw(&self, _frame: &ChromeFrame<'_>, _surface: &mut dyn RenderSurface) {}
}
