//! Shared palette and metrics for built-in chrome and widgets.

use platform_host::Color;

pub const DESKTOP_BACKGROUND: Color = Color::rgba(0.0, 0.5, 0.5, 1.0);
pub const WINDOW_FRAME: Color = Color::rgba(0.75, 0.75, 0.75, 1.0);
pub const WINDOW_BORDER: Color = Color::rgba(0.25, 0.25, 0.25, 1.0);
pub const WINDOW_CONTENT: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
pub const TITLE_ACTIVE: Color = Color::rgba(0.0, 0.0, 0.5, 1.0);
pub const TITLE_INACTIVE: Color = Color::rgba(0.5, 0.5, 0.5, 1.0);
pub const TITLE_FLASH: Color = Color::rgba(0.1, 0.4, 0.9, 1.0);
pub const TITLE_TEXT: Color = Color::WHITE;
pub const BUTTON_FACE: Color = Color::rgba(0.75, 0.75, 0.75, 1.0);
pub const BUTTON_HOVER: Color = Color::rgba(0.85, 0.85, 0.85, 1.0);
pub const BUTTON_PRESSED: Color = Color::rgba(0.6, 0.6, 0.6, 1.0);
pub const TEXT: Color = Color::BLACK;
pub const TEXT_DISABLED: Color = Color::rgba(0.5, 0.5, 0.5, 1.0);
pub const HIGHLIGHT: Color = Color::rgba(0.0, 0.0, 0.5, 1.0);
pub const HIGHLIGHT_TEXT: Color = Color::WHITE;
pub const TOOLTIP_FILL: Color = Color::rgba(1.0, 1.0, 0.88, 1.0);
pub const SNAP_PREVIEW: Color = Color::rgba(0.6, 0.75, 1.0, 0.35);
pub const TASKBAR_FILL: Color = Color::rgba(0.75, 0.75, 0.75, 1.0);
pub const DRAG_NONE: Color = Color::rgba(0.85, 0.85, 0.85, 0.9);
pub const DRAG_COPY: Color = Color::rgba(0.55, 0.85, 0.55, 0.9);
pub const DRAG_MOVE: Color = Color::rgba(0.6, 0.75, 1.0, 0.9);
pub const DRAG_LINK: Color = Color::rgba(0.95, 0.8, 0.45, 0.9);
pub const DROP_PREVIEW: Color = Color::rgba(0.25, 0.25, 0.25, 0.5);

pub const CORNER_RADIUS: f32 = 3.0;
pub const TEXT_SIZE: f32 = 13.0;
pub const BORDER_WIDTH: f32 = 1.0;
