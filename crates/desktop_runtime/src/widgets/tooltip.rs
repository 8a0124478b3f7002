//! Delayed hover tooltips.

use platform_host::{RenderSurface, Vec2, WindowRect};

use crate::model::ElementId;
use crate::theme;

const POINTER_OFFSET: Vec2 = Vec2::new(12.0, 18.0);
const PADDING: f32 = 4.0;

/// Tracks how long the pointer has rested on the current tooltip owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TooltipTracker {
    owner: Option<ElementId>,
    since_frame: u64,
    delay_frames: u32,
    suppressed: bool,
}

impl TooltipTracker {
    /// Feeds this frame's tooltip candidate. A press hides the tooltip until the owner changes.
    pub fn update(&mut self, candidate: Option<(ElementId, u32)>, frame: u64, pressed: bool) {
        let owner = candidate.map(|(id, _)| id);
        if owner != self.owner {
            self.owner = owner;
            self.since_frame = frame;
            self.suppressed = false;
        }
        self.delay_frames = candidate.map(|(_, delay)| delay).unwrap_or(0);
        if pressed {
            self.suppressed = true;
        }
    }

    /// Element whose tooltip is showing at `frame`.
    pub fn visible_owner(&self, frame: u64) -> Option<ElementId> {
        let owner = self.owner?;
        let rested = frame.saturating_sub(self.since_frame) >= u64::from(self.delay_frames);
        (rested && !self.suppressed).then_some(owner)
    }

    pub fn forget(&mut self, element: ElementId) {
        if self.owner == Some(element) {
            *self = Self::default();
        }
    }
}

/// Tooltip box for `text` near `pointer`, kept inside `screen`.
pub(crate) fn tooltip_rect(text_size: Vec2, pointer: Vec2, screen: WindowRect) -> WindowRect {
    let size = Vec2::new(text_size.x + PADDING * 2.0, text_size.y + PADDING * 2.0);
    let mut origin = pointer + POINTER_OFFSET;
    if origin.x + size.x > screen.right() {
        origin.x = (screen.right() - size.x).max(screen.x);
    }
    if origin.y + size.y > screen.bottom() {
        origin.y = (pointer.y - size.y - 4.0).max(screen.y);
    }
    WindowRect::from_pos_size(origin, size)
}

pub(crate) fn draw_tooltip(
    text: &str,
    pointer: Vec2,
    screen: WindowRect,
    surface: &mut dyn RenderSurface,
) {
    let measured = surface.measure_text(text, theme::TEXT_SIZE);
    let rect = tooltip_rect(measured, pointer, screen);
    surface.fill_rounded_rect(rect, 2.0, theme::TOOLTIP_FILL);
    surface.stroke_rounded_rect(rect, 2.0, theme::BORDER_WIDTH, theme::WINDOW_BORDER);
    surface.draw_text(
        text,
        Vec2::new(rect.x + PADDING, rect.y + PADDING),
        theme::TEXT_SIZE,
        theme::TEXT,
    );
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use slotmap::SlotMap;

    use super::*;

    #[test]
    fn tooltip_shows_after_delay_and_hides_on_press() {
        let mut arena: SlotMap<ElementId, ()> = SlotMap::with_key();
        let id = arena.insert(());
        let mut tracker = TooltipTracker::default();

        tracker.update(Some((id, 3)), 10, false);
        assert_eq!(tracker.visible_owner(12), None);
        tracker.update(Some((id, 3)), 13, false);
        assert_eq!(tracker.visible_owner(13), Some(id));

        tracker.update(Some((id, 3)), 14, true);
        assert_eq!(tracker.visible_owner(20), None);

        tracker.update(None, 21, false);
        tracker.update(Some((id, 3)), 22, false);
        assert_eq!(tracker.visible_owner(25), Some(id));
    }

    #[test]
    fn tooltip_rect_flips_at_screen_edges() {
        let screen = WindowRect::new(0.0, 0.0, 200.0, 100.0);
        let rect = tooltip_rect(Vec2::new(50.0, 10.0), Vec2::new(190.0, 95.0), screen);
        assert!(rect.right() <= screen.right());
        assert!(rect.bottom() <= screen.bottom());
    }
}
