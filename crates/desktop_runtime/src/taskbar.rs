//! Taskbar strip mirroring the window list.
//!
//! The taskbar does not subscribe to window events. It polls the windows layer once per frame
//! and reconciles one button per window, ordered bottom-to-top like the z-order.

use platform_host::{RenderSurface, Vec2, WindowRect};

use crate::element::{Element, ElementKind, Tooltip};
use crate::error::DesktopResult;
use crate::model::ElementId;
use crate::theme;
use crate::tree::ElementTree;
use crate::window::WindowState;

const MARGIN: f32 = 4.0;
const GAP: f32 = 2.0;
const PREVIEW_WIDTH: f32 = 180.0;

/// What clicking a taskbar button does to its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskbarCommand {
    Restore(ElementId),
    Minimize(ElementId),
    Activate(ElementId),
}

impl TaskbarCommand {
    /// Minimized windows restore, the active window minimizes, anything else is activated.
    pub fn for_window(window: ElementId, state: &WindowState, is_active: bool) -> Self {
        if state.is_minimized() {
            Self::Restore(window)
        } else if is_active && state.flags().minimizable {
            Self::Minimize(window)
        } else {
            Self::Activate(window)
        }
    }
}

/// Button rectangles inside a taskbar of `bar` size, left to right.
pub fn button_rects(count: usize, bar: Vec2, button_width: f32) -> Vec<WindowRect> {
    if count == 0 {
        return Vec::new();
    }
    let available = (bar.x - MARGIN * 2.0 - GAP * (count - 1) as f32).max(0.0);
    let width = button_width.min(available / count as f32).max(1.0);
    let height = (bar.y - MARGIN * 2.0).max(1.0);
    (0..count)
        .map(|index| {
            WindowRect::new(
                MARGIN + index as f32 * (width + GAP),
                MARGIN,
                width,
                height,
            )
        })
        .collect()
}

/// The taskbar element and its window-to-button mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taskbar {
    element: ElementId,
    buttons: Vec<(ElementId, ElementId)>,
}

impl Taskbar {
    pub(crate) fn new(element: ElementId) -> Self {
        Self {
            element,
            buttons: Vec::new(),
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// `(window, button)` pairs in bottom-to-top z-order.
    pub fn buttons(&self) -> &[(ElementId, ElementId)] {
        &self.buttons
    }

    pub fn button_for(&self, window: ElementId) -> Option<ElementId> {
        self.buttons
            .iter()
            .find(|(candidate, _)| *candidate == window)
            .map(|(_, button)| *button)
    }

    pub fn window_for(&self, button: ElementId) -> Option<ElementId> {
        self.buttons
            .iter()
            .find(|(_, candidate)| *candidate == button)
            .map(|(window, _)| *window)
    }

    /// Absolute centre of `window`'s button; the minimize animation shrinks toward it.
    pub fn anchor_for(&self, tree: &ElementTree, window: ElementId) -> Option<Vec2> {
        self.button_for(window)
            .map(|button| tree.absolute_bounds(button).center())
    }

    /// Reconciles buttons with the windows currently under `layer`.
    ///
    /// Returns the button elements removed from the tree.
    pub(crate) fn sync(
        &mut self,
        tree: &mut ElementTree,
        layer: ElementId,
        button_width: f32,
    ) -> DesktopResult<Vec<(ElementId, Element)>> {
        let windows: Vec<ElementId> = tree
            .children(layer)
            .iter()
            .copied()
            .filter(|id| tree.window(*id).is_some())
            .collect();

        let mut removed = Vec::new();
        let (kept, stale): (Vec<_>, Vec<_>) = std::mem::take(&mut self.buttons)
            .into_iter()
            .partition(|(window, _)| windows.contains(window));
        for (_, button) in stale {
            if tree.contains(button) {
                removed.extend(tree.remove_child(self.element, button)?);
            }
        }
        self.buttons = kept;

        for window in &windows {
            if self.button_for(*window).is_none() {
                let button = tree.insert(Element::new(ElementKind::TaskbarButton {
                    window: *window,
                }));
                tree.add_child(self.element, button)?;
                self.buttons.push((*window, button));
            }
        }

        self.buttons.sort_by_key(|(window, _)| {
            windows
                .iter()
                .position(|candidate| candidate == window)
                .unwrap_or(usize::MAX)
        });
        let order: Vec<ElementId> = self.buttons.iter().map(|(_, button)| *button).collect();
        tree.reorder_children(self.element, order);

        let bar = tree.element(self.element)?.size;
        let rects = button_rects(self.buttons.len(), bar, button_width);
        for ((window, button), rect) in self.buttons.iter().zip(rects) {
            let title = tree.window(*window).map(|state| state.title().to_string());
            let element = tree.element_mut(*button)?;
            element.set_bounds(rect);
            match title {
                Some(title) if element.tooltip.as_ref().map(|tip| &tip.text) != Some(&title) => {
                    element.tooltip = Some(Tooltip::new(title));
                }
                _ => {}
            }
        }
        Ok(removed)
    }
}

/// Longest prefix of `text` (with an ellipsis when cut) that fits in `max_width`.
fn fit_text(surface: &dyn RenderSurface, text: &str, max_width: f32) -> String {
    if surface.measure_text(text, theme::TEXT_SIZE).x <= max_width {
        return text.to_string();
    }
    let mut fitted: String = text.to_string();
    while !fitted.is_empty() {
        fitted.pop();
        let candidate = format!("{fitted}...");
        if surface.measure_text(&candidate, theme::TEXT_SIZE).x <= max_width {
            return candidate;
        }
    }
    String::new()
}

pub(crate) fn draw_bar(bounds: WindowRect, opacity: f32, surface: &mut dyn RenderSurface) {
    surface.fill_rounded_rect(bounds, 0.0, theme::TASKBAR_FILL.with_opacity(opacity));
    surface.stroke_rounded_rect(
        WindowRect::new(bounds.x, bounds.y, bounds.w, theme::BORDER_WIDTH),
        0.0,
        theme::BORDER_WIDTH,
        theme::WINDOW_BORDER.with_opacity(opacity),
    );
}

/// Visual state of one taskbar button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ButtonLook {
    pub active: bool,
    pub hovered: bool,
    pub minimized: bool,
}

pub(crate) fn draw_button(
    bounds: WindowRect,
    title: &str,
    look: ButtonLook,
    surface: &mut dyn RenderSurface,
) {
    let face = if look.active {
        theme::BUTTON_PRESSED
    } else if look.hovered {
        theme::BUTTON_HOVER
    } else {
        theme::BUTTON_FACE
    };
    surface.fill_rounded_rect(bounds, theme::CORNER_RADIUS, face);
    surface.stroke_rounded_rect(
        bounds,
        theme::CORNER_RADIUS,
        theme::BORDER_WIDTH,
        theme::WINDOW_BORDER,
    );
    let label = fit_text(surface, title, bounds.w - 12.0);
    let color = if look.minimized {
        theme::TEXT_DISABLED
    } else {
        theme::TEXT
    };
    surface.draw_text(
        &label,
        Vec2::new(bounds.x + 6.0, bounds.y + (bounds.h - theme::TEXT_SIZE) / 2.0),
        theme::TEXT_SIZE,
        color,
    );
}

/// Thumbnail rectangle above `button` for a snapshot of `snapshot_size`, kept on `screen`.
pub(crate) fn preview_rect(
    button: WindowRect,
    snapshot_size: Vec2,
    screen: WindowRect,
) -> WindowRect {
    let aspect = if snapshot_size.x > 0.0 {
        snapshot_size.y / snapshot_size.x
    } else {
        0.75
    };
    let size = Vec2::new(PREVIEW_WIDTH, PREVIEW_WIDTH * aspect);
    let mut x = button.center().x - size.x / 2.0;
    x = x.clamp(screen.x, (screen.right() - size.x).max(screen.x));
    let y = (button.y - size.y - MARGIN).max(screen.y);
    WindowRect::from_pos_size(Vec2::new(x, y), size)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::window::WindowSpec;

    fn window_element(title: &str) -> Element {
        let mut spec = WindowSpec::new(title);
        let rect = WindowRect::new(0.0, 0.0, 200.0, 150.0);
        let state = WindowState::new(&mut spec, rect, 28.0, 6.0);
        Element::new(ElementKind::Window(Box::new(state))).with_bounds(rect)
    }

    fn setup() -> (ElementTree, ElementId, Taskbar) {
        let mut tree = ElementTree::new(Vec2::new(800.0, 600.0));
        let root = tree.root();
        let layer = tree.insert(Element::container());
        tree.add_child(root, layer).expect("layer");
        let bar = tree.insert(
            Element::new(ElementKind::Taskbar)
                .with_bounds(WindowRect::new(0.0, 560.0, 800.0, 40.0)),
        );
        tree.add_child(root, bar).expect("bar");
        (tree, layer, Taskbar::new(bar))
    }

    #[test]
    fn buttons_follow_window_z_order() {
        let (mut tree, layer, mut taskbar) = setup();
        let a = tree.insert(window_element("A"));
        let b = tree.insert(window_element("B"));
        tree.add_child(layer, a).expect("a");
        tree.add_child(layer, b).expect("b");

        taskbar.sync(&mut tree, layer, 160.0).expect("sync");
        let windows: Vec<ElementId> = taskbar.buttons().iter().map(|(w, _)| *w).collect();
        assert_eq!(windows, vec![a, b]);

        tree.bring_to_front(a).expect("raise");
        taskbar.sync(&mut tree, layer, 160.0).expect("sync");
        let windows: Vec<ElementId> = taskbar.buttons().iter().map(|(w, _)| *w).collect();
        assert_eq!(windows, vec![b, a]);

        let first = taskbar.button_for(b).expect("button");
        assert_eq!(
            tree.absolute_bounds(first),
            WindowRect::new(4.0, 564.0, 160.0, 32.0)
        );
        assert_eq!(tree.children(taskbar.element())[0], first);
    }

    #[test]
    fn removed_windows_lose_their_buttons() {
        let (mut tree, layer, mut taskbar) = setup();
        let a = tree.insert(window_element("A"));
        tree.add_child(layer, a).expect("a");
        taskbar.sync(&mut tree, layer, 160.0).expect("sync");
        let button = taskbar.button_for(a).expect("button");

        tree.remove_child(layer, a).expect("remove");
        let removed = taskbar.sync(&mut tree, layer, 160.0).expect("sync");
        assert_eq!(removed.len(), 1);
        assert!(!tree.contains(button));
        assert!(taskbar.buttons().is_empty());
    }

    #[test]
    fn buttons_shrink_to_fit() {
        let rects = button_rects(4, Vec2::new(200.0, 40.0), 160.0);
        assert_eq!(rects.len(), 4);
        assert!(rects.iter().all(|rect| rect.right() <= 196.0 + 0.01));
        assert!(button_rects(0, Vec2::new(200.0, 40.0), 160.0).is_empty());
    }

    #[test]
    fn preview_sits_above_the_button_and_on_screen() {
        let screen = WindowRect::new(0.0, 0.0, 800.0, 600.0);
        let rect = preview_rect(
            WindowRect::new(0.0, 564.0, 100.0, 32.0),
            Vec2::new(400.0, 300.0),
            screen,
        );
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.size(), Vec2::new(180.0, 135.0));
        assert!(rect.bottom() <= 564.0);
    }
}
