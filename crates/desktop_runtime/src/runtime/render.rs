//! The draw pass. The tree is only read here; the exceptions are the GPU handles windows own.

use desktop_window_contract::{ContentError, DragDropService};
use platform_host::{RenderSurface, Vec2, WindowRect};

use super::{DesktopRuntime, PendingRelease};
use crate::element::{Element, ElementKind};
use crate::error::DesktopResult;
use crate::model::ElementId;
use crate::taskbar::{self, ButtonLook};
use crate::theme;
use crate::widgets::tooltip::draw_tooltip;
use crate::widgets::WidgetDrawContext;
use crate::window::{ChromeFrame, Interaction, WindowState};

type Faults = Vec<(ElementId, ContentError)>;

impl DesktopRuntime {
    /// Draws one frame: desktop, windows through their offscreen targets, taskbar, then the
    /// overlays (snap preview, taskbar preview, tooltip, context menu, drag payload).
    ///
    /// GPU handles freed since the last frame are released first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DesktopError::Widget`] when a widget outside any application-owned
    /// window failed to draw.
    pub fn render(&mut self, surface: &mut dyn RenderSurface) -> DesktopResult<()> {
        self.flush_releases(surface);
        self.prepare_window_targets(surface);

        surface.fill_rounded_rect(self.config.screen_rect(), 0.0, theme::DESKTOP_BACKGROUND);
        let mut faults = Vec::new();
        self.draw_element(self.tree.root(), 1.0, surface, &mut faults);
        self.draw_overlays(surface);

        self.faults.extend(faults);
        self.route_faults()
    }

    /// Render targets and snapshots waiting for the next [`render`](Self::render) to free them.
    pub fn pending_release_count(&self) -> usize {
        self.pending_releases.len()
    }

    fn flush_releases(&mut self, surface: &mut dyn RenderSurface) {
        for release in self.pending_releases.drain(..) {
            match release {
                PendingRelease::Target(target) => surface.release_render_target(target),
                PendingRelease::Texture(texture) => surface.release_texture(texture),
            }
        }
    }

    /// Captures requested snapshots from last frame's content, then creates or resizes each
    /// visible window's target to its content size.
    fn prepare_window_targets(&mut self, surface: &mut dyn RenderSurface) {
        let windows = self.tree.children(self.windows_layer).to_vec();
        for window in windows {
            let Some(element) = self.tree.get_mut(window) else {
                continue;
            };
            let visible = element.visible;
            let size = element.size;
            let Some(state) = element.window_mut() else {
                continue;
            };

            if state.snapshot_requested {
                state.snapshot_requested = false;
                if let Some(target) = &state.render_target {
                    let snapshot = surface.capture_snapshot(target);
                    if let Some(stale) = state.snapshot.replace(snapshot) {
                        surface.release_texture(stale);
                    }
                }
            }
            if !visible || state.is_minimized() {
                continue;
            }

            let content = state
                .content_rect(WindowRect::from_pos_size(Vec2::ZERO, size))
                .size();
            match state.render_target.as_mut() {
                Some(target) if !target.matches(content) => {
                    surface.resize_render_target(target, content);
                }
                Some(_) => {}
                None => state.render_target = Some(surface.create_render_target(content)),
            }
        }
    }

    fn draw_element(
        &self,
        id: ElementId,
        parent_opacity: f32,
        surface: &mut dyn RenderSurface,
        faults: &mut Faults,
    ) {
        let Some(element) = self.tree.get(id) else {
            return;
        };
        if !element.visible {
            return;
        }
        let opacity = parent_opacity * element.opacity;
        let bounds = self.tree.absolute_bounds(id);

        match &element.kind {
            ElementKind::Window(state) => {
                self.draw_window(id, element, state, opacity, surface, faults);
                return;
            }
            ElementKind::Container => {}
            ElementKind::Panel(style) => style.draw(bounds, opacity, surface),
            ElementKind::Label(label) => label.draw(bounds.position(), opacity, surface),
            ElementKind::Taskbar => taskbar::draw_bar(bounds, opacity, surface),
            ElementKind::TaskbarButton { window } => {
                let state = self.tree.window(*window);
                let look = ButtonLook {
                    active: self.focus.active_window() == Some(*window),
                    hovered: self.is_hovered(id),
                    minimized: state.is_some_and(WindowState::is_minimized),
                };
                let title = state.map(WindowState::title).unwrap_or_default();
                taskbar::draw_button(bounds, title, look, surface);
            }
            ElementKind::Custom(widget) => {
                let ctx = WidgetDrawContext {
                    element: id,
                    bounds,
                    opacity,
                    hovered: self.is_hovered(id),
                    focused: self.focus.focused_element() == Some(id),
                };
                if let Err(err) = widget.draw(&ctx, surface) {
                    faults.push((id, err));
                }
            }
        }

        for child in element.children() {
            self.draw_element(*child, opacity, surface, faults);
        }
    }

    /// Chrome straight to the framebuffer; content and children through the window's target,
    /// blitted once with the window's composited opacity.
    fn draw_window(
        &self,
        id: ElementId,
        element: &Element,
        state: &WindowState,
        opacity: f32,
        surface: &mut dyn RenderSurface,
        faults: &mut Faults,
    ) {
        let bounds = self.tree.absolute_bounds(id);
        if state.is_minimized() {
            if let Some(snapshot) = &state.snapshot {
                surface.blit_texture(snapshot, bounds, opacity);
                return;
            }
        }

        let hovered_button = (self.hovered == Some(id))
            .then(|| {
                state.chrome.button_at(
                    self.pointer.position - bounds.position(),
                    bounds.size(),
                    &state.flags,
                )
            })
            .flatten();
        let pressed_button = match state.interaction {
            Some(Interaction::Button(button)) => Some(button),
            _ => None,
        };
        state.chrome.draw(
            &ChromeFrame {
                bounds,
                title: &state.title,
                active: self.focus.active_window() == Some(id),
                flashing: state.flash_phase_on(),
                maximized: state.is_maximized(),
                opacity,
                hovered_button,
                pressed_button,
                flags: state.flags,
            },
            surface,
        );

        let Some(target) = &state.render_target else {
            return;
        };
        let content = state.content_rect(bounds);
        surface.begin_target(
            target,
            content.position(),
            WindowRect::from_pos_size(Vec2::ZERO, content.size()),
        );
        surface.fill_rounded_rect(content, 0.0, theme::WINDOW_CONTENT);
        for child in element.children() {
            self.draw_element(*child, 1.0, surface, faults);
        }
        surface.end_target();
        surface.blit_target(target, content, opacity);
    }

    fn draw_overlays(&self, surface: &mut dyn RenderSurface) {
        let screen = self.config.screen_rect();
        let work_area = self.config.work_area();
        for window in self.tree.children(self.windows_layer) {
            if let Some(snap) = self.tree.window(*window).and_then(WindowState::snap_preview) {
                surface.fill_rounded_rect(
                    snap.rect(work_area),
                    theme::CORNER_RADIUS,
                    theme::SNAP_PREVIEW,
                );
            }
        }

        if let Some(button) = self.hovered {
            if let Some(ElementKind::TaskbarButton { window }) =
                self.tree.get(button).map(|element| &element.kind)
            {
                let snapshot = self
                    .tree
                    .window(*window)
                    .filter(|state| state.is_minimized())
                    .and_then(|state| state.snapshot.as_ref());
                if let Some(snapshot) = snapshot {
                    let rect = taskbar::preview_rect(
                        self.tree.absolute_bounds(button),
                        snapshot.size(),
                        screen,
                    );
                    surface.blit_texture(snapshot, rect, 1.0);
                    surface.stroke_rounded_rect(
                        rect,
                        theme::CORNER_RADIUS,
                        theme::BORDER_WIDTH,
                        theme::WINDOW_BORDER,
                    );
                }
            }
        }

        if let Some(owner) = self.tooltip_owner() {
            let tooltip = self.tree.get(owner).and_then(|element| element.tooltip.as_ref());
            if let Some(tooltip) = tooltip {
                draw_tooltip(&tooltip.text, self.pointer.position, screen, surface);
            }
        }
        if let Some(menu) = &self.context_menu {
            menu.draw(surface);
        }
        self.drag.draw(surface);
    }
}
