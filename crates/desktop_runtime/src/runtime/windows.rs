//! Window state-machine transitions, activation, and window-level requests.

use desktop_window_contract::{ProcessId, WindowLifecycleEvent};
use platform_host::{Vec2, WindowRect};
use tracing::{debug, warn};

use super::{DesktopRuntime, TweenCompletion};
use crate::actions::PendingAction;
use crate::element::{Element, ElementKind};
use crate::error::{DesktopError, DesktopResult};
use crate::model::{ElementId, SnapTarget, WindowMode};
use crate::observers::ElementEvent;
use crate::tween::{Easing, TweenProperty, TAG_GEOMETRY, TAG_OPACITY};
use crate::window::geometry::{cascade_rect, minimize_rect};
use crate::window::{
    CloseVerdict, MinimizeMemory, StepOutcome, StepSequence, WindowSpec, WindowState,
};
use crate::window_manager;

const DEFAULT_WINDOW_SIZE: Vec2 = Vec2::new(480.0, 320.0);

fn is_finite_rect(rect: WindowRect) -> bool {
    rect.x.is_finite() && rect.y.is_finite() && rect.w.is_finite() && rect.h.is_finite()
}

impl DesktopRuntime {
    /// Opens a window on top of the z-order and makes it active.
    ///
    /// A layout persisted for the window's application id wins over the requested rectangle; with
    /// neither, windows cascade from the top-left of the work area. Sizes below the minimum are
    /// clamped, never rejected.
    ///
    /// # Errors
    ///
    /// Fails when `spec` names a parent that is not a window.
    pub fn open_window(&mut self, mut spec: WindowSpec) -> DesktopResult<ElementId> {
        if let Some(parent) = spec.parent {
            self.tree.require_window(parent)?;
        }

        let layout = spec
            .app_id
            .as_ref()
            .and_then(|app_id| self.persistence.load(app_id));
        let fallback = cascade_rect(
            self.opened_windows,
            self.config.work_area(),
            DEFAULT_WINDOW_SIZE,
        );
        let min = self.config.min_size();
        let rect = layout
            .map(|layout| layout.rect)
            .or(spec.rect)
            .filter(|rect| is_finite_rect(*rect))
            .unwrap_or(fallback)
            .clamped_min(min.x, min.y);

        let owner = spec.owner;
        let parent = spec.parent;
        let state = WindowState::new(
            &mut spec,
            rect,
            self.config.title_bar_height,
            self.config.resize_margin,
        );
        let id = self
            .tree
            .insert(Element::new(ElementKind::Window(Box::new(state))).with_bounds(rect));
        self.tree.add_child(self.windows_layer, id)?;
        if let Some(parent) = parent {
            self.tree.require_window_mut(parent)?.child_windows.push(id);
        }
        self.opened_windows += 1;

        if layout.is_some_and(|layout| layout.maximized) {
            let work_area = self.config.work_area();
            let state = self.tree.require_window_mut(id)?;
            if state.flags.maximizable {
                state.mode = WindowMode::Maximized;
                state.resting_mode = WindowMode::Maximized;
                self.tree.element_mut(id)?.set_bounds(work_area);
            }
        }

        debug!(window = ?id, title = %spec.title, ?rect, "window opened");
        self.activate_window(id)?;
        if let Some(owner) = owner {
            self.set_owner_process(id, owner)?;
        }
        self.sync_taskbar()?;
        Ok(id)
    }

    /// Assigns the owning process. The first assignment queues the one-shot `Initialized`
    /// notification for the next update.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window.
    pub fn set_owner_process(&mut self, window: ElementId, owner: ProcessId) -> DesktopResult<()> {
        let state = self.tree.require_window_mut(window)?;
        state.owner = Some(owner);
        if !state.owner_initialized {
            state.owner_initialized = true;
            self.actions.push(PendingAction::InitializeWindow(window));
        }
        Ok(())
    }

    pub(super) fn initialize_window(&mut self, window: ElementId) -> DesktopResult<()> {
        let owner = self.tree.require_window(window)?.owner;
        self.notify(
            window,
            ElementEvent::Lifecycle(WindowLifecycleEvent::Initialized),
        );
        if let (Some(host), Some(owner)) = (&self.process_host, owner) {
            host.window_initialized(owner, window.runtime_id());
        }
        Ok(())
    }

    /// Requests a close, consulting the close-confirmation callback first.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window.
    pub fn close_window(&mut self, window: ElementId) -> DesktopResult<()> {
        let state = self.tree.require_window_mut(window)?;
        if state.is_closing() {
            return Ok(());
        }
        let verdict = match state.close_confirmation.as_mut() {
            Some(confirm) => confirm(),
            None => CloseVerdict::Approve,
        };
        match verdict {
            CloseVerdict::Approve => self.begin_close(window),
            CloseVerdict::Veto => {
                state.close_pending = false;
                debug!(window = ?window, "close vetoed");
                Ok(())
            }
            CloseVerdict::Pending => {
                state.close_pending = true;
                debug!(window = ?window, "close pending confirmation");
                Ok(())
            }
        }
    }

    /// Resumes a close left pending by the confirmation callback.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window.
    pub fn approve_close(&mut self, window: ElementId) -> DesktopResult<()> {
        if !self.tree.require_window(window)?.close_pending {
            return Ok(());
        }
        self.begin_close(window)
    }

    fn begin_close(&mut self, window: ElementId) -> DesktopResult<()> {
        let children = self.tree.require_window(window)?.child_windows.clone();
        for child in children {
            if self.tree.window(child).is_some_and(|state| !state.is_closing()) {
                self.begin_close(child)?;
            }
        }

        self.persistence.save_now(&self.tree, window);
        self.release_capture(window);
        let opacity = self.tree.element(window)?.opacity;
        let state = self.tree.require_window_mut(window)?;
        state.mode = WindowMode::Closing;
        state.resting_mode = WindowMode::Closing;
        state.interaction = None;
        state.close_pending = false;

        self.notify(window, ElementEvent::Lifecycle(WindowLifecycleEvent::Closing));
        self.tweens.start(
            window,
            TAG_OPACITY,
            TweenProperty::Opacity {
                from: opacity,
                to: 0.0,
            },
            self.config.close_duration,
            Easing::EaseInCubic,
            Some(TweenCompletion::DestroyClosed),
        );
        self.tweens.cancel(window, TAG_GEOMETRY);
        debug!(window = ?window, "window closing");
        self.fall_back_from(window);
        Ok(())
    }

    /// Removes a window immediately: no animation, no confirmation.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window.
    pub fn terminate(&mut self, window: ElementId) -> DesktopResult<()> {
        self.tree.require_window(window)?;
        debug!(window = ?window, "window terminated");
        self.destroy_window(window)
    }

    /// Detaches a window and its child windows, releasing their resources.
    pub(super) fn destroy_window(&mut self, window: ElementId) -> DesktopResult<()> {
        let children = self
            .tree
            .window(window)
            .map(|state| state.child_windows.clone())
            .unwrap_or_default();
        for child in children {
            if self.tree.contains(child) {
                self.destroy_window(child)?;
            }
        }
        let parent = self
            .tree
            .parent(window)
            .ok_or(DesktopError::ElementNotFound(window))?;
        self.detach(parent, window)?;
        self.sync_taskbar()
    }

    /// Shrinks a window toward its taskbar button and hides it.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window.
    pub fn minimize(&mut self, window: ElementId) -> DesktopResult<()> {
        let screen = self.config.screen_rect();
        let anchor = self
            .taskbar
            .anchor_for(&self.tree, window)
            .unwrap_or_else(|| Vec2::new(screen.center().x, screen.bottom()));
        let element = self.tree.element(window)?;
        let rect = element.local_bounds();
        let opacity = element.opacity;

        let state = self.tree.require_window(window)?;
        if !state.flags.minimizable || state.is_minimized() || state.is_closing() {
            return Ok(());
        }
        self.release_capture(window);
        let state = self.tree.require_window_mut(window)?;
        state.interaction = None;
        let memory = state.minimized_from.unwrap_or(MinimizeMemory {
            rect,
            opacity,
            maximized: state.is_maximized(),
        });
        state.minimized_from = Some(memory);
        state.mode = WindowMode::Minimized;
        state.resting_mode = WindowMode::Minimized;
        state.snapshot_requested = true;

        self.tweens.start(
            window,
            TAG_GEOMETRY,
            TweenProperty::Rect {
                from: rect,
                to: minimize_rect(anchor, rect.size()),
            },
            self.config.minimize_duration,
            Easing::EaseInCubic,
            Some(TweenCompletion::HideMinimized),
        );
        self.tweens.start(
            window,
            TAG_OPACITY,
            TweenProperty::Opacity {
                from: opacity,
                to: 0.0,
            },
            self.config.minimize_duration,
            Easing::Linear,
            None,
        );
        self.notify(window, ElementEvent::Lifecycle(WindowLifecycleEvent::Minimized));
        debug!(window = ?window, "window minimized");
        self.fall_back_from(window);
        self.persistence.mark_dirty(window);
        Ok(())
    }

    /// Restores a minimized window to its remembered geometry, or un-maximizes a maximized one.
    /// Any other window is simply activated.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window.
    pub fn restore(&mut self, window: ElementId) -> DesktopResult<()> {
        let state = self.tree.require_window(window)?;
        if state.is_closing() {
            return Ok(());
        }
        if state.is_maximized() {
            return self.toggle_maximize(window);
        }
        if !state.is_minimized() {
            return self.focus_window(window);
        }

        let memory = state.minimized_from.unwrap_or(MinimizeMemory {
            rect: state.restore_rect,
            opacity: 1.0,
            maximized: false,
        });
        let element = self.tree.element_mut(window)?;
        let from = element.local_bounds();
        let from_opacity = element.opacity;
        element.visible = true;

        let state = self.tree.require_window_mut(window)?;
        // Snapped and maximized windows come back to the exact rectangle they left.
        let to = memory.rect;
        let mode = if memory.maximized {
            WindowMode::Maximized
        } else {
            WindowMode::Normal
        };
        state.mode = mode;
        state.resting_mode = mode;

        self.tweens.start(
            window,
            TAG_GEOMETRY,
            TweenProperty::Rect { from, to },
            self.config.restore_duration,
            Easing::EaseOutCubic,
            Some(TweenCompletion::ClearMinimizeMemory),
        );
        self.tweens.start(
            window,
            TAG_OPACITY,
            TweenProperty::Opacity {
                from: from_opacity,
                to: memory.opacity,
            },
            self.config.restore_duration,
            Easing::Linear,
            None,
        );
        self.notify(window, ElementEvent::Lifecycle(WindowLifecycleEvent::Restored));
        debug!(window = ?window, "window restored");
        self.persistence.mark_dirty(window);
        self.focus_window(window)
    }

    /// Swaps between the floating rectangle and the work area.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window.
    pub fn toggle_maximize(&mut self, window: ElementId) -> DesktopResult<()> {
        let rect = self.tree.element(window)?.local_bounds();
        let state = self.tree.require_window(window)?;
        if !state.flags.maximizable || state.is_minimized() || state.is_closing() {
            return Ok(());
        }
        self.release_capture(window);
        let work_area = self.config.work_area();
        let state = self.tree.require_window_mut(window)?;
        state.interaction = None;

        let (to, event) = if state.is_maximized() {
            state.mode = WindowMode::Normal;
            state.resting_mode = WindowMode::Normal;
            (state.restore_rect, WindowLifecycleEvent::Restored)
        } else {
            state.restore_rect = rect;
            state.mode = WindowMode::Maximized;
            state.resting_mode = WindowMode::Maximized;
            (work_area, WindowLifecycleEvent::Maximized)
        };

        self.tweens.start(
            window,
            TAG_GEOMETRY,
            TweenProperty::Rect { from: rect, to },
            self.config.maximize_duration,
            Easing::EaseInOut,
            Some(TweenCompletion::SaveLayout),
        );
        self.notify(window, ElementEvent::Lifecycle(event));
        debug!(window = ?window, event = event.token(), "window maximize toggled");
        self.focus_window(window)
    }

    /// Animates a released drag into a snap rectangle; snapped windows count as maximized.
    pub(super) fn snap_window(
        &mut self,
        window: ElementId,
        target: SnapTarget,
        floating: WindowRect,
    ) -> DesktopResult<()> {
        let rect = self.tree.element(window)?.local_bounds();
        let to = target.rect(self.config.work_area());
        let state = self.tree.require_window_mut(window)?;
        state.restore_rect = floating;
        state.mode = WindowMode::Maximized;
        state.resting_mode = WindowMode::Maximized;
        self.tweens.start(
            window,
            TAG_GEOMETRY,
            TweenProperty::Rect { from: rect, to },
            self.config.snap_duration,
            Easing::EaseOutCubic,
            Some(TweenCompletion::SaveLayout),
        );
        self.notify(window, ElementEvent::Lifecycle(WindowLifecycleEvent::Maximized));
        debug!(window = ?window, ?target, "window snapped");
        Ok(())
    }

    /// Raises and activates a window, restoring it first when minimized. A window blocked by a
    /// modal child hands activation to that child and makes it flash.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window.
    pub fn activate_window(&mut self, window: ElementId) -> DesktopResult<()> {
        if self.tree.require_window(window)?.is_minimized() {
            return self.restore(window);
        }
        self.focus_window(window)
    }

    fn focus_window(&mut self, window: ElementId) -> DesktopResult<()> {
        let target = window_manager::activation_target(&self.tree, window);
        if target != window {
            let flash_frames = self.config.flash_frames;
            if let Some(state) = self.tree.window_mut(target) {
                state.flash_frames = flash_frames;
            }
            debug!(window = ?window, modal = ?target, "blocked window redirected to modal");
        }
        window_manager::raise_window_stack(&mut self.tree, window)?;
        self.set_active_window(Some(target));
        Ok(())
    }

    /// Reassigns the active window, emitting `Blurred` then `Focused`.
    pub(super) fn set_active_window(&mut self, window: Option<ElementId>) {
        if let Some(change) = self.focus.set_active_window(window) {
            if let Some(lost) = change.lost {
                self.notify(lost, ElementEvent::Lifecycle(WindowLifecycleEvent::Blurred));
            }
            if let Some(gained) = change.gained {
                self.notify(gained, ElementEvent::Lifecycle(WindowLifecycleEvent::Focused));
            }
            debug!(lost = ?change.lost, gained = ?change.gained, "active window changed");
        }
    }

    pub(super) fn activate_or_clear(&mut self, window: Option<ElementId>) {
        match window {
            Some(window) => {
                if let Err(err) = window_manager::raise_window_stack(&mut self.tree, window) {
                    warn!(window = ?window, %err, "fallback window vanished");
                    self.set_active_window(None);
                    return;
                }
                self.set_active_window(Some(window));
            }
            None => self.set_active_window(None),
        }
    }

    /// Hands activation to the next window down when `window` is the active one.
    fn fall_back_from(&mut self, window: ElementId) {
        if self.focus.active_window() != Some(window) {
            return;
        }
        let next = window_manager::next_active_below(&self.tree, window);
        self.activate_or_clear(next);
    }

    pub(super) fn release_capture(&mut self, window: ElementId) {
        if self.captured == Some(window) {
            self.captured = None;
        }
    }

    /// Changes the caption; the taskbar picks it up on its next sync.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window.
    pub fn set_title(&mut self, window: ElementId, title: impl Into<String>) -> DesktopResult<()> {
        self.tree.require_window_mut(window)?.title = title.into();
        Ok(())
    }

    /// Registers the callback consulted before every close.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window.
    pub fn set_close_confirmation(
        &mut self,
        window: ElementId,
        confirm: impl FnMut() -> CloseVerdict + 'static,
    ) -> DesktopResult<()> {
        self.tree.require_window_mut(window)?.close_confirmation = Some(Box::new(confirm));
        Ok(())
    }

    pub fn clear_close_confirmation(&mut self, window: ElementId) -> DesktopResult<()> {
        let state = self.tree.require_window_mut(window)?;
        state.close_confirmation = None;
        state.close_pending = false;
        Ok(())
    }

    /// Turns `pages` (children of `window`) into a step sequence showing the first page.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window or a page is not one of its children.
    pub fn set_step_sequence(
        &mut self,
        window: ElementId,
        pages: Vec<ElementId>,
    ) -> DesktopResult<()> {
        self.tree.require_window(window)?;
        if let Some(stray) = pages
            .iter()
            .copied()
            .find(|page| self.tree.parent(*page) != Some(window))
        {
            return Err(DesktopError::ElementNotFound(stray));
        }
        self.tree.require_window_mut(window)?.steps = Some(StepSequence::new(pages));
        self.show_current_step(window)
    }

    /// Moves to the next page; on the last page, closes the window.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window.
    pub fn step_next(&mut self, window: ElementId) -> DesktopResult<StepOutcome> {
        let outcome = match self.tree.require_window_mut(window)?.steps.as_mut() {
            Some(steps) => steps.next(),
            None => return Ok(StepOutcome::Unchanged),
        };
        match outcome {
            StepOutcome::Moved(_) => self.show_current_step(window)?,
            StepOutcome::Finished => self.close_window(window)?,
            StepOutcome::Unchanged => {}
        }
        Ok(outcome)
    }

    /// Moves back one page.
    ///
    /// # Errors
    ///
    /// Fails when `window` is not a window.
    pub fn step_back(&mut self, window: ElementId) -> DesktopResult<StepOutcome> {
        let outcome = match self.tree.require_window_mut(window)?.steps.as_mut() {
            Some(steps) => steps.back(),
            None => return Ok(StepOutcome::Unchanged),
        };
        if matches!(outcome, StepOutcome::Moved(_)) {
            self.show_current_step(window)?;
        }
        Ok(outcome)
    }

    fn show_current_step(&mut self, window: ElementId) -> DesktopResult<()> {
        let Some(steps) = self.tree.require_window(window)?.steps.clone() else {
            return Ok(());
        };
        let current = steps.current_page();
        for page in steps.pages() {
            if let Some(element) = self.tree.get_mut(*page) {
                element.visible = Some(*page) == current;
            }
        }
        Ok(())
    }
}
