//! The per-frame update pass: queued actions, tweens, hover, presses, the element walk, the drag
//! session, and fault routing, in that order.

use desktop_window_contract::{DragDropService, DragEffect, FaultDisposition, WindowLifecycleEvent};
use platform_host::{FrameTime, Vec2};
use tracing::{debug, trace, warn};

use super::{DesktopRuntime, TweenCompletion};
use crate::actions::PendingAction;
use crate::element::ElementKind;
use crate::error::{DesktopError, DesktopResult};
use crate::model::{ElementId, FrameInput, WindowMode};
use crate::observers::ElementEvent;
use crate::taskbar::TaskbarCommand;
use crate::tween::{TweenValue, TAG_GEOMETRY};
use crate::widgets::context_menu::{MenuOutcome, MenuTiming};
use crate::widgets::WidgetContext;
use crate::window::geometry::{drag_restore_origin, resize_rect, snap_target_at};
use crate::window::{ChromeButton, DragGesture, Interaction, ResizeGesture, WindowZone};

/// How the element walk treats one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateRole {
    Window,
    Custom,
    TaskbarButton(ElementId),
    Plain,
}

impl DesktopRuntime {
    /// Runs one frame of input routing and animation.
    ///
    /// # Errors
    ///
    /// Returns [`DesktopError::Widget`] when a widget outside any application-owned window
    /// failed. Faults inside owned windows go to the process host instead.
    pub fn update(&mut self, input: FrameInput) -> DesktopResult<()> {
        let time = self.clock.advance(input.delta_seconds);
        self.pointer = self.pointer.advance(&input);
        self.input_consumed = false;

        self.drain_actions();
        self.advance_tweens(time.delta_seconds)?;
        self.sync_taskbar()?;
        self.update_context_menu();
        self.update_hover();
        self.handle_presses()?;

        let root = self.tree.root();
        self.update_element(root, time)?;

        self.update_drag_session(time);
        self.update_tooltip(time.frame);
        self.tick_flash();
        let saved = self.persistence.flush(&self.tree, self.pointer.primary_down);
        if saved > 0 {
            trace!(saved, "window layouts saved");
        }
        self.route_faults()
    }

    fn drain_actions(&mut self) {
        for action in self.actions.drain() {
            let name = action.name();
            if let Err(err) = self.apply_action(action) {
                warn!(action = name, %err, "queued action failed");
            }
        }
    }

    fn apply_action(&mut self, action: PendingAction) -> DesktopResult<()> {
        match action {
            PendingAction::Close(window) => self.close_window(window),
            PendingAction::Terminate(window) => self.terminate(window),
            PendingAction::BringToFront(id) => self.bring_to_front(id).map(|_| ()),
            PendingAction::Minimize(window) => self.minimize(window),
            PendingAction::Restore(window) => self.restore(window),
            PendingAction::ToggleMaximize(window) => self.toggle_maximize(window),
            PendingAction::SetTitle(window, title) => self.set_title(window, title),
            PendingAction::ApproveClose(window) => self.approve_close(window),
            PendingAction::InitializeWindow(window) => self.initialize_window(window),
            PendingAction::Run(run) => {
                run(self);
                Ok(())
            }
        }
    }

    fn advance_tweens(&mut self, delta_seconds: f32) -> DesktopResult<()> {
        let frame = self.tweens.advance(delta_seconds);
        for (id, value) in frame.updates {
            let Some(element) = self.tree.get_mut(id) else {
                continue;
            };
            match value {
                TweenValue::Rect(rect) => element.set_bounds(rect),
                TweenValue::Opacity(opacity) => element.opacity = opacity,
            }
        }
        for (id, completion) in frame.completed {
            self.complete_tween(id, completion)?;
        }
        Ok(())
    }

    fn complete_tween(&mut self, id: ElementId, completion: TweenCompletion) -> DesktopResult<()> {
        let Some(state) = self.tree.window(id) else {
            return Ok(());
        };
        match completion {
            TweenCompletion::HideMinimized => {
                if state.is_minimized() {
                    self.tree.element_mut(id)?.visible = false;
                }
            }
            TweenCompletion::ClearMinimizeMemory => {
                self.tree.require_window_mut(id)?.minimized_from = None;
                self.persistence.mark_dirty(id);
            }
            TweenCompletion::SaveLayout => self.persistence.mark_dirty(id),
            TweenCompletion::DestroyClosed => {
                if state.is_closing() {
                    self.destroy_window(id)?;
                }
            }
        }
        Ok(())
    }

    /// Reconciles taskbar buttons with the window list.
    pub(super) fn sync_taskbar(&mut self) -> DesktopResult<()> {
        let removed = self.taskbar.sync(
            &mut self.tree,
            self.windows_layer,
            self.config.taskbar_button_width,
        )?;
        for (id, element) in removed {
            self.release_element(id, element);
        }
        Ok(())
    }

    fn update_context_menu(&mut self) {
        let timing = MenuTiming {
            open_delay: self.config.submenu_open_delay_frames,
            close_delay: self.config.submenu_close_delay_frames,
        };
        let screen = self.config.screen_rect();
        let Some(menu) = self.context_menu.as_mut() else {
            return;
        };
        match menu.update(&self.pointer, timing, screen) {
            MenuOutcome::Idle => {}
            MenuOutcome::Consumed => self.input_consumed = true,
            MenuOutcome::Activated(item) => {
                let target = menu.target();
                self.context_menu = None;
                self.input_consumed = true;
                debug!(item = %item.text, target = ?target, "context menu item activated");
                if let (Some(target), Some(action)) = (target, item.action) {
                    self.notify(target, ElementEvent::MenuAction(action));
                }
            }
            MenuOutcome::Dismissed => {
                self.context_menu = None;
                self.input_consumed = true;
            }
        }
    }

    /// Resolves the hovered element and delivers leave events before enter events.
    fn update_hover(&mut self) {
        let position = self.pointer.position;
        let over_menu = self
            .context_menu
            .as_ref()
            .is_some_and(|menu| menu.contains(position));
        self.hovered = match self.captured {
            Some(window) if self.tree.contains(window) => Some(window),
            _ if over_menu => None,
            _ => self.tree.get_element_at(position),
        };

        let chain: Vec<ElementId> = match self.hovered {
            Some(hovered) => std::iter::once(hovered)
                .chain(self.tree.ancestors(hovered))
                .collect(),
            None => Vec::new(),
        };
        let previous = std::mem::replace(&mut self.hover_chain, chain);
        for left in previous.iter().filter(|id| !self.hover_chain.contains(*id)) {
            if let Some(element) = self.tree.get_mut(*left) {
                element.notify(&ElementEvent::HoverLeave);
            }
        }
        let entered: Vec<ElementId> = self
            .hover_chain
            .iter()
            .rev()
            .copied()
            .filter(|id| !previous.contains(id))
            .collect();
        for id in entered {
            self.notify(id, ElementEvent::HoverEnter);
        }
    }

    /// Activation and focus on primary press; context menus on secondary press.
    fn handle_presses(&mut self) -> DesktopResult<()> {
        if self.input_consumed {
            return Ok(());
        }
        if self.pointer.primary_pressed {
            if let Some(window) = self
                .hovered
                .and_then(|hovered| self.tree.enclosing_window(hovered))
            {
                self.activate_window(window)?;
            }
            let target = self
                .hovered
                .and_then(|id| self.tree.get(id).map(|element| (id, element)))
                .map(|(id, element)| (id, element.can_focus, element.consumes_input));
            match target {
                Some((id, true, true)) => self.set_focus(Some(id)),
                Some((_, _, true)) => {}
                _ => self.set_focus(None),
            }
        }
        if self.pointer.secondary_pressed {
            let position = self.pointer.position;
            self.open_context_menu(self.hovered, position);
        }
        Ok(())
    }

    /// Children first, topmost first, then the element itself.
    fn update_element(&mut self, id: ElementId, time: FrameTime) -> DesktopResult<()> {
        let Some(element) = self.tree.get(id) else {
            return Ok(());
        };
        if !element.visible {
            return Ok(());
        }
        let children = element.children.clone();
        for child in children.into_iter().rev() {
            self.update_element(child, time)?;
        }

        let role = match self.tree.get(id).map(|element| &element.kind) {
            None => return Ok(()),
            Some(ElementKind::Window(_)) => UpdateRole::Window,
            Some(ElementKind::Custom(_)) => UpdateRole::Custom,
            Some(ElementKind::TaskbarButton { window }) => UpdateRole::TaskbarButton(*window),
            Some(_) => UpdateRole::Plain,
        };
        match role {
            UpdateRole::Window => self.update_window(id, time),
            UpdateRole::Custom => {
                self.update_custom(id, time);
                Ok(())
            }
            UpdateRole::TaskbarButton(window) => self.update_taskbar_button(id, window),
            UpdateRole::Plain => {
                self.update_click(id);
                Ok(())
            }
        }
    }

    /// Claims the pointer for the hovered consuming element and tracks press/release pairs.
    ///
    /// Returns `(has_input, clicked)`.
    fn update_click(&mut self, id: ElementId) -> (bool, bool) {
        let hovered = self.hovered == Some(id);
        let pointer = self.pointer;
        let Some(element) = self.tree.get_mut(id) else {
            return (false, false);
        };
        if !element.consumes_input {
            return (false, false);
        }
        let has_input = hovered && !self.input_consumed;
        if has_input {
            self.input_consumed = true;
            if pointer.primary_pressed {
                element.click_pending = true;
            }
        }
        let mut clicked = false;
        if pointer.primary_released {
            clicked = has_input && element.click_pending;
            element.click_pending = false;
        }
        if clicked {
            element.notify(&ElementEvent::Click {
                position: pointer.position,
            });
        }
        (has_input, clicked)
    }

    fn update_custom(&mut self, id: ElementId, time: FrameTime) {
        let (has_input, clicked) = self.update_click(id);
        let pointer = self.pointer;
        let mut ctx = WidgetContext {
            element: id,
            bounds: self.tree.absolute_bounds(id),
            pointer: &pointer,
            time,
            hovered: self.is_hovered(id),
            has_input,
            clicked,
            focused: self.focus.focused_element() == Some(id),
            drag_request: None,
        };
        let result = match self.tree.get_mut(id).map(|element| &mut element.kind) {
            Some(ElementKind::Custom(widget)) => widget.update(&mut ctx),
            _ => Ok(()),
        };
        if let Err(err) = result {
            self.faults.push((id, err));
        }
        if let Some(request) = ctx.drag_request.take() {
            let source = ctx.bounds.position();
            if self.begin_drag(request.payload, source, request.grab_offset) {
                debug!(source = ?id, "drag session started");
            }
        }
    }

    fn update_taskbar_button(&mut self, id: ElementId, window: ElementId) -> DesktopResult<()> {
        let (_, clicked) = self.update_click(id);
        if !clicked {
            return Ok(());
        }
        let is_active = self.focus.active_window() == Some(window);
        let command = self
            .tree
            .window(window)
            .map(|state| TaskbarCommand::for_window(window, state, is_active));
        match command {
            Some(TaskbarCommand::Restore(window)) => self.restore(window),
            Some(TaskbarCommand::Minimize(window)) => self.minimize(window),
            Some(TaskbarCommand::Activate(window)) => self.activate_window(window),
            None => Ok(()),
        }
    }

    fn update_window(&mut self, id: ElementId, time: FrameTime) -> DesktopResult<()> {
        let Some(state) = self.tree.window(id) else {
            return Ok(());
        };
        if let Some(interaction) = state.interaction {
            return self.continue_interaction(id, interaction);
        }
        if !state.accepts_pointer() || self.hovered != Some(id) || self.input_consumed {
            return Ok(());
        }
        if self.tree.is_blocked(id) {
            // The press already redirected activation to the modal child.
            self.input_consumed = true;
            return Ok(());
        }

        let bounds = self.tree.absolute_bounds(id);
        let zone = state.zone_at(self.pointer.position - bounds.position(), bounds.size());
        let last_title_press = state.last_title_press;
        let resting = state.mode;
        if zone == WindowZone::Content {
            self.update_click(id);
            return Ok(());
        }

        self.input_consumed = true;
        let pointer = self.pointer;
        if pointer.primary_released {
            self.tree.element_mut(id)?.click_pending = false;
        }
        if !pointer.primary_pressed {
            return Ok(());
        }

        let local = self.tree.element(id)?.local_bounds();
        match zone {
            WindowZone::Resize(edge) => {
                let state = self.tree.require_window_mut(id)?;
                state.interaction = Some(Interaction::Resize(ResizeGesture {
                    edge,
                    press: pointer.position,
                    start: local,
                }));
                state.resting_mode = resting;
                state.mode = WindowMode::Resizing;
                self.tweens.cancel(id, TAG_GEOMETRY);
                self.captured = Some(id);
            }
            WindowZone::Button(button) => {
                self.tree.require_window_mut(id)?.interaction = Some(Interaction::Button(button));
                self.captured = Some(id);
            }
            WindowZone::TitleBar => {
                let double_click = last_title_press.is_some_and(|last| {
                    time.frame.saturating_sub(last) <= u64::from(self.config.double_click_frames)
                });
                if double_click {
                    self.tree.require_window_mut(id)?.last_title_press = None;
                    return self.toggle_maximize(id);
                }
                let state = self.tree.require_window_mut(id)?;
                state.last_title_press = Some(time.frame);
                state.interaction = Some(Interaction::Drag(DragGesture {
                    press: pointer.position,
                    origin: local.position(),
                    started: false,
                    snap: None,
                }));
                self.captured = Some(id);
            }
            WindowZone::Content => {}
        }
        Ok(())
    }

    /// Advances a captured drag, resize, or caption-button press.
    fn continue_interaction(
        &mut self,
        id: ElementId,
        interaction: Interaction,
    ) -> DesktopResult<()> {
        self.input_consumed = true;
        let pointer = self.pointer;
        let released = !pointer.primary_down;
        match interaction {
            Interaction::Drag(drag) => self.continue_drag(id, drag, released),
            Interaction::Resize(resize) => {
                let rect = resize_rect(
                    resize.start,
                    resize.edge,
                    pointer.position - resize.press,
                    self.config.min_size(),
                );
                self.tree.element_mut(id)?.set_bounds(rect);
                if released {
                    let state = self.tree.require_window_mut(id)?;
                    state.interaction = None;
                    state.mode = WindowMode::Normal;
                    state.resting_mode = WindowMode::Normal;
                    state.restore_rect = rect;
                    self.release_capture(id);
                    self.persistence.mark_dirty(id);
                    debug!(window = ?id, ?rect, "resize committed");
                }
                Ok(())
            }
            Interaction::Button(button) => {
                if !released {
                    return Ok(());
                }
                self.tree.require_window_mut(id)?.interaction = None;
                self.release_capture(id);
                let bounds = self.tree.absolute_bounds(id);
                let state = self.tree.require_window(id)?;
                let under = state.chrome.button_at(
                    pointer.position - bounds.position(),
                    bounds.size(),
                    &state.flags,
                );
                if under != Some(button) {
                    return Ok(());
                }
                match button {
                    ChromeButton::Minimize => self.minimize(id),
                    ChromeButton::Maximize => self.toggle_maximize(id),
                    ChromeButton::Close => self.close_window(id),
                }
            }
        }
    }

    fn continue_drag(
        &mut self,
        id: ElementId,
        mut drag: DragGesture,
        released: bool,
    ) -> DesktopResult<()> {
        let pointer = self.pointer;
        let delta = pointer.position - drag.press;

        if !drag.started && delta.length() > self.config.drag_threshold {
            drag.started = true;
            let current = self.tree.element(id)?.local_bounds();
            let state = self.tree.require_window_mut(id)?;
            // A press that became a drag never pairs into a double-click.
            state.last_title_press = None;
            if state.mode == WindowMode::Maximized {
                let restore = state.restore_rect;
                state.mode = WindowMode::Dragging;
                state.resting_mode = WindowMode::Normal;
                // Origin the restored window would have had under the press point.
                drag.origin = drag_restore_origin(drag.press, current, restore.size());
                self.tweens.cancel(id, TAG_GEOMETRY);
                self.tree.element_mut(id)?.size = restore.size();
                self.notify(id, ElementEvent::Lifecycle(WindowLifecycleEvent::Restored));
                debug!(window = ?id, "drag restored maximized window");
            } else {
                state.resting_mode = state.mode;
                state.mode = WindowMode::Dragging;
            }
        }

        if drag.started {
            let work_area = self.config.work_area();
            let flags = self.tree.require_window(id)?.flags;
            drag.snap = snap_target_at(
                pointer.position,
                work_area,
                self.config.snap_distance,
                flags.maximizable,
                flags.resizable,
            );
            self.tree.element_mut(id)?.position = drag.origin + delta;
        }

        if !released {
            self.tree.require_window_mut(id)?.interaction = Some(Interaction::Drag(drag));
            return Ok(());
        }

        self.release_capture(id);
        let floating = self.tree.element(id)?.local_bounds();
        let state = self.tree.require_window_mut(id)?;
        state.interaction = None;
        if !drag.started {
            return Ok(());
        }
        state.mode = WindowMode::Normal;
        state.resting_mode = WindowMode::Normal;
        match drag.snap {
            Some(target) => self.snap_window(id, target, floating),
            None => {
                state.restore_rect = floating;
                self.persistence.mark_dirty(id);
                debug!(window = ?id, rect = ?floating, "drag committed");
                Ok(())
            }
        }
    }

    /// Drop negotiation on release, then the watchdog; drag-over feedback otherwise.
    fn update_drag_session(&mut self, time: FrameTime) {
        if self.drag.is_active() {
            let position = self.pointer.position;
            self.drag.update_pointer(position);
            let hovered = self.hovered;
            let target = hovered.and_then(|hovered| self.drop_target_for(hovered));

            if self.pointer.primary_released {
                if let Some(target) = target {
                    if let Some(ElementKind::Custom(widget)) =
                        self.tree.get_mut(target).map(|element| &mut element.kind)
                    {
                        if let Some(drop) = widget.drop_target() {
                            let handled = self.drag.try_drop_on(drop, position);
                            debug!(target = ?target, handled, "drop negotiated");
                        }
                    }
                }
                if self.drag.is_active() {
                    debug!("drop not claimed; cancelling drag session");
                    self.drag.cancel_drag();
                }
            } else {
                let effect = self.drag_over_effect(target, position);
                self.drag.set_current_effect(effect);
            }
        }
        self.drag.update(&time);
    }

    fn drag_over_effect(
        &mut self,
        target: Option<ElementId>,
        position: Vec2,
    ) -> DragEffect {
        let (Some(target), Some(payload)) = (target, self.drag.drag_data().cloned()) else {
            return DragEffect::None;
        };
        let Some(ElementKind::Custom(widget)) =
            self.tree.get_mut(target).map(|element| &mut element.kind)
        else {
            return DragEffect::None;
        };
        match widget.drop_target() {
            Some(drop) if drop.can_accept_drop(&payload) => drop.on_drag_over(&payload, position),
            _ => DragEffect::None,
        }
    }

    /// `start` or its nearest ancestor hosting a drop target.
    fn drop_target_for(&mut self, start: ElementId) -> Option<ElementId> {
        let chain: Vec<ElementId> = std::iter::once(start)
            .chain(self.tree.ancestors(start))
            .collect();
        chain.into_iter().find(|id| {
            match self.tree.get_mut(*id).map(|element| &mut element.kind) {
                Some(ElementKind::Custom(widget)) => widget.drop_target().is_some(),
                _ => false,
            }
        })
    }

    fn update_tooltip(&mut self, frame: u64) {
        let suppressed = self.context_menu.is_some() || self.drag.is_active();
        let default_delay = self.config.tooltip_delay_frames;
        let candidate = if suppressed {
            None
        } else {
            self.hover_chain.iter().find_map(|id| {
                let tooltip = self.tree.get(*id)?.tooltip.as_ref()?;
                Some((*id, tooltip.delay_frames.unwrap_or(default_delay)))
            })
        };
        let pressed = self.pointer.primary_pressed || self.pointer.secondary_pressed;
        self.tooltip.update(candidate, frame, pressed);
    }

    fn tick_flash(&mut self) {
        let windows = self.tree.children(self.windows_layer).to_vec();
        for window in windows {
            if let Some(state) = self.tree.window_mut(window) {
                state.flash_frames = state.flash_frames.saturating_sub(1);
            }
        }
    }

    /// Hands widget faults to the owning process, or surfaces the first unowned one.
    pub(super) fn route_faults(&mut self) -> DesktopResult<()> {
        let mut unowned = None;
        for (element, error) in std::mem::take(&mut self.faults) {
            if !self.tree.contains(element) {
                continue;
            }
            let window = self.tree.enclosing_window(element);
            let owner = window
                .and_then(|window| self.tree.window(window))
                .and_then(|state| state.owner);
            let (Some(window), Some(owner)) = (window, owner) else {
                warn!(element = ?element, %error, "widget failed outside an owned window");
                unowned.get_or_insert(DesktopError::Widget {
                    element,
                    source: error,
                });
                continue;
            };

            let disposition = match &self.process_host {
                Some(host) => host.window_fault(owner, window.runtime_id(), &error),
                None => FaultDisposition::Terminate,
            };
            warn!(window = ?window, %owner, %error, ?disposition, "window content failed");
            if disposition == FaultDisposition::Terminate && self.tree.contains(window) {
                self.terminate(window)?;
            }
        }
        unowned.map_or(Ok(()), Err)
    }
}
