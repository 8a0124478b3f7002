//! The window manager: one explicit object owning the scene graph and every piece of global
//! desktop state (active window, focused element, hover, drag session, menus, animations).
//!
//! A host drives it with one [`DesktopRuntime::update`] and one [`DesktopRuntime::render`] per
//! frame. Nothing here is shared across threads; off-thread work comes back through the
//! [`ActionSender`] queue.

mod frame;
mod render;
mod windows;

use std::fmt;
use std::rc::Rc;

use desktop_window_contract::{
    ContentError, ContextMenuProvider, DragDropService, DragPayload, MenuRequest, ProcessHost,
    WindowLayoutHook, WindowLifecycleEvent,
};
use platform_host::{FrameClock, FrameTime, RenderTarget, Texture, Vec2, WindowRect};
use tracing::debug;

use crate::actions::{ActionQueue, ActionSender, PendingAction};
use crate::config::DesktopConfig;
use crate::drag_drop::DragSession;
use crate::element::{Element, ElementKind};
use crate::error::{DesktopError, DesktopResult};
use crate::menu::compose_menu;
use crate::model::{ElementId, PointerState};
use crate::observers::{ElementEvent, SubscriptionId};
use crate::persistence::LayoutPersistence;
use crate::taskbar::Taskbar;
use crate::tree::ElementTree;
use crate::tween::TweenScheduler;
use crate::widgets::context_menu::ContextMenu;
use crate::widgets::tooltip::TooltipTracker;
use crate::window::WindowState;
use crate::window_manager::{self, FocusState};

/// Follow-up work attached to a window tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TweenCompletion {
    /// Minimize finished shrinking; hide the window.
    HideMinimized,
    /// Restore from minimized finished; forget the pre-minimize geometry.
    ClearMinimizeMemory,
    /// Geometry settled; persist it.
    SaveLayout,
    /// Close fade finished; remove the window from the tree.
    DestroyClosed,
}

/// GPU handle waiting for the next render pass to release it.
#[derive(Debug)]
enum PendingRelease {
    Target(RenderTarget),
    Texture(Texture),
}

/// Scene graph plus window-manager state for one desktop.
pub struct DesktopRuntime {
    config: DesktopConfig,
    tree: ElementTree,
    desktop_layer: ElementId,
    windows_layer: ElementId,
    taskbar: Taskbar,
    tweens: TweenScheduler<TweenCompletion>,
    focus: FocusState,
    drag: DragSession,
    clock: FrameClock,
    pointer: PointerState,
    hovered: Option<ElementId>,
    hover_chain: Vec<ElementId>,
    input_consumed: bool,
    /// Window holding the pointer for a drag, resize, or caption-button press.
    captured: Option<ElementId>,
    tooltip: TooltipTracker,
    context_menu: Option<ContextMenu>,
    menu_providers: Vec<Rc<dyn ContextMenuProvider>>,
    actions: ActionQueue,
    process_host: Option<Rc<dyn ProcessHost>>,
    persistence: LayoutPersistence,
    pending_releases: Vec<PendingRelease>,
    faults: Vec<(ElementId, ContentError)>,
    opened_windows: usize,
}

impl DesktopRuntime {
    /// Builds an empty desktop: background layer, windows layer, and taskbar.
    ///
    /// # Errors
    ///
    /// Returns [`DesktopError::Config`] when `config` fails validation.
    pub fn new(config: DesktopConfig) -> DesktopResult<Self> {
        let config = config.validate()?;
        let screen = config.screen_rect();
        let mut tree = ElementTree::new(screen.size());
        let root = tree.root();

        let desktop_layer = tree.insert(Element::container().with_bounds(screen));
        tree.add_child(root, desktop_layer)?;
        let windows_layer = tree.insert(Element::container().with_bounds(screen));
        tree.add_child(root, windows_layer)?;
        let bar = tree.insert(Element::new(ElementKind::Taskbar).with_bounds(WindowRect::new(
            0.0,
            screen.h - config.taskbar_height,
            screen.w,
            config.taskbar_height,
        )));
        tree.add_child(root, bar)?;

        debug!(width = screen.w, height = screen.h, "desktop runtime created");
        Ok(Self {
            drag: DragSession::new(config.drag_snap_back_duration),
            config,
            tree,
            desktop_layer,
            windows_layer,
            taskbar: Taskbar::new(bar),
            tweens: TweenScheduler::new(),
            focus: FocusState::default(),
            clock: FrameClock::new(),
            pointer: PointerState::default(),
            hovered: None,
            hover_chain: Vec::new(),
            input_consumed: false,
            captured: None,
            tooltip: TooltipTracker::default(),
            context_menu: None,
            menu_providers: Vec::new(),
            actions: ActionQueue::new(),
            process_host: None,
            persistence: LayoutPersistence::default(),
            pending_releases: Vec::new(),
            faults: Vec::new(),
            opened_windows: 0,
        })
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn root(&self) -> ElementId {
        self.tree.root()
    }

    /// Layer below all windows for wallpaper and desktop icons.
    pub fn desktop_layer(&self) -> ElementId {
        self.desktop_layer
    }

    /// Parent of every top-level window; its child order is the window z-order.
    pub fn windows_layer(&self) -> ElementId {
        self.windows_layer
    }

    pub fn taskbar(&self) -> &Taskbar {
        &self.taskbar
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.tree.get(id)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.tree.get_mut(id)
    }

    pub fn window(&self, id: ElementId) -> Option<&WindowState> {
        self.tree.window(id)
    }

    /// Timing of the last updated frame.
    pub fn frame(&self) -> FrameTime {
        self.clock.now()
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Adds a detached element to the arena. Attach it with [`add_child`](Self::add_child).
    pub fn create_element(&mut self, element: Element) -> ElementId {
        self.tree.insert(element)
    }

    /// Attaches a detached element as the topmost child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`ElementTree::add_child`].
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> DesktopResult<()> {
        self.tree.add_child(parent, child)
    }

    /// Detaches and destroys `child` and its subtree, releasing window resources exactly once.
    ///
    /// # Errors
    ///
    /// Fails for the built-in layers, or when `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> DesktopResult<()> {
        if self.is_fixed_layer(child) {
            return Err(DesktopError::RootImmutable(child));
        }
        self.detach(parent, child)
    }

    /// Raises `id` to the top of its siblings. Windows take their child windows along.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not in the tree.
    pub fn bring_to_front(&mut self, id: ElementId) -> DesktopResult<bool> {
        if self.tree.window(id).is_some() {
            window_manager::raise_window_stack(&mut self.tree, id)?;
            return Ok(true);
        }
        self.tree.bring_to_front(id)
    }

    /// Adds an observer to `id`.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not in the tree.
    pub fn subscribe(
        &mut self,
        id: ElementId,
        callback: impl FnMut(&ElementEvent) + 'static,
    ) -> DesktopResult<SubscriptionId> {
        Ok(self.tree.element_mut(id)?.subscribe(callback))
    }

    pub fn unsubscribe(&mut self, id: ElementId, subscription: SubscriptionId) -> bool {
        self.tree
            .get_mut(id)
            .is_some_and(|element| element.unsubscribe(subscription))
    }

    /// Element under the pointer this frame.
    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    /// `true` for the hovered element and every ancestor of it.
    pub fn is_hovered(&self, id: ElementId) -> bool {
        self.hover_chain.contains(&id)
    }

    /// Some element claimed the pointer this frame.
    pub fn input_consumed(&self) -> bool {
        self.input_consumed
    }

    pub fn active_window(&self) -> Option<ElementId> {
        self.focus.active_window()
    }

    pub fn focused_element(&self) -> Option<ElementId> {
        self.focus.focused_element()
    }

    /// Moves keyboard focus, notifying the old and new holders.
    pub fn set_focus(&mut self, element: Option<ElementId>) {
        let element = element.filter(|id| self.tree.contains(*id));
        if let Some(change) = self.focus.set_focused_element(element) {
            if let Some(lost) = change.lost {
                self.notify(lost, ElementEvent::FocusLost);
            }
            if let Some(gained) = change.gained {
                self.notify(gained, ElementEvent::FocusGained);
            }
        }
    }

    /// Handle for queueing work from observers or other threads.
    pub fn action_sender(&self) -> ActionSender {
        self.actions.sender()
    }

    /// Queues `action` for the start of the next update.
    pub fn queue(&self, action: PendingAction) {
        self.actions.push(action);
    }

    pub fn register_menu_provider(&mut self, provider: Rc<dyn ContextMenuProvider>) {
        self.menu_providers.push(provider);
    }

    pub fn set_process_host(&mut self, host: Option<Rc<dyn ProcessHost>>) {
        self.process_host = host;
    }

    pub fn set_layout_hook(&mut self, hook: Option<Rc<dyn WindowLayoutHook>>) {
        self.persistence.set_hook(hook);
    }

    /// The open context menu, if any.
    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    /// Opens a context menu for `target` at `position`. Returns `false` when no item survives
    /// composition.
    pub fn open_context_menu(&mut self, target: Option<ElementId>, position: Vec2) -> bool {
        let target = target.filter(|id| self.tree.contains(*id));
        let request = MenuRequest {
            position,
            target_tag: target
                .and_then(|id| self.tree.get(id))
                .and_then(|element| element.tag.clone()),
            window_title: target
                .and_then(|id| self.tree.enclosing_window(id))
                .and_then(|window| self.tree.window(window))
                .map(|state| state.title().to_string()),
        };
        let items = compose_menu(&self.tree, target, &self.menu_providers, &request);
        if items.is_empty() {
            self.context_menu = None;
            return false;
        }
        debug!(items = items.len(), "context menu opened");
        self.context_menu = Some(ContextMenu::open(
            target,
            items,
            position,
            self.config.screen_rect(),
        ));
        true
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Element whose tooltip is showing.
    pub fn tooltip_owner(&self) -> Option<ElementId> {
        self.tooltip.visible_owner(self.clock.now().frame)
    }

    pub fn drag_session(&self) -> &DragSession {
        &self.drag
    }

    pub fn drag_session_mut(&mut self) -> &mut DragSession {
        &mut self.drag
    }

    /// Starts a drag session. Returns `false` when one is already active.
    pub fn begin_drag(&mut self, payload: DragPayload, source: Vec2, grab_offset: Vec2) -> bool {
        let started = self.drag.begin_drag(payload, source, grab_offset);
        if started {
            self.drag.update_pointer(self.pointer.position);
        }
        started
    }

    /// `true` while any tween targets `id`.
    pub fn is_animating(&self, id: ElementId) -> bool {
        self.tweens.is_animating(id)
    }

    fn is_fixed_layer(&self, id: ElementId) -> bool {
        id == self.tree.root()
            || id == self.desktop_layer
            || id == self.windows_layer
            || id == self.taskbar.element()
    }

    pub(crate) fn notify(&mut self, id: ElementId, event: ElementEvent) {
        if let Some(element) = self.tree.get_mut(id) {
            element.notify(&event);
        }
    }

    /// Removes `child`'s subtree and hands activation to the next window down when needed.
    fn detach(&mut self, parent: ElementId, child: ElementId) -> DesktopResult<()> {
        let active = self.focus.active_window();
        let loses_active = active.is_some_and(|id| self.tree.is_ancestor_or_self(child, id));
        let fallback = if loses_active {
            window_manager::next_active_below(&self.tree, child)
        } else {
            None
        };

        let removed = self.tree.remove_child(parent, child)?;
        for (id, element) in removed {
            self.release_element(id, element);
        }
        if loses_active {
            self.activate_or_clear(fallback);
        }
        Ok(())
    }

    /// Drops every reference to a removed element and queues its GPU handles for release.
    fn release_element(&mut self, id: ElementId, mut element: Element) {
        self.tweens.cancel_all(id);
        self.focus.forget(id);
        self.tooltip.forget(id);
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        self.hover_chain.retain(|existing| *existing != id);
        if self.captured == Some(id) {
            self.captured = None;
        }
        if self
            .context_menu
            .as_ref()
            .is_some_and(|menu| menu.target() == Some(id))
        {
            self.context_menu = None;
        }

        let ElementKind::Window(state) = &mut element.kind else {
            return;
        };
        if let Some(target) = state.render_target.take() {
            self.pending_releases.push(PendingRelease::Target(target));
        }
        if let Some(snapshot) = state.snapshot.take() {
            self.pending_releases.push(PendingRelease::Texture(snapshot));
        }
        if let Some(parent) = state.parent_window {
            if let Some(parent_state) = self.tree.window_mut(parent) {
                parent_state.child_windows.retain(|existing| *existing != id);
            }
        }
        let owner = state.owner;
        debug!(window = ?id, title = %state.title, "window closed");
        element.notify(&ElementEvent::Lifecycle(WindowLifecycleEvent::Closed));
        if let (Some(host), Some(owner)) = (&self.process_host, owner) {
            host.window_closed(owner, id.runtime_id());
        }
    }
}

impl fmt::Debug for DesktopRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesktopRuntime")
            .field("frame", &self.clock.now().frame)
            .field("elements", &self.tree.len())
            .field("active_window", &self.focus.active_window())
            .field("focused_element", &self.focus.focused_element())
            .field("hovered", &self.hovered)
            .field("tweens", &self.tweens.len())
            .field("drag_active", &self.drag.is_active())
            .field("context_menu", &self.context_menu.is_some())
            .field("pending_releases", &self.pending_releases.len())
            .finish_non_exhaustive()
    }
}
