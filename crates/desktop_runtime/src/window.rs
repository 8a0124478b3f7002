//! Window state carried by window elements.
//!
//! A window is an element whose kind holds a [`WindowState`]. Chrome and step sequencing are
//! composed in as behavior objects; the state machine itself is driven by the runtime.

pub mod chrome;
pub mod geometry;
pub mod steps;

use std::fmt;

use desktop_window_contract::{ApplicationId, ProcessId};
use platform_host::{RenderTarget, Texture, Vec2, WindowRect};
use serde::{Deserialize, Serialize};

use crate::model::{ElementId, ResizeEdge, SnapTarget, WindowMode};

pub use chrome::{BorderlessChrome, ChromeButton, ChromeFrame, StandardChrome, WindowChrome};
pub use steps::{StepOutcome, StepSequence};

/// Capabilities shown in the caption and honored by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowFlags {
    pub resizable: bool,
    pub minimizable: bool,
    pub maximizable: bool,
    pub closable: bool,
}

impl Default for WindowFlags {
    fn default() -> Self {
        Self {
            resizable: true,
            minimizable: true,
            maximizable: true,
            closable: true,
        }
    }
}

/// Decision returned by a close-confirmation callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseVerdict {
    /// Close now.
    Approve,
    /// Keep the window open.
    Veto,
    /// Defer; the close resumes when `approve_close` is called.
    Pending,
}

/// Region of a window under a window-local point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowZone {
    Resize(ResizeEdge),
    Button(ChromeButton),
    TitleBar,
    Content,
}

/// Request for a new top-level window.
pub struct WindowSpec {
    pub title: String,
    pub icon: Option<String>,
    /// Initial rectangle; cascades from the previous window when `None`.
    pub rect: Option<WindowRect>,
    /// Keys the persisted layout.
    pub app_id: Option<ApplicationId>,
    pub owner: Option<ProcessId>,
    /// Parent window for child/modal relationships.
    pub parent: Option<ElementId>,
    /// Blocks the parent window while visible.
    pub modal: bool,
    pub flags: WindowFlags,
    /// Defaults to [`StandardChrome`].
    pub chrome: Option<Box<dyn WindowChrome>>,
}

impl WindowSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: None,
            rect: None,
            app_id: None,
            owner: None,
            parent: None,
            modal: false,
            flags: WindowFlags::default(),
            chrome: None,
        }
    }

    pub fn with_rect(mut self, rect: WindowRect) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn with_app_id(mut self, app_id: ApplicationId) -> Self {
        self.app_id = Some(app_id);
        self
    }

    pub fn with_owner(mut self, owner: ProcessId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Makes this a modal child of `parent`.
    pub fn modal_to(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self.modal = true;
        self
    }

    /// Makes this a non-modal child of `parent`; it closes with its parent.
    pub fn child_of(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_chrome(mut self, chrome: impl WindowChrome + 'static) -> Self {
        self.chrome = Some(Box::new(chrome));
        self
    }
}

impl fmt::Debug for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowSpec")
            .field("title", &self.title)
            .field("rect", &self.rect)
            .field("app_id", &self.app_id)
            .field("owner", &self.owner)
            .field("parent", &self.parent)
            .field("modal", &self.modal)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DragGesture {
    pub press: Vec2,
    pub origin: Vec2,
    pub started: bool,
    pub snap: Option<SnapTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ResizeGesture {
    pub edge: ResizeEdge,
    pub press: Vec2,
    pub start: WindowRect,
}

/// Pointer interaction captured by a window between press and release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Interaction {
    Drag(DragGesture),
    Resize(ResizeGesture),
    Button(ChromeButton),
}

/// Geometry and opacity remembered when minimizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MinimizeMemory {
    pub rect: WindowRect,
    pub opacity: f32,
    pub maximized: bool,
}

type CloseConfirmation = Box<dyn FnMut() -> CloseVerdict>;

/// Per-window state: identity, state machine, chrome, and owned GPU resources.
pub struct WindowState {
    pub(crate) title: String,
    pub(crate) icon: Option<String>,
    pub(crate) app_id: Option<ApplicationId>,
    pub(crate) flags: WindowFlags,
    pub(crate) modal: bool,
    pub(crate) owner: Option<ProcessId>,
    pub(crate) owner_initialized: bool,
    pub(crate) parent_window: Option<ElementId>,
    pub(crate) child_windows: Vec<ElementId>,
    pub(crate) mode: WindowMode,
    /// Mode to return to once a drag or resize ends.
    pub(crate) resting_mode: WindowMode,
    pub(crate) interaction: Option<Interaction>,
    pub(crate) restore_rect: WindowRect,
    pub(crate) minimized_from: Option<MinimizeMemory>,
    pub(crate) chrome: Box<dyn WindowChrome>,
    pub(crate) steps: Option<StepSequence>,
    pub(crate) close_confirmation: Option<CloseConfirmation>,
    pub(crate) close_pending: bool,
    pub(crate) flash_frames: u32,
    pub(crate) last_title_press: Option<u64>,
    pub(crate) resize_margin: f32,
    pub(crate) render_target: Option<RenderTarget>,
    pub(crate) snapshot: Option<Texture>,
    pub(crate) snapshot_requested: bool,
}

impl WindowState {
    pub(crate) fn new(
        spec: &mut WindowSpec,
        rect: WindowRect,
        title_bar_height: f32,
        resize_margin: f32,
    ) -> Self {
        let chrome = spec
            .chrome
            .take()
            .unwrap_or_else(|| Box::new(StandardChrome::new(title_bar_height)));
        Self {
            title: spec.title.clone(),
            icon: spec.icon.clone(),
            app_id: spec.app_id.clone(),
            flags: spec.flags,
            modal: spec.modal,
            owner: None,
            owner_initialized: false,
            parent_window: spec.parent,
            child_windows: Vec::new(),
            mode: WindowMode::Normal,
            resting_mode: WindowMode::Normal,
            interaction: None,
            restore_rect: rect,
            minimized_from: None,
            chrome,
            steps: None,
            close_confirmation: None,
            close_pending: false,
            flash_frames: 0,
            last_title_press: None,
            resize_margin,
            render_target: None,
            snapshot: None,
            snapshot_requested: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn app_id(&self) -> Option<&ApplicationId> {
        self.app_id.as_ref()
    }

    pub fn flags(&self) -> WindowFlags {
        self.flags
    }

    pub fn is_modal(&self) -> bool {
        self.modal
    }

    pub fn owner(&self) -> Option<ProcessId> {
        self.owner
    }

    pub fn parent_window(&self) -> Option<ElementId> {
        self.parent_window
    }

    pub fn child_windows(&self) -> &[ElementId] {
        &self.child_windows
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    /// Maximized, including while a drag on a maximized window has not started moving yet.
    pub fn is_maximized(&self) -> bool {
        self.mode == WindowMode::Maximized
            || (matches!(self.mode, WindowMode::Dragging | WindowMode::Resizing)
                && self.resting_mode == WindowMode::Maximized)
    }

    pub fn is_minimized(&self) -> bool {
        self.mode == WindowMode::Minimized
    }

    pub fn is_closing(&self) -> bool {
        self.mode == WindowMode::Closing
    }

    /// Floating rectangle restored when leaving maximized.
    pub fn restore_rect(&self) -> WindowRect {
        self.restore_rect
    }

    /// Snap target currently previewed by an active drag.
    pub fn snap_preview(&self) -> Option<SnapTarget> {
        match self.interaction {
            Some(Interaction::Drag(drag)) if drag.started => drag.snap,
            _ => None,
        }
    }

    pub fn is_close_pending(&self) -> bool {
        self.close_pending
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_frames > 0
    }

    pub fn has_render_target(&self) -> bool {
        self.render_target.is_some()
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn steps(&self) -> Option<&StepSequence> {
        self.steps.as_ref()
    }

    pub fn chrome(&self) -> &dyn WindowChrome {
        self.chrome.as_ref()
    }

    /// Minimized and closing windows do not take pointer input.
    pub(crate) fn accepts_pointer(&self) -> bool {
        !matches!(self.mode, WindowMode::Minimized | WindowMode::Closing)
    }

    /// Window-local offset of the content area.
    pub(crate) fn content_offset(&self) -> Vec2 {
        Vec2::new(0.0, self.chrome.title_bar_height())
    }

    /// Content rectangle inside `bounds` (absolute or local, matching `bounds`).
    pub(crate) fn content_rect(&self, bounds: WindowRect) -> WindowRect {
        let bar = self.chrome.title_bar_height().min(bounds.h);
        WindowRect::new(bounds.x, bounds.y + bar, bounds.w, (bounds.h - bar).max(0.0))
    }

    /// Classifies a window-local point. Resize bands only exist on floating resizable windows.
    pub(crate) fn zone_at(&self, local: Vec2, size: Vec2) -> WindowZone {
        if self.flags.resizable && self.mode == WindowMode::Normal {
            if let Some(edge) = geometry::resize_edge_at(local, size, self.resize_margin) {
                return WindowZone::Resize(edge);
            }
        }
        if let Some(button) = self.chrome.button_at(local, size, &self.flags) {
            return WindowZone::Button(button);
        }
        if local.y < self.chrome.title_bar_height() {
            WindowZone::TitleBar
        } else {
            WindowZone::Content
        }
    }

    /// Flash highlight phase for the current frame.
    pub(crate) fn flash_phase_on(&self) -> bool {
        self.flash_frames > 0 && (self.flash_frames / 4) % 2 == 0
    }
}

impl fmt::Debug for WindowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowState")
            .field("title", &self.title)
            .field("mode", &self.mode)
            .field("resting_mode", &self.resting_mode)
            .field("owner", &self.owner)
            .field("modal", &self.modal)
            .field("parent_window", &self.parent_window)
            .field("child_windows", &self.child_windows)
            .field("restore_rect", &self.restore_rect)
            .field("render_target", &self.render_target)
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}
