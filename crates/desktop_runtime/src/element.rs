//! Scene-graph nodes.

use std::fmt;

use desktop_window_contract::MenuItem;
use platform_host::{Vec2, WindowRect};
use serde_json::Value;

use crate::model::ElementId;
use crate::observers::{ElementEvent, Observers, SubscriptionId};
use crate::widgets::label::Label;
use crate::widgets::panel::PanelStyle;
use crate::widgets::Widget;
use crate::window::WindowState;

/// Tooltip text shown after the pointer rests on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub text: String,
    /// Overrides the configured delay, in frames.
    pub delay_frames: Option<u32>,
}

impl Tooltip {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            delay_frames: None,
        }
    }

    pub fn with_delay(mut self, frames: u32) -> Self {
        self.delay_frames = Some(frames);
        self
    }
}

/// What an element is; decides how it updates and draws.
pub enum ElementKind {
    /// Invisible grouping node.
    Container,
    /// Filled rounded rectangle.
    Panel(PanelStyle),
    /// Single line of text.
    Label(Label),
    /// Managed window.
    Window(Box<WindowState>),
    /// Bottom bar listing windows.
    Taskbar,
    /// Taskbar entry mirroring one window.
    TaskbarButton {
        /// Window this button controls.
        window: ElementId,
    },
    /// Collaborator-provided widget.
    Custom(Box<dyn Widget>),
}

impl ElementKind {
    fn consumes_by_default(&self) -> bool {
        matches!(
            self,
            Self::Panel(_) | Self::Window(_) | Self::Taskbar | Self::TaskbarButton { .. }
        )
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Panel(_) => "panel",
            Self::Label(_) => "label",
            Self::Window(_) => "window",
            Self::Taskbar => "taskbar",
            Self::TaskbarButton { .. } => "taskbar-button",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Panel(style) => f.debug_tuple("Panel").field(style).finish(),
            Self::Label(label) => f.debug_tuple("Label").field(label).finish(),
            Self::Window(window) => f.debug_tuple("Window").field(window).finish(),
            Self::TaskbarButton { window } => f
                .debug_struct("TaskbarButton")
                .field("window", window)
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// A node in the scene graph.
///
/// `position` is local: relative to the parent's absolute position plus the parent's child
/// offset. Children are ordered back to front; the last child is topmost.
#[derive(Debug)]
pub struct Element {
    pub position: Vec2,
    pub size: Vec2,
    /// Own opacity; multiplied with every ancestor's.
    pub opacity: f32,
    pub visible: bool,
    /// Claims the pointer while hovered, hiding it from elements underneath.
    pub consumes_input: bool,
    pub can_focus: bool,
    pub tooltip: Option<Tooltip>,
    /// Opaque collaborator data.
    pub tag: Option<Value>,
    /// Offset applied to children of non-window elements.
    pub child_offset: Vec2,
    /// Items this element contributes to context menus opened on it or its descendants.
    pub context_items: Vec<MenuItem>,
    pub kind: ElementKind,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) observers: Observers,
    pub(crate) click_pending: bool,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            opacity: 1.0,
            visible: true,
            consumes_input: kind.consumes_by_default(),
            can_focus: false,
            tooltip: None,
            tag: None,
            child_offset: Vec2::ZERO,
            context_items: Vec::new(),
            kind,
            parent: None,
            children: Vec::new(),
            observers: Observers::new(),
            click_pending: false,
        }
    }

    pub fn container() -> Self {
        Self::new(ElementKind::Container)
    }

    pub fn panel(style: PanelStyle) -> Self {
        Self::new(ElementKind::Panel(style))
    }

    pub fn label(label: Label) -> Self {
        Self::new(ElementKind::Label(label))
    }

    pub fn custom(widget: impl Widget + 'static) -> Self {
        Self::new(ElementKind::Custom(Box::new(widget)))
    }

    pub fn with_bounds(mut self, rect: WindowRect) -> Self {
        self.position = rect.position();
        self.size = rect.size();
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn consuming(mut self, consumes_input: bool) -> Self {
        self.consumes_input = consumes_input;
        self
    }

    pub fn focusable(mut self, can_focus: bool) -> Self {
        self.can_focus = can_focus;
        self
    }

    pub fn with_tooltip(mut self, tooltip: Tooltip) -> Self {
        self.tooltip = Some(tooltip);
        self
    }

    pub fn with_tag(mut self, tag: Value) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_child_offset(mut self, offset: Vec2) -> Self {
        self.child_offset = offset;
        self
    }

    pub fn with_context_items(mut self, items: Vec<MenuItem>) -> Self {
        self.context_items = items;
        self
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Children back to front.
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Local bounds relative to the parent's child origin.
    pub fn local_bounds(&self) -> WindowRect {
        WindowRect::from_pos_size(self.position, self.size)
    }

    pub fn set_bounds(&mut self, rect: WindowRect) {
        self.position = rect.position();
        self.size = rect.size();
    }

    pub fn window(&self) -> Option<&WindowState> {
        match &self.kind {
            ElementKind::Window(window) => Some(window),
            _ => None,
        }
    }

    pub fn window_mut(&mut self) -> Option<&mut WindowState> {
        match &mut self.kind {
            ElementKind::Window(window) => Some(window),
            _ => None,
        }
    }

    pub fn is_window(&self) -> bool {
        matches!(self.kind, ElementKind::Window(_))
    }

    /// Adds an observer for this element's events.
    pub fn subscribe(&mut self, callback: impl FnMut(&ElementEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Offset from this element's absolute position to its children's origin.
    pub(crate) fn children_origin_offset(&self) -> Vec2 {
        match &self.kind {
            ElementKind::Window(window) => window.content_offset(),
            _ => self.child_offset,
        }
    }

    pub(crate) fn notify(&mut self, event: &ElementEvent) {
        self.observers.notify(event);
    }
}
