//! Leaf widgets and the collaborator widget trait.
//!
//! Built-in widgets (panels, labels, the context-menu overlay, tooltips) carry no state machine
//! of their own. Collaborators plug richer content in through [`Widget`].

pub mod context_menu;
pub mod label;
pub mod panel;
pub mod tooltip;

use desktop_window_contract::{ContentError, DragPayload, DropTarget, MenuItem};
use platform_host::{FrameTime, RenderSurface, Vec2, WindowRect};

use crate::model::{ElementId, PointerState};

/// Per-frame input view handed to [`Widget::update`].
#[derive(Debug)]
pub struct WidgetContext<'a> {
    pub element: ElementId,
    /// Absolute bounds of the hosting element.
    pub bounds: WindowRect,
    pub pointer: &'a PointerState,
    pub time: FrameTime,
    /// Element or one of its descendants is hovered.
    pub hovered: bool,
    /// This element claimed the pointer this frame.
    pub has_input: bool,
    /// A click completed on this element this frame.
    pub clicked: bool,
    pub focused: bool,
    pub(crate) drag_request: Option<DragRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DragRequest {
    pub payload: DragPayload,
    pub grab_offset: Vec2,
}

impl WidgetContext<'_> {
    /// Pointer position relative to the element's top-left corner.
    pub fn local_pointer(&self) -> Vec2 {
        self.pointer.position - self.bounds.position()
    }

    /// Asks the window manager to start a drag session with `payload` from this element.
    ///
    /// Ignored when a session is already active.
    pub fn begin_drag(&mut self, payload: DragPayload, grab_offset: Vec2) {
        self.drag_request = Some(DragRequest {
            payload,
            grab_offset,
        });
    }
}

/// Read-only view handed to [`Widget::draw`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetDrawContext {
    pub element: ElementId,
    /// Absolute bounds; inside a window the surface translates them into the window's target.
    pub bounds: WindowRect,
    /// Opacity composited down from the nearest window.
    pub opacity: f32,
    pub hovered: bool,
    pub focused: bool,
}

/// Collaborator-provided content hosted by an element.
///
/// Errors returned from `update` or `draw` inside an application-owned window are routed to the
/// owning process; anywhere else they propagate out of the frame.
pub trait Widget {
    fn update(&mut self, _ctx: &mut WidgetContext<'_>) -> Result<(), ContentError> {
        Ok(())
    }

    fn draw(
        &self,
        ctx: &WidgetDrawContext,
        surface: &mut dyn RenderSurface,
    ) -> Result<(), ContentError>;

    /// Drop-target behavior, when this widget accepts drags.
    fn drop_target(&mut self) -> Option<&mut dyn DropTarget> {
        None
    }

    /// Items contributed to context menus opened on this widget or its descendants.
    fn context_menu_items(&self) -> Vec<MenuItem> {
        Vec::new()
    }
}
