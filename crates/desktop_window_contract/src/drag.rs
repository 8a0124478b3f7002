//! Drag-and-drop session contract.
//!
//! At most one drag session exists per window manager. Sources start it with
//! [`DragDropService::begin_drag`]; targets negotiate through [`DropTarget`]; the manager
//! orchestrates the drop with [`DragDropService::try_drop_on`] and cancels orphaned sessions.

use std::collections::HashMap;

use platform_host::{FrameTime, RenderSurface, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Visual feedback for the current drop position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DragEffect {
    /// Nothing would happen on drop.
    #[default]
    None,
    /// Dropping copies the payload.
    Copy,
    /// Dropping moves the payload.
    Move,
    /// Dropping creates a link to the payload.
    Link,
}

/// Opaque payload carried by a drag session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragPayload {
    /// Collaborator-defined payload type, e.g. `"vfs.entries"`.
    pub kind: String,
    /// Collaborator-defined payload body.
    pub data: Value,
}

impl DragPayload {
    /// Creates a payload.
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// Human-readable label, read from `data.label` when present.
    pub fn label(&self) -> &str {
        self.data
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or(self.kind.as_str())
    }
}

/// A collaborator that can receive dropped payloads.
pub trait DropTarget {
    /// Returns `true` when the payload type is acceptable at all.
    fn can_accept_drop(&self, payload: &DragPayload) -> bool;

    /// Continuous hover feedback while the payload is over this target.
    fn on_drag_over(&mut self, payload: &DragPayload, position: Vec2) -> DragEffect;

    /// Performs the drop. Returns `true` when the target handled it.
    fn on_drop(&mut self, payload: &DragPayload, position: Vec2) -> bool;
}

/// The single drag session owned by a window manager.
pub trait DragDropService {
    /// Starts a session. Returns `false` and leaves the existing session untouched when one is
    /// already active.
    fn begin_drag(
        &mut self,
        payload: DragPayload,
        source_position: Vec2,
        grab_offset: Vec2,
    ) -> bool;

    /// Commits the session: the payload was delivered.
    fn end_drag(&mut self);

    /// Abandons the session and animates the payload back to its source.
    fn cancel_drag(&mut self);

    /// Returns `true` while a session is active.
    fn is_active(&self) -> bool;

    /// Payload of the active session.
    fn drag_data(&self) -> Option<&DragPayload>;

    /// Current visual effect.
    fn current_effect(&self) -> DragEffect;

    /// Sets the visual effect; ignored when no session is active.
    fn set_current_effect(&mut self, effect: DragEffect);

    /// Position the drag started from.
    fn drag_source_position(&self) -> Option<Vec2>;

    /// Offset between the pointer and the payload's top-left corner.
    fn drag_grab_offset(&self) -> Option<Vec2>;

    /// Records an extra origin for group drags so each item can snap back separately.
    fn store_custom_position(&mut self, key: &str, position: Vec2);

    /// Origins recorded with [`DragDropService::store_custom_position`].
    fn stored_positions(&self) -> &HashMap<String, Vec2>;

    /// Sets or clears a ghost preview position for item `id`.
    fn set_drop_preview_position(&mut self, id: &str, position: Option<Vec2>);

    /// Moves the floating payload with the pointer.
    fn update_pointer(&mut self, position: Vec2);

    /// Advances the snap-back animation.
    fn update(&mut self, time: &FrameTime);

    /// Returns `true` while a cancelled payload is animating back to its source.
    fn is_snapping_back(&self) -> bool;

    /// Negotiates a drop with `target`: checks acceptance, delivers, and ends the session only
    /// when the target reports the drop as handled. Otherwise the effect resets to
    /// [`DragEffect::None`] and the session stays active for another target.
    fn try_drop_on(&mut self, target: &mut dyn DropTarget, position: Vec2) -> bool {
        let Some(payload) = self.drag_data().cloned() else {
            return false;
        };
        if target.can_accept_drop(&payload) && target.on_drop(&payload, position) {
            self.end_drag();
            return true;
        }
        self.set_current_effect(DragEffect::None);
        false
    }

    /// Draws the floating payload on top of everything else.
    fn draw(&self, surface: &mut dyn RenderSurface);
}
