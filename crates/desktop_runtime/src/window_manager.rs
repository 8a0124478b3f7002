//! Z-order and focus bookkeeping shared by the runtime.
//!
//! Z-order is the children order of the windows layer: raising a window removes and re-appends
//! it, and its child windows follow so modal dialogs stay above their owners.

use crate::error::DesktopResult;
use crate::model::ElementId;
use crate::tree::ElementTree;

/// Old and new holder of a focus slot after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FocusChange {
    pub lost: Option<ElementId>,
    pub gained: Option<ElementId>,
}

/// The single active window and the single focused element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusState {
    active_window: Option<ElementId>,
    focused_element: Option<ElementId>,
}

impl FocusState {
    pub fn active_window(&self) -> Option<ElementId> {
        self.active_window
    }

    pub fn focused_element(&self) -> Option<ElementId> {
        self.focused_element
    }

    pub(crate) fn set_active_window(&mut self, window: Option<ElementId>) -> Option<FocusChange> {
        if self.active_window == window {
            return None;
        }
        let lost = std::mem::replace(&mut self.active_window, window);
        Some(FocusChange {
            lost,
            gained: window,
        })
    }

    pub(crate) fn set_focused_element(
        &mut self,
        element: Option<ElementId>,
    ) -> Option<FocusChange> {
        if self.focused_element == element {
            return None;
        }
        let lost = std::mem::replace(&mut self.focused_element, element);
        Some(FocusChange {
            lost,
            gained: element,
        })
    }

    /// Drops references to an element that left the tree.
    pub(crate) fn forget(&mut self, id: ElementId) {
        if self.active_window == Some(id) {
            self.active_window = None;
        }
        if self.focused_element == Some(id) {
            self.focused_element = None;
        }
    }
}

/// Windows that can take activation: visible, not minimized, not closing.
pub(crate) fn is_activatable(tree: &ElementTree, id: ElementId) -> bool {
    tree.window(id).is_some_and(|window| window.accepts_pointer())
        && tree.is_effectively_visible(id)
}

/// Nearest activatable sibling window below `window` in z-order.
pub(crate) fn next_active_below(tree: &ElementTree, window: ElementId) -> Option<ElementId> {
    let parent = tree.parent(window)?;
    let siblings = tree.children(parent);
    let index = siblings.iter().position(|id| *id == window)?;
    siblings[..index]
        .iter()
        .rev()
        .copied()
        .find(|id| is_activatable(tree, *id))
}

/// Raises `window`, then its child windows (recursively) above it.
pub(crate) fn raise_window_stack(tree: &mut ElementTree, window: ElementId) -> DesktopResult<()> {
    tree.bring_to_front(window)?;
    let children: Vec<ElementId> = tree
        .window(window)
        .map(|state| state.child_windows.clone())
        .unwrap_or_default();
    let parent = tree.parent(window);
    for child in children {
        if tree.contains(child) && tree.parent(child) == parent {
            raise_window_stack(tree, child)?;
        }
    }
    Ok(())
}

/// Deepest visible modal descendant that should receive activation instead of `window`.
pub(crate) fn activation_target(tree: &ElementTree, window: ElementId) -> ElementId {
    let mut target = window;
    while let Some(modal) = tree.blocking_modal(target) {
        if modal == target {
            break;
        }
        target = modal;
    }
    target
}
