//! Per-application window layout persistence.
//!
//! Layouts load when a window opens and save when it closes. Geometry changes mark the window
//! dirty; dirty layouts flush on a frame where the primary button is up, so a drag saves once on
//! release rather than every frame. Hook failures are logged and otherwise ignored.

use std::fmt;
use std::rc::Rc;

use desktop_window_contract::{ApplicationId, WindowLayout, WindowLayoutHook};
use tracing::warn;

use crate::model::ElementId;
use crate::tree::ElementTree;

/// Floating rectangle and maximize flag worth persisting for `window`.
pub fn layout_of(tree: &ElementTree, window: ElementId) -> Option<(ApplicationId, WindowLayout)> {
    let element = tree.get(window)?;
    let state = element.window()?;
    let app_id = state.app_id()?.clone();
    let layout = if let Some(memory) = state.minimized_from {
        WindowLayout {
            rect: if memory.maximized {
                state.restore_rect()
            } else {
                memory.rect
            },
            maximized: memory.maximized,
        }
    } else if state.is_maximized() {
        WindowLayout {
            rect: state.restore_rect(),
            maximized: true,
        }
    } else {
        WindowLayout {
            rect: element.local_bounds(),
            maximized: false,
        }
    };
    Some((app_id, layout))
}

/// Optional layout hook plus the set of windows with unsaved geometry.
#[derive(Default)]
pub(crate) struct LayoutPersistence {
    hook: Option<Rc<dyn WindowLayoutHook>>,
    dirty: Vec<ElementId>,
}

impl LayoutPersistence {
    pub fn set_hook(&mut self, hook: Option<Rc<dyn WindowLayoutHook>>) {
        self.hook = hook;
    }

    pub fn load(&self, app_id: &ApplicationId) -> Option<WindowLayout> {
        let hook = self.hook.as_ref()?;
        match hook.load_layout(app_id) {
            Ok(layout) => layout,
            Err(err) => {
                warn!(app = %app_id, error = %err, "window layout load failed");
                None
            }
        }
    }

    pub fn mark_dirty(&mut self, window: ElementId) {
        if self.hook.is_some() && !self.dirty.contains(&window) {
            self.dirty.push(window);
        }
    }

    /// Saves `window` right away, dropping any pending dirty mark.
    pub fn save_now(&mut self, tree: &ElementTree, window: ElementId) {
        self.dirty.retain(|id| *id != window);
        self.save(tree, window);
    }

    /// Saves every dirty layout unless the primary button is held. Returns how many were saved.
    pub fn flush(&mut self, tree: &ElementTree, primary_down: bool) -> usize {
        if primary_down || self.dirty.is_empty() {
            return 0;
        }
        let dirty = std::mem::take(&mut self.dirty);
        dirty
            .into_iter()
            .filter(|window| self.save(tree, *window))
            .count()
    }

    fn save(&self, tree: &ElementTree, window: ElementId) -> bool {
        let Some(hook) = &self.hook else {
            return false;
        };
        let Some((app_id, layout)) = layout_of(tree, window) else {
            return false;
        };
        match hook.save_layout(&app_id, &layout) {
            Ok(()) => true,
            Err(err) => {
                warn!(app = %app_id, error = %err, "window layout save failed");
                false
            }
        }
    }
}

impl fmt::Debug for LayoutPersistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutPersistence")
            .field("hook", &self.hook.is_some())
            .field("dirty", &self.dirty)
            .finish()
    }
}
