//! Per-application window layout persistence hook.

use platform_host::{load_pref_with, save_pref_with, PrefsStore, WindowRect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ApplicationId;

/// Schema version embedded in persisted layout keys.
pub const WINDOW_LAYOUT_SCHEMA_VERSION: u32 = 1;

/// Persisted floating geometry and maximize flag for an application's window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowLayout {
    /// Floating (restore) rectangle.
    pub rect: WindowRect,
    /// Whether the window was maximized when saved.
    pub maximized: bool,
}

/// Failure reported by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The backing store rejected the operation.
    #[error("layout store failed: {0}")]
    Store(String),
}

/// Hook invoked by the window manager to load and save window layouts keyed by application id.
pub trait WindowLayoutHook {
    /// Loads the saved layout for `app_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] when the backing store fails.
    fn load_layout(&self, app_id: &ApplicationId) -> Result<Option<WindowLayout>, HostError>;

    /// Saves the layout for `app_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] when the backing store fails.
    fn save_layout(&self, app_id: &ApplicationId, layout: &WindowLayout) -> Result<(), HostError>;
}

/// Layout hook storing JSON layouts in any [`PrefsStore`].
#[derive(Debug, Clone, Default)]
pub struct PrefsLayoutHook<S> {
    store: S,
}

impl<S: PrefsStore> PrefsLayoutHook<S> {
    /// Wraps a preference store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Preference key used for `app_id`.
    pub fn key_for(app_id: &ApplicationId) -> String {
        format!("desktop.layout.{app_id}.v{WINDOW_LAYOUT_SCHEMA_VERSION}")
    }
}

impl<S: PrefsStore> WindowLayoutHook for PrefsLayoutHook<S> {
    fn load_layout(&self, app_id: &ApplicationId) -> Result<Option<WindowLayout>, HostError> {
        load_pref_with(&self.store, &Self::key_for(app_id)).map_err(HostError::Store)
    }

    fn save_layout(&self, app_id: &ApplicationId, layout: &WindowLayout) -> Result<(), HostError> {
        save_pref_with(&self.store, &Self::key_for(app_id), layout).map_err(HostError::Store)
    }
}

#[cfg(test)]
mod tests {
    use platform_host::MemoryPrefsStore;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn prefs_layout_hook_round_trips_by_application_id() {
        let hook = PrefsLayoutHook::new(MemoryPrefsStore::default());
        let app = ApplicationId::new("system.explorer").expect("valid id");
        let layout = WindowLayout {
            rect: WindowRect::new(10.0, 20.0, 300.0, 200.0),
            maximized: true,
        };

        assert_eq!(hook.load_layout(&app).expect("load"), None);
        hook.save_layout(&app, &layout).expect("save");
        assert_eq!(hook.load_layout(&app).expect("load"), Some(layout));
        assert_eq!(
            PrefsLayoutHook::<MemoryPrefsStore>::key_for(&app),
            "desktop.layout.system.explorer.v1"
        );
    }

    #[test]
    fn corrupt_layout_is_reported_as_store_error() {
        let store = MemoryPrefsStore::default();
        let app = ApplicationId::new("system.notes").expect("valid id");
        store
            .save_pref(&PrefsLayoutHook::<MemoryPrefsStore>::key_for(&app), "[")
            .expect("save raw");
        let hook = PrefsLayoutHook::new(store);
        assert!(matches!(hook.load_layout(&app), Err(HostError::Store(_))));
    }
}
