//! Shared contract types between the desktop window manager core and its collaborators.
//!
//! Collaborators (application processes, persistence, drop targets, menu providers) only ever
//! see the types in this crate. The core implements or consumes them; it never depends on a
//! concrete application.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod drag;
pub mod layout;
pub mod menu;
pub mod process;

use serde::{Deserialize, Serialize};

pub use drag::{DragDropService, DragEffect, DragPayload, DropTarget};
pub use layout::{HostError, PrefsLayoutHook, WindowLayout, WindowLayoutHook};
pub use menu::{ContextMenuProvider, MenuItem, MenuItemKind, MenuRequest};
pub use process::{ContentError, FaultDisposition, ProcessHost, ProcessId, WindowRuntimeId};

/// Stable identifier for an application package, used to key per-app window layouts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Returns an app identifier when `raw` conforms to the `segment.segment...` policy.
    ///
    /// # Errors
    ///
    /// Returns a description of the violated rule when `raw` is not a dotted lowercase name.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if is_valid_application_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!(
                "invalid application id `{raw}`; expected namespaced dotted segments"
            ))
        }
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_valid_application_id(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > 120 {
        return false;
    }

    let mut segments = 0usize;
    for part in raw.split('.') {
        segments += 1;
        let Some(first) = part.bytes().next() else {
            return false;
        };
        if part.len() > 32 || !first.is_ascii_lowercase() || part.ends_with('-') {
            return false;
        }
        if !part
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return false;
        }
    }

    segments >= 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Lifecycle events emitted by the window manager for a managed window.
pub enum WindowLifecycleEvent {
    /// The owning process was assigned for the first time; one-shot.
    Initialized,
    /// Window became the active window.
    Focused,
    /// Window stopped being the active window.
    Blurred,
    /// Window was minimized.
    Minimized,
    /// Window was restored from minimized or maximized state.
    Restored,
    /// Window was maximized or snapped.
    Maximized,
    /// Window close sequence started.
    Closing,
    /// Window close sequence completed and the window left the scene graph.
    Closed,
}

impl WindowLifecycleEvent {
    /// Returns a stable string token for persistence/debugging hooks.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Focused => "focused",
            Self::Blurred => "blurred",
            Self::Minimized => "minimized",
            Self::Restored => "restored",
            Self::Maximized => "maximized",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}
