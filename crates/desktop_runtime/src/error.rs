//! Error types surfaced by the desktop runtime.

use desktop_window_contract::ContentError;
use thiserror::Error;

use crate::model::ElementId;

/// Errors returned by scene-graph, window-manager, and configuration operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DesktopError {
    /// The requested element is not in the arena.
    #[error("element {0:?} not found")]
    ElementNotFound(ElementId),
    /// A window operation was requested on an element that is not a window.
    #[error("element {0:?} is not a window")]
    NotAWindow(ElementId),
    /// `add_child` was given an element that already has a parent.
    #[error("element {0:?} is already attached to a parent")]
    AlreadyAttached(ElementId),
    /// `add_child` would make an element its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Requested parent.
        parent: ElementId,
        /// Requested child.
        child: ElementId,
    },
    /// The root element and the built-in layers cannot be detached.
    #[error("element {0:?} is a fixed desktop layer and cannot be detached")]
    RootImmutable(ElementId),
    /// A widget with no owning process failed during update or draw.
    #[error("widget {element:?} failed: {source}")]
    Widget {
        /// Element hosting the failing widget.
        element: ElementId,
        /// Error returned by the widget.
        #[source]
        source: ContentError,
    },
    /// Configuration could not be read or is unusable.
    #[error("desktop config error: {0}")]
    Config(String),
}

impl DesktopError {
    /// Builds a [`DesktopError::Config`] from any displayable message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result alias used throughout the runtime.
pub type DesktopResult<T> = Result<T, DesktopError>;
