//! Process boundary: close notifications and fault routing for application-owned windows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier for a runtime-managed window, as seen by collaborators.
pub type WindowRuntimeId = u64;

/// Identifier of an application process that owns one or more windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub u64);

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pid:{}", self.0)
    }
}

/// Error raised by collaborator content while it updates or draws.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// The content hit a state it cannot continue from.
    #[error("content failed: {0}")]
    Failed(String),
    /// The content depends on a resource that is no longer available.
    #[error("missing resource `{0}`")]
    MissingResource(String),
}

impl ContentError {
    /// Shorthand for [`ContentError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// What the window manager should do with a window whose content faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultDisposition {
    /// Close the window immediately, skipping animations and confirmation.
    #[default]
    Terminate,
    /// Keep the window; the process handled the fault.
    Continue,
}

/// Process-level collaborator notified about the windows it owns.
///
/// Methods take `&self`; implementations keep their own interior state.
pub trait ProcessHost {
    /// Called once when the process is first assigned as a window's owner.
    fn window_initialized(&self, _process: ProcessId, _window: WindowRuntimeId) {}

    /// Called after a window owned by `process` left the scene graph.
    fn window_closed(&self, process: ProcessId, window: WindowRuntimeId);

    /// Called when content inside a window owned by `process` failed to update or draw.
    fn window_fault(
        &self,
        process: ProcessId,
        window: WindowRuntimeId,
        error: &ContentError,
    ) -> FaultDisposition;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_error_messages_are_descriptive() {
        assert_eq!(
            ContentError::failed("boom").to_string(),
            "content failed: boom"
        );
        assert_eq!(
            ContentError::MissingResource("font".into()).to_string(),
            "missing resource `font`"
        );
        assert_eq!(ProcessId(7).to_string(), "pid:7");
    }
}
