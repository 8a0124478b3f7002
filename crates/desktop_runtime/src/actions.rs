//! Pending-action queue.
//!
//! Work finished off the frame thread, or requested from inside an observer callback, is queued
//! here and applied at the start of the next `update`. The tree is never touched elsewhere.

use std::fmt;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::model::ElementId;
use crate::runtime::DesktopRuntime;

type RunFn = Box<dyn FnOnce(&mut DesktopRuntime) + Send>;

/// A deferred window-manager request.
pub enum PendingAction {
    /// Starts the close sequence (honors close confirmation).
    Close(ElementId),
    /// Removes the window immediately, skipping animation and confirmation.
    Terminate(ElementId),
    BringToFront(ElementId),
    Minimize(ElementId),
    Restore(ElementId),
    ToggleMaximize(ElementId),
    SetTitle(ElementId, String),
    /// Resumes a close that a confirmation callback left pending.
    ApproveClose(ElementId),
    /// Fires the one-shot owner initialization for a window.
    InitializeWindow(ElementId),
    /// Arbitrary work run with exclusive access to the runtime.
    Run(RunFn),
}

impl PendingAction {
    /// Wraps a closure as a [`PendingAction::Run`].
    pub fn run(f: impl FnOnce(&mut DesktopRuntime) + Send + 'static) -> Self {
        Self::Run(Box::new(f))
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Close(_) => "close",
            Self::Terminate(_) => "terminate",
            Self::BringToFront(_) => "bring-to-front",
            Self::Minimize(_) => "minimize",
            Self::Restore(_) => "restore",
            Self::ToggleMaximize(_) => "toggle-maximize",
            Self::SetTitle(..) => "set-title",
            Self::ApproveClose(_) => "approve-close",
            Self::InitializeWindow(_) => "initialize-window",
            Self::Run(_) => "run",
        }
    }
}

impl fmt::Debug for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetTitle(window, title) => f
                .debug_tuple("SetTitle")
                .field(window)
                .field(title)
                .finish(),
            Self::Run(_) => f.write_str("Run(..)"),
            Self::Close(window)
            | Self::Terminate(window)
            | Self::BringToFront(window)
            | Self::Minimize(window)
            | Self::Restore(window)
            | Self::ToggleMaximize(window)
            | Self::ApproveClose(window)
            | Self::InitializeWindow(window) => {
                f.debug_tuple(self.name()).field(window).finish()
            }
        }
    }
}

/// Cloneable, thread-safe handle for queueing [`PendingAction`]s.
#[derive(Debug, Clone)]
pub struct ActionSender {
    tx: UnboundedSender<PendingAction>,
}

impl ActionSender {
    /// Queues `action`. Returns `false` when the runtime is gone.
    pub fn send(&self, action: PendingAction) -> bool {
        self.tx.unbounded_send(action).is_ok()
    }
}

/// Receiving end drained once per frame.
#[derive(Debug)]
pub(crate) struct ActionQueue {
    tx: UnboundedSender<PendingAction>,
    rx: UnboundedReceiver<PendingAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> ActionSender {
        ActionSender {
            tx: self.tx.clone(),
        }
    }

    pub fn push(&self, action: PendingAction) {
        // The queue holds its own sender, so the channel cannot be closed here.
        let _ = self.tx.unbounded_send(action);
    }

    /// Everything queued so far. Actions queued while these run wait for the next drain.
    pub fn drain(&mut self) -> Vec<PendingAction> {
        let mut drained = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            drained.push(action);
        }
        drained
    }
}
