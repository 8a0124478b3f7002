//! Wizard-style page sequencing composed into a window.

use crate::model::ElementId;

/// Result of moving through a [`StepSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The current page changed to the given index.
    Moved(usize),
    /// Already at the boundary; nothing changed.
    Unchanged,
    /// `next` was called on the last page; the window should close.
    Finished,
}

/// Ordered pages of a multi-step window. Only the current page is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSequence {
    pages: Vec<ElementId>,
    current: usize,
}

impl StepSequence {
    pub fn new(pages: Vec<ElementId>) -> Self {
        Self { pages, current: 0 }
    }

    pub fn pages(&self) -> &[ElementId] {
        &self.pages
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_page(&self) -> Option<ElementId> {
        self.pages.get(self.current).copied()
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.pages.len()
    }

    /// Advances one page, or finishes on the last page.
    pub fn next(&mut self) -> StepOutcome {
        if self.is_last() {
            return StepOutcome::Finished;
        }
        self.current += 1;
        StepOutcome::Moved(self.current)
    }

    /// Goes back one page.
    pub fn back(&mut self) -> StepOutcome {
        if self.current == 0 {
            return StepOutcome::Unchanged;
        }
        self.current -= 1;
        StepOutcome::Moved(self.current)
    }
}
