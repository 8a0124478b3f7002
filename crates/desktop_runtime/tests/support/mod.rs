#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use desktop_runtime::{DesktopConfig, DesktopRuntime, ElementEvent, ElementId, FrameInput};
use desktop_window_contract::{
    ContentError, FaultDisposition, ProcessHost, ProcessId, WindowRuntimeId,
};
use platform_host::{RecordingSurface, Vec2, WindowRect};

/// A runtime plus the surface it renders into, driven one frame at a time.
pub struct Desk {
    pub runtime: DesktopRuntime,
    pub surface: RecordingSurface,
}

impl Desk {
    pub fn new() -> Self {
        Self {
            runtime: DesktopRuntime::new(DesktopConfig::default()).expect("default config"),
            surface: RecordingSurface::new(),
        }
    }

    /// One update followed by one render.
    pub fn frame(&mut self, input: FrameInput) {
        self.runtime.update(input).expect("update");
        self.runtime.render(&mut self.surface).expect("render");
    }

    pub fn hover(&mut self, at: Vec2) {
        self.frame(FrameInput::at(at));
    }

    pub fn press(&mut self, at: Vec2) {
        self.frame(FrameInput::at(at).primary());
    }

    /// Move, press, release at one point.
    pub fn click(&mut self, at: Vec2) {
        self.hover(at);
        self.press(at);
        self.hover(at);
    }

    pub fn right_click(&mut self, at: Vec2) {
        self.hover(at);
        self.frame(FrameInput::at(at).secondary());
        self.hover(at);
    }

    /// Press at `from`, move to `to` with the button held, release at `to`.
    pub fn drag(&mut self, from: Vec2, to: Vec2) {
        self.hover(from);
        self.press(from);
        self.press(to);
        self.hover(to);
    }

    /// Runs idle frames until every tween in flight has finished.
    pub fn settle(&mut self) {
        let at = self.runtime.pointer().position;
        for _ in 0..60 {
            self.hover(at);
        }
    }

    pub fn bounds(&self, id: ElementId) -> WindowRect {
        self.runtime.tree().absolute_bounds(id)
    }
}

/// Records every event delivered to `id`.
pub fn record_events(
    runtime: &mut DesktopRuntime,
    id: ElementId,
) -> Rc<RefCell<Vec<ElementEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    runtime
        .subscribe(id, move |event| sink.borrow_mut().push(event.clone()))
        .expect("subscribe");
    events
}

pub fn clicks(events: &RefCell<Vec<ElementEvent>>) -> usize {
    events
        .borrow()
        .iter()
        .filter(|event| matches!(event, ElementEvent::Click { .. }))
        .count()
}

pub fn assert_rect_near(actual: WindowRect, expected: WindowRect) {
    let close = |a: f32, b: f32| (a - b).abs() < 0.01;
    assert!(
        close(actual.x, expected.x)
            && close(actual.y, expected.y)
            && close(actual.w, expected.w)
            && close(actual.h, expected.h),
        "expected {expected:?}, got {actual:?}"
    );
}

/// Process host that records every callback.
#[derive(Default)]
pub struct RecordingHost {
    pub initialized: RefCell<Vec<(ProcessId, WindowRuntimeId)>>,
    pub closed: RefCell<Vec<(ProcessId, WindowRuntimeId)>>,
    pub faults: RefCell<Vec<(ProcessId, String)>>,
    pub keep_faulted_windows: bool,
}

impl ProcessHost for RecordingHost {
    fn window_initialized(&self, process: ProcessId, window: WindowRuntimeId) {
        self.initialized.borrow_mut().push((process, window));
    }

    fn window_closed(&self, process: ProcessId, window: WindowRuntimeId) {
        self.closed.borrow_mut().push((process, window));
    }

    fn window_fault(
        &self,
        process: ProcessId,
        _window: WindowRuntimeId,
        error: &ContentError,
    ) -> FaultDisposition {
        self.faults.borrow_mut().push((process, error.to_string()));
        if self.keep_faulted_windows {
            FaultDisposition::Continue
        } else {
            FaultDisposition::Terminate
        }
    }
}
