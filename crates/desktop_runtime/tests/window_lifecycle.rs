mod support;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use desktop_runtime::{CloseVerdict, ElementEvent, PendingAction, WindowMode, WindowSpec};
use desktop_window_contract::{
    ApplicationId, HostError, PrefsLayoutHook, ProcessId, WindowLayout, WindowLayoutHook,
    WindowLifecycleEvent,
};
use platform_host::{MemoryPrefsStore, Vec2, WindowRect};
use pretty_assertions::assert_eq;

use support::{assert_rect_near, record_events, Desk, RecordingHost};

fn window(title: &str, x: f32, y: f32, w: f32, h: f32) -> WindowSpec {
    WindowSpec::new(title).with_rect(WindowRect::new(x, y, w, h))
}

fn lifecycle(events: &RefCell<Vec<ElementEvent>>) -> Vec<WindowLifecycleEvent> {
    events
        .borrow()
        .iter()
        .filter_map(|event| match event {
            ElementEvent::Lifecycle(lifecycle) => Some(*lifecycle),
            _ => None,
        })
        .collect()
}

#[test]
fn resizing_from_the_top_left_keeps_the_bottom_right_corner() {
    let mut desk = Desk::new();
    let id = desk
        .runtime
        .open_window(window("Paint", 300.0, 300.0, 200.0, 200.0))
        .expect("open");
    let corner_before = desk.bounds(id).bottom_right();

    let grab = Vec2::new(301.0, 301.0);
    desk.hover(grab);
    desk.press(grab);
    assert_eq!(desk.runtime.window(id).expect("window").mode(), WindowMode::Resizing);
    desk.press(grab + Vec2::new(300.0, 300.0));
    desk.hover(grab + Vec2::new(300.0, 300.0));

    let bounds = desk.bounds(id);
    assert_eq!(bounds.size(), Vec2::new(100.0, 100.0));
    assert_eq!(bounds.bottom_right(), corner_before);
    let state = desk.runtime.window(id).expect("window");
    assert_eq!(state.mode(), WindowMode::Normal);
    assert_eq!(state.restore_rect(), WindowRect::new(400.0, 400.0, 100.0, 100.0));
}

#[test]
fn title_bar_drag_waits_for_the_threshold_then_commits() {
    let mut desk = Desk::new();
    let id = desk
        .runtime
        .open_window(window("Notes", 200.0, 150.0, 300.0, 200.0))
        .expect("open");

    desk.drag(Vec2::new(250.0, 160.0), Vec2::new(253.0, 162.0));
    assert_eq!(desk.bounds(id).position(), Vec2::new(200.0, 150.0));
    // Let the double-click window lapse.
    desk.settle();

    desk.hover(Vec2::new(250.0, 160.0));
    desk.press(Vec2::new(250.0, 160.0));
    desk.press(Vec2::new(350.0, 260.0));
    assert_eq!(desk.runtime.window(id).expect("window").mode(), WindowMode::Dragging);
    desk.hover(Vec2::new(350.0, 260.0));

    let state = desk.runtime.window(id).expect("window");
    assert_eq!(state.mode(), WindowMode::Normal);
    assert_eq!(desk.bounds(id).position(), Vec2::new(300.0, 250.0));
    assert_eq!(state.restore_rect(), WindowRect::new(300.0, 250.0, 300.0, 200.0));
}

#[test]
fn dragging_to_the_top_edge_snaps_and_dragging_away_restores() {
    let mut desk = Desk::new();
    let id = desk
        .runtime
        .open_window(window("Browser", 200.0, 150.0, 300.0, 200.0))
        .expect("open");
    let work_area = desk.runtime.config().work_area();

    desk.hover(Vec2::new(250.0, 160.0));
    desk.press(Vec2::new(250.0, 160.0));
    desk.press(Vec2::new(640.0, 5.0));
    assert!(desk.runtime.window(id).expect("window").snap_preview().is_some());
    desk.hover(Vec2::new(640.0, 5.0));
    desk.settle();

    assert!(desk.runtime.window(id).expect("window").is_maximized());
    assert_rect_near(desk.bounds(id), work_area);

    // Pop back out: the grab point keeps its relative place on the title bar.
    desk.hover(Vec2::new(640.0, 10.0));
    desk.press(Vec2::new(640.0, 10.0));
    desk.press(Vec2::new(640.0, 300.0));
    desk.hover(Vec2::new(640.0, 300.0));

    let bounds = desk.bounds(id);
    assert!(!desk.runtime.window(id).expect("window").is_maximized());
    assert_eq!(bounds.size(), Vec2::new(300.0, 200.0));
    assert_eq!(bounds.position(), Vec2::new(490.0, 290.0));
}

#[test]
fn title_bar_double_click_toggles_maximize() {
    let mut desk = Desk::new();
    let id = desk
        .runtime
        .open_window(window("Terminal", 200.0, 150.0, 300.0, 200.0))
        .expect("open");
    let events = record_events(&mut desk.runtime, id);
    let title = Vec2::new(260.0, 165.0);

    desk.click(title);
    desk.click(title);
    desk.settle();
    assert!(desk.runtime.window(id).expect("window").is_maximized());
    assert_rect_near(desk.bounds(id), desk.runtime.config().work_area());

    desk.runtime.toggle_maximize(id).expect("toggle");
    desk.settle();
    assert_rect_near(desk.bounds(id), WindowRect::new(200.0, 150.0, 300.0, 200.0));
    assert_eq!(
        lifecycle(&events),
        vec![WindowLifecycleEvent::Maximized, WindowLifecycleEvent::Restored]
    );
}

#[test]
fn minimize_then_restore_returns_to_the_same_geometry() {
    let mut desk = Desk::new();
    let id = desk
        .runtime
        .open_window(window("Mail", 200.0, 150.0, 300.0, 200.0))
        .expect("open");
    desk.settle();
    let before = desk.bounds(id);

    desk.runtime.minimize(id).expect("minimize");
    desk.settle();
    let element = desk.runtime.element(id).expect("element");
    assert!(!element.visible);
    assert!(desk.runtime.window(id).expect("window").is_minimized());
    assert_eq!(desk.runtime.active_window(), None);

    desk.runtime.restore(id).expect("restore");
    desk.settle();
    let element = desk.runtime.element(id).expect("element");
    assert!(element.visible);
    assert!((element.opacity - 1.0).abs() < 0.001);
    assert_rect_near(desk.bounds(id), before);
    assert_eq!(desk.runtime.window(id).expect("window").mode(), WindowMode::Normal);
    assert_eq!(desk.runtime.active_window(), Some(id));
}

#[test]
fn minimizing_the_active_window_activates_the_one_below() {
    let mut desk = Desk::new();
    let below = desk
        .runtime
        .open_window(window("Below", 100.0, 100.0, 300.0, 200.0))
        .expect("below");
    let above = desk
        .runtime
        .open_window(window("Above", 150.0, 150.0, 300.0, 200.0))
        .expect("above");
    assert_eq!(desk.runtime.active_window(), Some(above));

    desk.runtime.minimize(above).expect("minimize");
    assert_eq!(desk.runtime.active_window(), Some(below));

    desk.runtime.close_window(below).expect("close");
    assert_eq!(desk.runtime.active_window(), None);
}

#[test]
fn minimized_half_snapped_window_restores_to_its_half() {
    let mut desk = Desk::new();
    let id = desk
        .runtime
        .open_window(window("Notes", 200.0, 150.0, 300.0, 200.0))
        .expect("open");

    desk.hover(Vec2::new(250.0, 160.0));
    desk.press(Vec2::new(250.0, 160.0));
    desk.press(Vec2::new(3.0, 300.0));
    desk.hover(Vec2::new(3.0, 300.0));
    desk.settle();
    let snapped = desk.bounds(id);
    assert_rect_near(snapped, WindowRect::new(0.0, 0.0, 640.0, 760.0));

    desk.runtime.minimize(id).expect("minimize");
    desk.settle();
    desk.runtime.restore(id).expect("restore");
    desk.settle();

    assert_rect_near(desk.bounds(id), snapped);
    assert_eq!(desk.runtime.window(id).expect("window").mode(), WindowMode::Maximized);
}

#[test]
fn press_right_after_a_drag_is_not_a_double_click() {
    let mut desk = Desk::new();
    let id = desk
        .runtime
        .open_window(window("Notes", 200.0, 150.0, 300.0, 200.0))
        .expect("open");

    desk.hover(Vec2::new(250.0, 160.0));
    desk.press(Vec2::new(250.0, 160.0));
    desk.press(Vec2::new(450.0, 360.0));
    desk.hover(Vec2::new(450.0, 360.0));
    assert_eq!(desk.bounds(id).position(), Vec2::new(400.0, 350.0));

    desk.click(Vec2::new(450.0, 360.0));
    desk.settle();

    assert_eq!(desk.runtime.window(id).expect("window").mode(), WindowMode::Normal);
    assert_rect_near(desk.bounds(id), WindowRect::new(400.0, 350.0, 300.0, 200.0));
}

#[test]
fn minimizing_never_activates_a_window_stacked_above() {
    let mut desk = Desk::new();
    let parent = desk
        .runtime
        .open_window(window("Editor", 100.0, 100.0, 400.0, 300.0))
        .expect("parent");
    desk.runtime
        .open_window(window("Find", 150.0, 150.0, 200.0, 120.0).child_of(parent))
        .expect("child");
    desk.runtime.activate_window(parent).expect("activate");
    assert_eq!(desk.runtime.active_window(), Some(parent));

    desk.runtime.minimize(parent).expect("minimize");

    assert_eq!(desk.runtime.active_window(), None);
}

#[test]
fn terminated_window_leaves_the_taskbar() {
    let mut desk = Desk::new();
    let id = desk
        .runtime
        .open_window(window("Player", 200.0, 150.0, 300.0, 200.0))
        .expect("open");
    desk.hover(Vec2::new(640.0, 500.0));
    assert!(desk.runtime.taskbar().button_for(id).is_some());

    desk.runtime.terminate(id).expect("terminate");
    desk.hover(Vec2::new(640.0, 500.0));

    assert!(!desk.runtime.tree().contains(id));
    assert!(desk.runtime.taskbar().buttons().is_empty());
}

#[test]
fn taskbar_mirrors_windows_and_routes_clicks() {
    let mut desk = Desk::new();
    let first = desk
        .runtime
        .open_window(window("First", 100.0, 100.0, 300.0, 200.0))
        .expect("first");
    let second = desk
        .runtime
        .open_window(window("Second", 500.0, 100.0, 300.0, 200.0))
        .expect("second");
    desk.hover(Vec2::new(640.0, 500.0));

    let windows: Vec<_> = desk.runtime.taskbar().buttons().iter().map(|(w, _)| *w).collect();
    assert_eq!(windows, vec![first, second]);
    let button = |desk: &Desk, window| {
        let id = desk.runtime.taskbar().button_for(window).expect("button");
        desk.bounds(id).center()
    };

    // Active window minimizes.
    desk.click(button(&desk, second));
    assert!(desk.runtime.window(second).expect("second").is_minimized());
    assert_eq!(desk.runtime.active_window(), Some(first));
    desk.settle();

    // Minimized window restores.
    desk.click(button(&desk, second));
    assert!(!desk.runtime.window(second).expect("second").is_minimized());
    assert_eq!(desk.runtime.active_window(), Some(second));
    desk.settle();

    // Inactive window is activated and raised.
    desk.click(button(&desk, first));
    assert_eq!(desk.runtime.active_window(), Some(first));
    desk.settle();
    let windows: Vec<_> = desk.runtime.taskbar().buttons().iter().map(|(w, _)| *w).collect();
    assert_eq!(windows, vec![second, first]);

    desk.runtime.close_window(first).expect("close");
    desk.settle();
    assert_eq!(desk.runtime.taskbar().buttons().len(), 1);
    assert_eq!(desk.runtime.taskbar().button_for(first), None);
}

#[test]
fn close_button_closes_and_notifies_the_owner_once() {
    let mut desk = Desk::new();
    let host = Rc::new(RecordingHost::default());
    desk.runtime.set_process_host(Some(host.clone()));
    let id = desk
        .runtime
        .open_window(window("Calc", 200.0, 150.0, 300.0, 200.0).with_owner(ProcessId(7)))
        .expect("open");
    let events = record_events(&mut desk.runtime, id);
    desk.settle();

    // Close sits at the right end of the caption.
    desk.click(Vec2::new(487.0, 164.0));
    assert!(desk.runtime.window(id).expect("closing").is_closing());
    desk.settle();

    assert!(!desk.runtime.tree().contains(id));
    assert_eq!(*host.closed.borrow(), vec![(ProcessId(7), id.runtime_id())]);
    assert_eq!(*host.initialized.borrow(), vec![(ProcessId(7), id.runtime_id())]);
    assert_eq!(
        lifecycle(&events),
        vec![
            WindowLifecycleEvent::Initialized,
            WindowLifecycleEvent::Closing,
            WindowLifecycleEvent::Blurred,
            WindowLifecycleEvent::Closed
        ]
    );
}

#[test]
fn owner_initialization_fires_once() {
    let mut desk = Desk::new();
    let host = Rc::new(RecordingHost::default());
    desk.runtime.set_process_host(Some(host.clone()));
    let id = desk
        .runtime
        .open_window(window("Viewer", 200.0, 150.0, 300.0, 200.0))
        .expect("open");

    desk.runtime.set_owner_process(id, ProcessId(3)).expect("owner");
    desk.runtime.set_owner_process(id, ProcessId(4)).expect("owner again");
    desk.settle();

    assert_eq!(*host.initialized.borrow(), vec![(ProcessId(4), id.runtime_id())]);
    assert_eq!(desk.runtime.window(id).expect("window").owner(), Some(ProcessId(4)));
}

#[test]
fn close_confirmation_can_defer_or_veto() {
    let mut desk = Desk::new();
    let id = desk
        .runtime
        .open_window(window("Draft", 200.0, 150.0, 300.0, 200.0))
        .expect("open");
    let asked = Rc::new(Cell::new(0));
    let verdict = Rc::new(Cell::new(CloseVerdict::Veto));
    {
        let asked = Rc::clone(&asked);
        let verdict = Rc::clone(&verdict);
        desk.runtime
            .set_close_confirmation(id, move || {
                asked.set(asked.get() + 1);
                verdict.get()
            })
            .expect("confirmation");
    }

    desk.runtime.close_window(id).expect("vetoed close");
    desk.settle();
    assert!(desk.runtime.tree().contains(id));
    assert!(!desk.runtime.window(id).expect("window").is_close_pending());

    verdict.set(CloseVerdict::Pending);
    desk.runtime.close_window(id).expect("pending close");
    desk.settle();
    let state = desk.runtime.window(id).expect("window");
    assert!(state.is_close_pending());
    assert!(!state.is_closing());

    desk.runtime.queue(PendingAction::ApproveClose(id));
    desk.settle();
    assert!(!desk.runtime.tree().contains(id));
    assert_eq!(asked.get(), 2);
}

#[test]
fn window_resources_are_released_exactly_once() {
    let mut desk = Desk::new();
    let id = desk
        .runtime
        .open_window(window("Photos", 200.0, 150.0, 300.0, 200.0))
        .expect("open");
    desk.settle();
    assert!(desk.runtime.window(id).expect("window").has_render_target());
    assert_eq!(desk.surface.live_target_count(), 1);

    desk.runtime.minimize(id).expect("minimize");
    desk.settle();
    assert!(desk.runtime.window(id).expect("window").has_snapshot());
    assert_eq!(desk.surface.live_texture_count(), 1);

    desk.runtime.close_window(id).expect("close");
    desk.settle();
    desk.settle();

    assert!(!desk.runtime.tree().contains(id));
    assert_eq!(desk.runtime.pending_release_count(), 0);
    assert_eq!(desk.surface.live_target_count(), 0);
    assert_eq!(desk.surface.live_texture_count(), 0);
    assert_eq!(desk.surface.released_targets().len(), 1);
    assert_eq!(desk.surface.released_textures().len(), 1);
}

#[test]
fn closing_a_parent_closes_its_children() {
    let mut desk = Desk::new();
    let parent = desk
        .runtime
        .open_window(window("Project", 100.0, 100.0, 400.0, 300.0))
        .expect("parent");
    let child = desk
        .runtime
        .open_window(window("Find", 600.0, 100.0, 200.0, 150.0).child_of(parent))
        .expect("child");
    desk.settle();

    desk.runtime.close_window(parent).expect("close");
    desk.settle();
    assert!(!desk.runtime.tree().contains(parent));
    assert!(!desk.runtime.tree().contains(child));
    assert_eq!(desk.surface.live_target_count(), 0);
}

#[test]
fn step_sequence_pages_forward_and_finishes_by_closing() {
    use desktop_runtime::{Element, PanelStyle, StepOutcome};

    let mut desk = Desk::new();
    let id = desk
        .runtime
        .open_window(window("Setup", 200.0, 150.0, 300.0, 200.0))
        .expect("open");
    let pages: Vec<_> = (0..2)
        .map(|_| {
            let page = desk.runtime.create_element(
                Element::panel(PanelStyle::default())
                    .with_bounds(WindowRect::new(0.0, 0.0, 300.0, 172.0)),
            );
            desk.runtime.add_child(id, page).expect("page");
            page
        })
        .collect();
    desk.runtime.set_step_sequence(id, pages.clone()).expect("steps");
    let visible = |desk: &Desk, page| desk.runtime.element(page).expect("page").visible;
    assert!(visible(&desk, pages[0]) && !visible(&desk, pages[1]));

    assert_eq!(desk.runtime.step_next(id).expect("next"), StepOutcome::Moved(1));
    assert!(!visible(&desk, pages[0]) && visible(&desk, pages[1]));
    assert_eq!(desk.runtime.step_back(id).expect("back"), StepOutcome::Moved(0));
    desk.runtime.step_next(id).expect("next");

    assert_eq!(desk.runtime.step_next(id).expect("finish"), StepOutcome::Finished);
    desk.settle();
    assert!(!desk.runtime.tree().contains(id));
}

/// Counts saves so the debounce is observable.
struct CountingHook {
    inner: PrefsLayoutHook<MemoryPrefsStore>,
    saves: Cell<usize>,
}

impl WindowLayoutHook for CountingHook {
    fn load_layout(&self, app_id: &ApplicationId) -> Result<Option<WindowLayout>, HostError> {
        self.inner.load_layout(app_id)
    }

    fn save_layout(&self, app_id: &ApplicationId, layout: &WindowLayout) -> Result<(), HostError> {
        self.saves.set(self.saves.get() + 1);
        self.inner.save_layout(app_id, layout)
    }
}

#[test]
fn layout_is_saved_on_release_and_reused_on_reopen() {
    let mut desk = Desk::new();
    let hook = Rc::new(CountingHook {
        inner: PrefsLayoutHook::new(MemoryPrefsStore::default()),
        saves: Cell::new(0),
    });
    desk.runtime.set_layout_hook(Some(hook.clone()));
    let app = ApplicationId::new("system.notepad").expect("app id");
    let id = desk
        .runtime
        .open_window(window("Notepad", 200.0, 150.0, 300.0, 200.0).with_app_id(app.clone()))
        .expect("open");

    desk.hover(Vec2::new(250.0, 160.0));
    desk.press(Vec2::new(250.0, 160.0));
    desk.press(Vec2::new(300.0, 200.0));
    desk.press(Vec2::new(350.0, 260.0));
    assert_eq!(hook.saves.get(), 0);
    desk.hover(Vec2::new(350.0, 260.0));
    assert_eq!(hook.saves.get(), 1);

    desk.runtime.terminate(id).expect("terminate");
    let reopened = desk
        .runtime
        .open_window(WindowSpec::new("Notepad").with_app_id(app))
        .expect("reopen");
    assert_eq!(desk.bounds(reopened), WindowRect::new(300.0, 250.0, 300.0, 200.0));
}

#[test]
fn undersized_and_non_finite_rects_are_clamped() {
    let mut desk = Desk::new();
    let tiny = desk
        .runtime
        .open_window(window("Tiny", 10.0, 10.0, 5.0, -20.0))
        .expect("tiny");
    assert_eq!(desk.bounds(tiny).size(), Vec2::new(100.0, 100.0));

    let broken = desk
        .runtime
        .open_window(window("Broken", f32::NAN, 0.0, 300.0, 200.0))
        .expect("broken");
    assert!(desk.bounds(broken).position().is_finite());
}
