mod support;

use std::cell::RefCell;
use std::rc::Rc;

use desktop_runtime::{Element, Widget, WidgetContext, WidgetDrawContext, WindowSpec};
use desktop_window_contract::{ContentError, DragDropService, DragEffect, DragPayload, DropTarget};
use platform_host::{RenderSurface, Vec2, WindowRect};
use pretty_assertions::assert_eq;
use serde_json::json;

use support::Desk;

fn report() -> DragPayload {
    DragPayload::new("vfs.entries", json!({ "label": "report.txt" }))
}

/// Starts a drag with its payload when pressed.
struct Source {
    payload: DragPayload,
}

impl Widget for Source {
    fn update(&mut self, ctx: &mut WidgetContext<'_>) -> Result<(), ContentError> {
        if ctx.has_input && ctx.pointer.primary_pressed {
            let grab = ctx.local_pointer();
            ctx.begin_drag(self.payload.clone(), grab);
        }
        Ok(())
    }

    fn draw(
        &self,
        _ctx: &WidgetDrawContext,
        _surface: &mut dyn RenderSurface,
    ) -> Result<(), ContentError> {
        Ok(())
    }
}

/// Accepts one payload kind and records what it received.
struct Bin {
    accepts: &'static str,
    claims: bool,
    received: Rc<RefCell<Vec<String>>>,
}

impl DropTarget for Bin {
    fn can_accept_drop(&self, payload: &DragPayload) -> bool {
        payload.kind == self.accepts
    }

    fn on_drag_over(&mut self, _payload: &DragPayload, _position: Vec2) -> DragEffect {
        DragEffect::Move
    }

    fn on_drop(&mut self, payload: &DragPayload, _position: Vec2) -> bool {
        self.received.borrow_mut().push(payload.label().to_string());
        self.claims
    }
}

impl Widget for Bin {
    fn draw(
        &self,
        _ctx: &WidgetDrawContext,
        _surface: &mut dyn RenderSurface,
    ) -> Result<(), ContentError> {
        Ok(())
    }

    fn drop_target(&mut self) -> Option<&mut dyn DropTarget> {
        Some(self)
    }
}

fn files() -> WindowSpec {
    WindowSpec::new("Files").with_rect(WindowRect::new(200.0, 150.0, 300.0, 200.0))
}

fn desk_with_bin(accepts: &'static str, claims: bool) -> (Desk, Rc<RefCell<Vec<String>>>) {
    let mut desk = Desk::new();
    let layer = desk.runtime.desktop_layer();
    let source = desk.runtime.create_element(
        Element::custom(Source { payload: report() })
            .with_bounds(WindowRect::new(100.0, 100.0, 50.0, 50.0))
            .consuming(true),
    );
    desk.runtime.add_child(layer, source).expect("source");
    let received = Rc::new(RefCell::new(Vec::new()));
    let bin = desk.runtime.create_element(
        Element::custom(Bin {
            accepts,
            claims,
            received: Rc::clone(&received),
        })
        .with_bounds(WindowRect::new(400.0, 100.0, 100.0, 100.0))
        .consuming(true),
    );
    desk.runtime.add_child(layer, bin).expect("bin");
    (desk, received)
}

#[test]
fn accepted_drop_ends_the_session() {
    let (mut desk, received) = desk_with_bin("vfs.entries", true);

    desk.hover(Vec2::new(120.0, 120.0));
    desk.press(Vec2::new(120.0, 120.0));
    assert!(desk.runtime.drag_session().is_active());
    assert_eq!(
        desk.runtime.drag_session().drag_grab_offset(),
        Some(Vec2::new(20.0, 20.0))
    );

    desk.surface.clear_commands();
    desk.press(Vec2::new(450.0, 150.0));
    assert_eq!(desk.runtime.drag_session().current_effect(), DragEffect::Move);
    assert!(desk.surface.texts().contains(&"report.txt"));

    desk.hover(Vec2::new(450.0, 150.0));
    assert!(!desk.runtime.drag_session().is_active());
    assert!(!desk.runtime.drag_session().is_snapping_back());
    assert_eq!(*received.borrow(), vec!["report.txt".to_string()]);
}

#[test]
fn rejected_drop_snaps_back() {
    let (mut desk, received) = desk_with_bin("vfs.entries", false);

    desk.hover(Vec2::new(120.0, 120.0));
    desk.press(Vec2::new(120.0, 120.0));
    desk.press(Vec2::new(450.0, 150.0));
    desk.hover(Vec2::new(450.0, 150.0));

    assert_eq!(received.borrow().len(), 1);
    assert!(!desk.runtime.drag_session().is_active());
    assert!(desk.runtime.drag_session().is_snapping_back());
    desk.settle();
    assert!(!desk.runtime.drag_session().is_snapping_back());
}

#[test]
fn incompatible_target_shows_no_effect_and_is_never_offered_the_drop() {
    let (mut desk, received) = desk_with_bin("mail.messages", true);

    desk.hover(Vec2::new(120.0, 120.0));
    desk.press(Vec2::new(120.0, 120.0));
    desk.press(Vec2::new(450.0, 150.0));
    assert_eq!(desk.runtime.drag_session().current_effect(), DragEffect::None);
    desk.hover(Vec2::new(450.0, 150.0));

    assert!(received.borrow().is_empty());
    assert!(!desk.runtime.drag_session().is_active());
}

#[test]
fn release_over_nothing_cancels_within_one_frame() {
    let mut desk = Desk::new();
    desk.hover(Vec2::new(600.0, 400.0));
    desk.press(Vec2::new(600.0, 400.0));
    assert!(desk
        .runtime
        .begin_drag(report(), Vec2::new(600.0, 400.0), Vec2::ZERO));
    assert!(!desk
        .runtime
        .begin_drag(report(), Vec2::new(600.0, 400.0), Vec2::ZERO));

    desk.press(Vec2::new(700.0, 450.0));
    assert!(desk.runtime.drag_session().is_active());

    desk.hover(Vec2::new(700.0, 450.0));
    assert!(!desk.runtime.drag_session().is_active());
}

#[test]
fn window_drag_commits_before_the_watchdog_cancels() {
    let mut desk = Desk::new();
    let id = desk
        .runtime
        .open_window(files())
        .expect("open");

    desk.hover(Vec2::new(250.0, 160.0));
    desk.press(Vec2::new(250.0, 160.0));
    // A collaborator starts a session while the title bar is held.
    desk.runtime.begin_drag(report(), Vec2::new(250.0, 160.0), Vec2::ZERO);
    desk.press(Vec2::new(350.0, 260.0));
    desk.hover(Vec2::new(350.0, 260.0));

    let state = desk.runtime.window(id).expect("window");
    assert_eq!(state.restore_rect(), WindowRect::new(300.0, 250.0, 300.0, 200.0));
    assert_eq!(desk.bounds(id).position(), Vec2::new(300.0, 250.0));
    assert!(!desk.runtime.drag_session().is_active());
}

#[test]
fn group_positions_are_kept_until_the_session_ends() {
    let mut desk = Desk::new();
    desk.press(Vec2::new(10.0, 10.0));
    desk.runtime.begin_drag(report(), Vec2::new(10.0, 10.0), Vec2::ZERO);
    let session = desk.runtime.drag_session_mut();
    session.store_custom_position("b.txt", Vec2::new(10.0, 60.0));
    session.set_drop_preview_position("b.txt", Some(Vec2::new(300.0, 300.0)));
    assert_eq!(
        desk.runtime.drag_session().stored_positions().get("b.txt"),
        Some(&Vec2::new(10.0, 60.0))
    );
    assert_eq!(desk.runtime.drag_session().drop_previews().len(), 1);

    desk.hover(Vec2::new(10.0, 10.0));
    assert!(desk.runtime.drag_session().stored_positions().is_empty());
    assert!(desk.runtime.drag_session().drop_previews().is_empty());
}
