//! Pure geometry helpers behind window drag, resize, snap, and minimize transitions.

use platform_host::{Vec2, WindowRect};

use crate::model::{ResizeEdge, SnapTarget};

/// Fraction of a window's size it shrinks to when it reaches its minimize anchor.
const MINIMIZE_SCALE: f32 = 0.1;

/// Applies a pointer delta to `start` for the given resize edge.
///
/// Sizes are clamped to `min` per axis. For left and top edges the position moves by the
/// *actual* size change, so the opposite edge stays fixed even when the clamp kicks in.
pub fn resize_rect(start: WindowRect, edge: ResizeEdge, delta: Vec2, min: Vec2) -> WindowRect {
    let mut w = start.w;
    let mut h = start.h;
    if edge.moves_right() {
        w = start.w + delta.x;
    } else if edge.moves_left() {
        w = start.w - delta.x;
    }
    if edge.moves_bottom() {
        h = start.h + delta.y;
    } else if edge.moves_top() {
        h = start.h - delta.y;
    }

    let sized = WindowRect { w, h, ..start }.clamped_min(min.x, min.y);
    let x = if edge.moves_left() {
        start.x + (start.w - sized.w)
    } else {
        start.x
    };
    let y = if edge.moves_top() {
        start.y + (start.h - sized.h)
    } else {
        start.y
    };
    WindowRect { x, y, ..sized }
}

/// Resize zone under `local` (window-local coordinates), if it lies within `margin` of an edge.
pub fn resize_edge_at(local: Vec2, size: Vec2, margin: f32) -> Option<ResizeEdge> {
    if margin <= 0.0 {
        return None;
    }
    ResizeEdge::from_sides(
        local.x < margin,
        local.x >= size.x - margin,
        local.y < margin,
        local.y >= size.y - margin,
    )
}

/// Snap destination previewed for a drag pointer at `pointer`.
///
/// The top edge wins over the sides so a pointer in a top corner maximizes.
pub fn snap_target_at(
    pointer: Vec2,
    work_area: WindowRect,
    distance: f32,
    can_maximize: bool,
    can_resize: bool,
) -> Option<SnapTarget> {
    if can_maximize && pointer.y <= work_area.y + distance {
        return Some(SnapTarget::Maximize);
    }
    if !can_resize {
        return None;
    }
    if pointer.x <= work_area.x + distance {
        Some(SnapTarget::LeftHalf)
    } else if pointer.x >= work_area.right() - distance {
        Some(SnapTarget::RightHalf)
    } else {
        None
    }
}

/// Origin for a maximized window popped back to `restore_size` under the pointer.
///
/// The relative x-fraction of the pointer across the title bar is preserved, as is the
/// pointer's vertical offset from the window top.
pub fn drag_restore_origin(pointer: Vec2, maximized: WindowRect, restore_size: Vec2) -> Vec2 {
    let fraction = if maximized.w > 0.0 {
        ((pointer.x - maximized.x) / maximized.w).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let grab_y = (pointer.y - maximized.y).max(0.0);
    Vec2::new(
        pointer.x - fraction * restore_size.x,
        pointer.y - grab_y,
    )
}

/// Small rectangle centred on `anchor` that a minimizing window shrinks into.
pub fn minimize_rect(anchor: Vec2, size: Vec2) -> WindowRect {
    let shrunk = size * MINIMIZE_SCALE;
    WindowRect::from_pos_size(anchor - shrunk * 0.5, shrunk)
}

/// Default rectangle for the `index`-th opened window, cascading down and to the right.
pub fn cascade_rect(index: usize, work_area: WindowRect, size: Vec2) -> WindowRect {
    let step = 24.0 * (index % 8) as f32;
    let w = size.x.min(work_area.w);
    let h = size.y.min(work_area.h);
    WindowRect::new(work_area.x + 40.0 + step, work_area.y + 40.0 + step, w, h)
}
