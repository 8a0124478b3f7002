//! The window manager's single drag-and-drop session.
//!
//! A cancelled session keeps drawing a ghost that eases back to the source position (and to
//! every stored group position) for the configured snap-back duration.

use std::collections::{BTreeMap, HashMap};

use desktop_window_contract::{DragDropService, DragEffect, DragPayload};
use platform_host::{Color, FrameTime, RenderSurface, Vec2, WindowRect};
use tracing::debug;

use crate::theme;
use crate::tween::Easing;

const LABEL_PADDING: Vec2 = Vec2::new(8.0, 4.0);

#[derive(Debug, Clone, PartialEq)]
struct ActiveDrag {
    payload: DragPayload,
    source: Vec2,
    grab_offset: Vec2,
    effect: DragEffect,
}

#[derive(Debug, Clone, PartialEq)]
struct SnapBack {
    label: String,
    /// Ghost start and end positions; the payload itself is first.
    paths: Vec<(Vec2, Vec2)>,
    elapsed: f32,
    duration: f32,
}

impl SnapBack {
    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Concrete [`DragDropService`] owned by a [`DesktopRuntime`](crate::DesktopRuntime).
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    active: Option<ActiveDrag>,
    pointer: Vec2,
    stored_positions: HashMap<String, Vec2>,
    previews: BTreeMap<String, Vec2>,
    snap_back: Option<SnapBack>,
    snap_back_duration: f32,
}

impl DragSession {
    pub fn new(snap_back_duration: f32) -> Self {
        Self {
            active: None,
            pointer: Vec2::ZERO,
            stored_positions: HashMap::new(),
            previews: BTreeMap::new(),
            snap_back: None,
            snap_back_duration,
        }
    }

    /// Current pointer position tracked by the session.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Ghost previews set by drop targets, keyed by item id.
    pub fn drop_previews(&self) -> &BTreeMap<String, Vec2> {
        &self.previews
    }

    fn clear(&mut self) {
        self.active = None;
        self.stored_positions.clear();
        self.previews.clear();
    }
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new(0.3)
    }
}

fn effect_tint(effect: DragEffect) -> Color {
    match effect {
        DragEffect::None => theme::DRAG_NONE,
        DragEffect::Copy => theme::DRAG_COPY,
        DragEffect::Move => theme::DRAG_MOVE,
        DragEffect::Link => theme::DRAG_LINK,
    }
}

fn draw_label(
    surface: &mut dyn RenderSurface,
    label: &str,
    origin: Vec2,
    fill: Color,
    opacity: f32,
) {
    let text = surface.measure_text(label, theme::TEXT_SIZE);
    let rect = WindowRect::from_pos_size(origin, text + LABEL_PADDING * 2.0);
    surface.fill_rounded_rect(rect, theme::CORNER_RADIUS, fill.with_opacity(opacity));
    surface.stroke_rounded_rect(
        rect,
        theme::CORNER_RADIUS,
        theme::BORDER_WIDTH,
        theme::WINDOW_BORDER.with_opacity(opacity),
    );
    surface.draw_text(
        label,
        origin + LABEL_PADDING,
        theme::TEXT_SIZE,
        theme::TEXT.with_opacity(opacity),
    );
}

impl DragDropService for DragSession {
    fn begin_drag(
        &mut self,
        payload: DragPayload,
        source_position: Vec2,
        grab_offset: Vec2,
    ) -> bool {
        if self.active.is_some() {
            debug!(kind = %payload.kind, "drag already active; begin ignored");
            return false;
        }
        debug!(kind = %payload.kind, x = source_position.x, y = source_position.y, "drag begin");
        self.clear();
        self.snap_back = None;
        self.pointer = source_position + grab_offset;
        self.active = Some(ActiveDrag {
            payload,
            source: source_position,
            grab_offset,
            effect: DragEffect::None,
        });
        true
    }

    fn end_drag(&mut self) {
        if let Some(active) = &self.active {
            debug!(kind = %active.payload.kind, effect = ?active.effect, "drag committed");
        }
        self.clear();
    }

    fn cancel_drag(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        debug!(kind = %active.payload.kind, "drag cancelled; snapping back");
        let mut paths = vec![(self.pointer - active.grab_offset, active.source)];
        let mut stored: Vec<(&String, &Vec2)> = self.stored_positions.iter().collect();
        stored.sort_by(|a, b| a.0.cmp(b.0));
        paths.extend(
            stored
                .into_iter()
                .map(|(_, origin)| (self.pointer - active.grab_offset, *origin)),
        );
        self.snap_back = Some(SnapBack {
            label: active.payload.label().to_string(),
            paths,
            elapsed: 0.0,
            duration: self.snap_back_duration,
        });
        self.clear();
    }

    fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn drag_data(&self) -> Option<&DragPayload> {
        self.active.as_ref().map(|active| &active.payload)
    }

    fn current_effect(&self) -> DragEffect {
        self.active
            .as_ref()
            .map(|active| active.effect)
            .unwrap_or_default()
    }

    fn set_current_effect(&mut self, effect: DragEffect) {
        if let Some(active) = &mut self.active {
            active.effect = effect;
        }
    }

    fn drag_source_position(&self) -> Option<Vec2> {
        self.active.as_ref().map(|active| active.source)
    }

    fn drag_grab_offset(&self) -> Option<Vec2> {
        self.active.as_ref().map(|active| active.grab_offset)
    }

    fn store_custom_position(&mut self, key: &str, position: Vec2) {
        if self.active.is_some() {
            self.stored_positions.insert(key.to_string(), position);
        }
    }

    fn stored_positions(&self) -> &HashMap<String, Vec2> {
        &self.stored_positions
    }

    fn set_drop_preview_position(&mut self, id: &str, position: Option<Vec2>) {
        match position {
            Some(position) if self.active.is_some() => {
                self.previews.insert(id.to_string(), position);
            }
            _ => {
                self.previews.remove(id);
            }
        }
    }

    fn update_pointer(&mut self, position: Vec2) {
        if position.is_finite() {
            self.pointer = position;
        }
    }

    fn update(&mut self, time: &FrameTime) {
        let finished = match &mut self.snap_back {
            Some(snap) => {
                snap.elapsed += time.delta_seconds;
                snap.progress() >= 1.0
            }
            None => false,
        };
        if finished {
            self.snap_back = None;
        }
    }

    fn is_snapping_back(&self) -> bool {
        self.snap_back.is_some()
    }

    fn draw(&self, surface: &mut dyn RenderSurface) {
        if let Some(snap) = &self.snap_back {
            let t = Easing::EaseOutCubic.apply(snap.progress());
            let opacity = 1.0 - 0.7 * t;
            for (from, to) in &snap.paths {
                draw_label(surface, &snap.label, from.lerp(*to, t), theme::DRAG_NONE, opacity);
            }
        }

        let Some(active) = &self.active else {
            return;
        };
        for position in self.previews.values() {
            let text = surface.measure_text(active.payload.label(), theme::TEXT_SIZE);
            let ghost = WindowRect::from_pos_size(*position, text + LABEL_PADDING * 2.0);
            surface.stroke_rounded_rect(
                ghost,
                theme::CORNER_RADIUS,
                theme::BORDER_WIDTH,
                theme::DROP_PREVIEW,
            );
        }
        draw_label(
            surface,
            active.payload.label(),
            self.pointer - active.grab_offset,
            effect_tint(active.effect),
            1.0,
        );
    }
}
