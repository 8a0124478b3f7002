//! Tagged interpolation scheduler.
//!
//! Tweens live in an arena keyed by [`TweenId`] and are indexed by `(element, tag)`. Starting a
//! tween for a key that already has one cancels the old tween; its completion payload is dropped
//! without ever being reported. This is the only cancellation primitive in the runtime.

pub mod easing;

use std::collections::HashMap;

use platform_host::WindowRect;
use slotmap::{new_key_type, SlotMap};

pub use easing::Easing;

use crate::model::ElementId;

new_key_type! {
    /// Arena key of a running tween.
    pub struct TweenId;
}

/// Tag shared by geometry (position + size) tweens.
pub const TAG_GEOMETRY: &str = "window.geometry";
/// Tag shared by opacity tweens.
pub const TAG_OPACITY: &str = "window.opacity";

/// Animated property with its endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenProperty {
    /// Position and size together.
    Rect {
        /// Value at progress 0.
        from: WindowRect,
        /// Value at progress 1.
        to: WindowRect,
    },
    /// Element opacity.
    Opacity {
        /// Value at progress 0.
        from: f32,
        /// Value at progress 1.
        to: f32,
    },
}

impl TweenProperty {
    fn sample(&self, t: f32) -> TweenValue {
        if t >= 1.0 {
            return self.end();
        }
        match *self {
            Self::Rect { from, to } => TweenValue::Rect(from.lerp(to, t)),
            Self::Opacity { from, to } => TweenValue::Opacity(from + (to - from) * t),
        }
    }

    fn end(&self) -> TweenValue {
        match *self {
            Self::Rect { to, .. } => TweenValue::Rect(to),
            Self::Opacity { to, .. } => TweenValue::Opacity(to),
        }
    }
}

/// Interpolated value produced for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenValue {
    /// New position and size.
    Rect(WindowRect),
    /// New opacity.
    Opacity(f32),
}

#[derive(Debug)]
struct Tween<C> {
    target: ElementId,
    tag: &'static str,
    seq: u64,
    property: TweenProperty,
    elapsed: f32,
    duration: f32,
    easing: Easing,
    on_complete: Option<C>,
}

/// Values and completions produced by one [`TweenScheduler::advance`] call.
#[derive(Debug)]
pub struct TweenFrame<C> {
    /// Interpolated values, in start order.
    pub updates: Vec<(ElementId, TweenValue)>,
    /// Completion payloads of tweens that reached their end this frame.
    pub completed: Vec<(ElementId, C)>,
}

/// Arena of running tweens; `C` is the completion payload type.
#[derive(Debug)]
pub struct TweenScheduler<C> {
    tweens: SlotMap<TweenId, Tween<C>>,
    by_key: HashMap<(ElementId, &'static str), TweenId>,
    next_seq: u64,
}

impl<C> Default for TweenScheduler<C> {
    fn default() -> Self {
        Self {
            tweens: SlotMap::with_key(),
            by_key: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<C> TweenScheduler<C> {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a tween, replacing any tween with the same `(target, tag)`.
    ///
    /// A non-positive or non-finite duration completes on the next [`advance`](Self::advance).
    pub fn start(
        &mut self,
        target: ElementId,
        tag: &'static str,
        property: TweenProperty,
        duration: f32,
        easing: Easing,
        on_complete: Option<C>,
    ) -> TweenId {
        self.cancel(target, tag);
        let duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
        self.next_seq += 1;
        let id = self.tweens.insert(Tween {
            target,
            tag,
            seq: self.next_seq,
            property,
            elapsed: 0.0,
            duration,
            easing,
            on_complete,
        });
        self.by_key.insert((target, tag), id);
        id
    }

    /// Cancels the tween for `(target, tag)`. Its completion never fires.
    pub fn cancel(&mut self, target: ElementId, tag: &'static str) -> bool {
        match self.by_key.remove(&(target, tag)) {
            Some(id) => self.tweens.remove(id).is_some(),
            None => false,
        }
    }

    /// Cancels every tween targeting `target`.
    pub fn cancel_all(&mut self, target: ElementId) {
        self.by_key.retain(|(owner, _), _| *owner != target);
        self.tweens.retain(|_, tween| tween.target != target);
    }

    /// Returns `true` while a tween for `(target, tag)` is running.
    pub fn is_running(&self, target: ElementId, tag: &'static str) -> bool {
        self.by_key.contains_key(&(target, tag))
    }

    /// Returns `true` while any tween targets `target`.
    pub fn is_animating(&self, target: ElementId) -> bool {
        self.by_key.keys().any(|(owner, _)| *owner == target)
    }

    /// Number of running tweens.
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    /// Returns `true` when nothing is running.
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Advances every tween by `delta_seconds` and removes the finished ones.
    pub fn advance(&mut self, delta_seconds: f32) -> TweenFrame<C> {
        let delta = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };

        let mut order: Vec<(u64, TweenId)> =
            self.tweens.iter().map(|(id, tween)| (tween.seq, id)).collect();
        order.sort_unstable_by_key(|(seq, _)| *seq);

        let mut frame = TweenFrame {
            updates: Vec::with_capacity(order.len()),
            completed: Vec::new(),
        };
        for (_, id) in order {
            let Some(tween) = self.tweens.get_mut(id) else {
                continue;
            };
            tween.elapsed += delta;
            let progress = if tween.duration <= 0.0 {
                1.0
            } else {
                (tween.elapsed / tween.duration).min(1.0)
            };
            frame.updates.push((
                tween.target,
                tween.property.sample(tween.easing.apply(progress)),
            ));
            if progress >= 1.0 {
                if let Some(done) = self.tweens.remove(id) {
                    self.by_key.remove(&(done.target, done.tag));
                    if let Some(payload) = done.on_complete {
                        frame.completed.push((done.target, payload));
                    }
                }
            }
        }
        frame
    }
}
