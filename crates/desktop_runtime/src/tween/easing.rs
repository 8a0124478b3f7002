//! Easing curves applied to tween progress.

use serde::{Deserialize, Serialize};

/// Easing curve selector stored with each tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Cubic acceleration then deceleration.
    #[default]
    EaseInOut,
    /// Cubic deceleration.
    EaseOutCubic,
    /// Cubic acceleration.
    EaseInCubic,
}

impl Easing {
    /// Maps linear progress `t` (clamped to `[0, 1]`) through the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => linear(t),
            Self::EaseInOut => ease_in_out(t),
            Self::EaseOutCubic => ease_out_cubic(t),
            Self::EaseInCubic => ease_in_cubic(t),
        }
    }
}

#[inline]
fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[inline]
fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

#[inline]
fn ease_in_cubic(t: f32) -> f32 {
    t * t * t
}

#[inline]
fn linear(t: f32) -> f32 {
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::EaseInOut,
        Easing::EaseOutCubic,
        Easing::EaseInCubic,
    ];

    #[test]
    fn ease_in_out_is_symmetric_around_the_midpoint() {
        assert!((Easing::EaseInOut.apply(0.5) - 0.5).abs() < 0.001);
        let a = Easing::EaseInOut.apply(0.25);
        let b = Easing::EaseInOut.apply(0.75);
        assert!((a + b - 1.0).abs() < 0.001);
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        for easing in ALL {
            assert_eq!(easing.apply(-4.0), 0.0);
            assert_eq!(easing.apply(9.0), 1.0);
            assert_eq!(easing.apply(f32::NAN), 1.0);
        }
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn easing_output_stays_in_unit_range(t in 0.0f32..=1.0) {
                for easing in ALL {
                    let value = easing.apply(t);
                    prop_assert!((0.0..=1.0).contains(&value), "{:?}({}) = {}", easing, t, value);
                }
            }

            #[test]
            fn easing_is_monotonic(t1 in 0.0f32..=1.0, t2 in 0.0f32..=1.0) {
                let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
                for easing in ALL {
                    prop_assert!(
                        easing.apply(lo) <= easing.apply(hi) + 0.001,
                        "{:?} not monotonic between {} and {}", easing, lo, hi
                    );
                }
            }
        }
    }
}
