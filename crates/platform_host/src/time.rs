//! Frame clock shared by the runtime scheduler and host adapters.
//!
//! Every delay in the desktop is either frame-counted or derived from the per-frame delta the
//! host reports; nothing reads the wall clock.

/// Timing information for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Monotonic frame number, starting at 1 for the first advanced frame.
    pub frame: u64,
    /// Seconds elapsed since the previous frame.
    pub delta_seconds: f32,
    /// Seconds elapsed since the clock started.
    pub elapsed_seconds: f64,
}

/// Monotonic frame counter driven by host-reported deltas.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    current: FrameTime,
}

impl FrameClock {
    /// Creates a clock at frame 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances one frame. Negative or non-finite deltas count as zero.
    pub fn advance(&mut self, delta_seconds: f32) -> FrameTime {
        let delta = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };
        self.current = FrameTime {
            frame: self.current.frame.saturating_add(1),
            delta_seconds: delta,
            elapsed_seconds: self.current.elapsed_seconds + f64::from(delta),
        };
        self.current
    }

    /// Timing of the most recently advanced frame.
    pub fn now(&self) -> FrameTime {
        self.current
    }

    /// Number of frames since `frame`, saturating at zero.
    pub fn frames_since(&self, frame: u64) -> u64 {
        self.current.frame.saturating_sub(frame)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn advance_accumulates_elapsed_time_and_frames() {
        let mut clock = FrameClock::new();
        clock.advance(0.5);
        let time = clock.advance(0.25);
        assert_eq!(time.frame, 2);
        assert_eq!(time.delta_seconds, 0.25);
        assert_eq!(time.elapsed_seconds, 0.75);
        assert_eq!(clock.frames_since(1), 1);
    }

    #[test]
    fn invalid_deltas_are_treated_as_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(-1.0).delta_seconds, 0.0);
        assert_eq!(clock.advance(f32::NAN).delta_seconds, 0.0);
        assert_eq!(clock.now().elapsed_seconds, 0.0);
    }
}
