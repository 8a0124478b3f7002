use desktop_window_contract::WindowRuntimeId;
use platform_host::{Vec2, WindowRect};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, Key};

new_key_type! {
    /// Arena key of an element in the scene graph.
    ///
    /// Keys are never reused while an element is alive; a key whose element was removed simply
    /// stops resolving.
    pub struct ElementId;
}

impl ElementId {
    /// Stable numeric form handed to collaborators.
    pub fn runtime_id(self) -> WindowRuntimeId {
        self.data().as_ffi()
    }
}

/// Raw input sampled by the host once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Pointer position in desktop units.
    pub pointer: Vec2,
    /// Primary (left) button held.
    pub primary_down: bool,
    /// Secondary (right) button held.
    pub secondary_down: bool,
    /// Seconds since the previous frame.
    pub delta_seconds: f32,
}

impl FrameInput {
    /// Input with the pointer at `pointer`, no buttons held, and a 60 Hz frame delta.
    pub fn at(pointer: Vec2) -> Self {
        Self {
            pointer,
            primary_down: false,
            secondary_down: false,
            delta_seconds: 1.0 / 60.0,
        }
    }

    /// Same input with the primary button held.
    pub fn primary(mut self) -> Self {
        self.primary_down = true;
        self
    }

    /// Same input with the secondary button held.
    pub fn secondary(mut self) -> Self {
        self.secondary_down = true;
        self
    }

    /// Same input with a custom frame delta.
    pub fn with_delta(mut self, delta_seconds: f32) -> Self {
        self.delta_seconds = delta_seconds;
        self
    }
}

/// Pointer state with press/release edges derived from consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    /// Current position.
    pub position: Vec2,
    /// Position on the previous frame.
    pub previous: Vec2,
    /// Primary button held this frame.
    pub primary_down: bool,
    /// Primary button went down this frame.
    pub primary_pressed: bool,
    /// Primary button went up this frame.
    pub primary_released: bool,
    /// Secondary button held this frame.
    pub secondary_down: bool,
    /// Secondary button went down this frame.
    pub secondary_pressed: bool,
}

impl PointerState {
    /// Derives the next pointer state from this frame's raw input.
    pub fn advance(&self, input: &FrameInput) -> Self {
        let position = if input.pointer.is_finite() {
            input.pointer
        } else {
            self.position
        };
        Self {
            position,
            previous: self.position,
            primary_down: input.primary_down,
            primary_pressed: input.primary_down && !self.primary_down,
            primary_released: !input.primary_down && self.primary_down,
            secondary_down: input.secondary_down,
            secondary_pressed: input.secondary_down && !self.secondary_down,
        }
    }
}

/// One of the eight resize zones around a window frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeEdge {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeEdge {
    /// Edge drags the left side.
    pub fn moves_left(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    /// Edge drags the right side.
    pub fn moves_right(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    /// Edge drags the top side.
    pub fn moves_top(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    /// Edge drags the bottom side.
    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }

    pub(crate) fn from_sides(left: bool, right: bool, top: bool, bottom: bool) -> Option<Self> {
        match (left, right, top, bottom) {
            (true, _, true, _) => Some(Self::NorthWest),
            (true, _, _, true) => Some(Self::SouthWest),
            (_, true, true, _) => Some(Self::NorthEast),
            (_, true, _, true) => Some(Self::SouthEast),
            (true, _, _, _) => Some(Self::West),
            (_, true, _, _) => Some(Self::East),
            (_, _, true, _) => Some(Self::North),
            (_, _, _, true) => Some(Self::South),
            _ => None,
        }
    }
}

/// Window state-machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowMode {
    Normal,
    Dragging,
    Resizing,
    Minimized,
    Maximized,
    Closing,
}

/// Edge-snap destinations previewed while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapTarget {
    /// Full work area (top edge).
    Maximize,
    /// Left half of the work area.
    LeftHalf,
    /// Right half of the work area.
    RightHalf,
}

impl SnapTarget {
    /// Rectangle the window snaps into, inside `work_area`.
    pub fn rect(self, work_area: WindowRect) -> WindowRect {
        let half = (work_area.w / 2.0).floor();
        match self {
            Self::Maximize => work_area,
            Self::LeftHalf => WindowRect::new(work_area.x, work_area.y, half, work_area.h),
            Self::RightHalf => WindowRect::new(
                work_area.right() - half,
                work_area.y,
                half,
                work_area.h,
            ),
        }
    }
}
