//! Windowing and input-routing core of the desktop: the element tree, hit-testing, the window
//! state machine, z-order and focus, drag-and-drop orchestration, context menus, the tween
//! scheduler, and the taskbar.
//!
//! [`DesktopRuntime`] owns all of it. Hosts feed it one [`FrameInput`] per frame through
//! [`DesktopRuntime::update`] and draw it with [`DesktopRuntime::render`].

pub mod actions;
pub mod config;
pub mod drag_drop;
pub mod element;
pub mod error;
pub mod menu;
pub mod model;
pub mod observers;
pub mod persistence;
pub mod runtime;
pub mod taskbar;
pub mod theme;
pub mod tree;
pub mod tween;
pub mod widgets;
pub mod window;
pub mod window_manager;

pub use actions::{ActionSender, PendingAction};
pub use config::DesktopConfig;
pub use drag_drop::DragSession;
pub use element::{Element, ElementKind, Tooltip};
pub use error::{DesktopError, DesktopResult};
pub use model::*;
pub use observers::{ElementEvent, SubscriptionId};
pub use runtime::DesktopRuntime;
pub use taskbar::{Taskbar, TaskbarCommand};
pub use tree::ElementTree;
pub use tween::{Easing, TweenScheduler};
pub use widgets::context_menu::ContextMenu;
pub use widgets::label::Label;
pub use widgets::panel::PanelStyle;
pub use widgets::{Widget, WidgetContext, WidgetDrawContext};
pub use window::{
    BorderlessChrome, ChromeButton, CloseVerdict, StandardChrome, StepOutcome, StepSequence,
    WindowChrome, WindowFlags, WindowSpec, WindowState,
};
pub use window_manager::FocusState;
