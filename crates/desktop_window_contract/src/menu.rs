//! Context-menu items and providers.

use platform_host::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a context-menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MenuItemKind {
    /// Regular clickable entry.
    Action,
    /// Clickable entry with a check mark.
    Toggle {
        /// Current check state.
        checked: bool,
    },
    /// Entry that opens a nested menu.
    Submenu(Vec<MenuItem>),
    /// Visual divider.
    Separator,
}

impl MenuItemKind {
    /// Discriminant used when de-duplicating items.
    pub fn type_token(&self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Toggle { .. } => "toggle",
            Self::Submenu(_) => "submenu",
            Self::Separator => "separator",
        }
    }
}

/// A single context-menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Display text.
    pub text: String,
    /// Action identifier delivered when the item is activated.
    pub action: Option<String>,
    /// Entry kind.
    pub kind: MenuItemKind,
    /// Higher priorities sort first.
    pub priority: i32,
    /// Disabled entries render dimmed and cannot be activated.
    pub enabled: bool,
}

impl MenuItem {
    /// Creates an enabled action entry with priority 0.
    pub fn action(text: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: Some(action.into()),
            kind: MenuItemKind::Action,
            priority: 0,
            enabled: true,
        }
    }

    /// Creates a separator.
    pub fn separator() -> Self {
        Self {
            text: String::new(),
            action: None,
            kind: MenuItemKind::Separator,
            priority: 0,
            enabled: true,
        }
    }

    /// Creates a submenu entry.
    pub fn submenu(text: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            text: text.into(),
            action: None,
            kind: MenuItemKind::Submenu(items),
            priority: 0,
            enabled: true,
        }
    }

    /// Creates a toggle entry.
    pub fn toggle(text: impl Into<String>, action: impl Into<String>, checked: bool) -> Self {
        Self {
            kind: MenuItemKind::Toggle { checked },
            ..Self::action(text, action)
        }
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Marks the entry disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Returns `true` for separators.
    pub fn is_separator(&self) -> bool {
        matches!(self.kind, MenuItemKind::Separator)
    }
}

/// What a global provider knows about the right-click.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuRequest {
    /// Pointer position of the request.
    pub position: Vec2,
    /// Opaque tag of the clicked element, when it has one.
    pub target_tag: Option<Value>,
    /// Title of the window containing the clicked element, when there is one.
    pub window_title: Option<String>,
}

/// Global source of context-menu items, consulted for every menu.
pub trait ContextMenuProvider {
    /// Items to append for `request`.
    fn menu_items(&self, request: &MenuRequest) -> Vec<MenuItem>;
}
