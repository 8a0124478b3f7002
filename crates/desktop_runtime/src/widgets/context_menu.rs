//! Context-menu overlay with delayed submenus.
//!
//! A submenu opens once its entry has been hovered for the open delay. It closes only after the
//! pointer has been away from both the entry and the submenu for the close delay, so crossing the
//! gap between the two panels does not flicker.

use desktop_window_contract::{MenuItem, MenuItemKind};
use platform_host::{RenderSurface, Vec2, WindowRect};

use crate::model::{ElementId, PointerState};
use crate::theme;

const ITEM_HEIGHT: f32 = 22.0;
const SEPARATOR_HEIGHT: f32 = 8.0;
const PADDING: f32 = 3.0;
const MIN_WIDTH: f32 = 140.0;
const GLYPH_WIDTH: f32 = theme::TEXT_SIZE * 0.55;

/// Frame-counted submenu delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MenuTiming {
    pub open_delay: u32,
    pub close_delay: u32,
}

/// Result of one frame of menu input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MenuOutcome {
    /// Pointer is outside every panel and nothing was pressed.
    Idle,
    /// Pointer is over the menu; input stops here.
    Consumed,
    /// An item was activated; the menu should close.
    Activated(MenuItem),
    /// A press landed outside the menu; the menu should close.
    Dismissed,
}

#[derive(Debug, Clone, PartialEq)]
struct MenuPanel {
    items: Vec<MenuItem>,
    bounds: WindowRect,
    hovered: Option<usize>,
    hover_frames: u32,
    submenu: Option<(usize, Box<MenuPanel>)>,
    away_frames: u32,
}

impl MenuPanel {
    fn new(items: Vec<MenuItem>, anchor: Vec2, screen: WindowRect) -> Self {
        let width = items
            .iter()
            .map(|item| item.text.chars().count() as f32 * GLYPH_WIDTH + 48.0)
            .fold(MIN_WIDTH, f32::max);
        let height = items.iter().map(row_height).sum::<f32>() + PADDING * 2.0;
        let mut origin = anchor;
        if origin.x + width > screen.right() {
            origin.x = (screen.right() - width).max(screen.x);
        }
        if origin.y + height > screen.bottom() {
            origin.y = (screen.bottom() - height).max(screen.y);
        }
        Self {
            items,
            bounds: WindowRect::from_pos_size(origin, Vec2::new(width, height)),
            hovered: None,
            hover_frames: 0,
            submenu: None,
            away_frames: 0,
        }
    }

    fn row_rect(&self, index: usize) -> WindowRect {
        let top = self.items[..index].iter().map(row_height).sum::<f32>();
        WindowRect::new(
            self.bounds.x + PADDING,
            self.bounds.y + PADDING + top,
            self.bounds.w - PADDING * 2.0,
            row_height(&self.items[index]),
        )
    }

    fn item_at(&self, point: Vec2) -> Option<usize> {
        if !self.bounds.contains(point) {
            return None;
        }
        (0..self.items.len())
            .find(|index| self.row_rect(*index).contains(point))
            .filter(|index| !self.items[*index].is_separator())
    }

    fn contains_tree(&self, point: Vec2) -> bool {
        self.bounds.contains(point)
            || self
                .submenu
                .as_ref()
                .is_some_and(|(_, child)| child.contains_tree(point))
    }

    fn open_submenu(&mut self, index: usize, screen: WindowRect) {
        let MenuItemKind::Submenu(children) = &self.items[index].kind else {
            return;
        };
        let row = self.row_rect(index);
        let anchor = Vec2::new(self.bounds.right(), row.y);
        let mut child = MenuPanel::new(children.clone(), anchor, screen);
        if child.bounds.x < self.bounds.right() {
            child.bounds.x = (self.bounds.x - child.bounds.w).max(screen.x);
        }
        self.submenu = Some((index, Box::new(child)));
        self.away_frames = 0;
    }

    fn update(
        &mut self,
        pointer: &PointerState,
        timing: MenuTiming,
        screen: WindowRect,
    ) -> MenuOutcome {
        let position = pointer.position;
        if let Some((_, child)) = self.submenu.as_mut() {
            if child.contains_tree(position) {
                self.away_frames = 0;
                return child.update(pointer, timing, screen);
            }
        }

        let hovered = self.item_at(position);
        if hovered == self.hovered {
            self.hover_frames = self.hover_frames.saturating_add(1);
        } else {
            self.hovered = hovered;
            self.hover_frames = 0;
        }

        if let Some(open_index) = self.submenu.as_ref().map(|(index, _)| *index) {
            if hovered == Some(open_index) {
                self.away_frames = 0;
            } else {
                self.away_frames += 1;
                if self.away_frames >= timing.close_delay {
                    self.submenu = None;
                    self.away_frames = 0;
                }
            }
        }

        if let Some(index) = hovered {
            let item = &self.items[index];
            let is_submenu = matches!(item.kind, MenuItemKind::Submenu(_));
            if item.enabled && is_submenu {
                let rested = self.hover_frames >= timing.open_delay;
                if self.submenu.is_none() && (rested || pointer.primary_released) {
                    self.open_submenu(index, screen);
                }
            } else if item.enabled && pointer.primary_released {
                return MenuOutcome::Activated(item.clone());
            }
        }

        if self.bounds.contains(position) {
            MenuOutcome::Consumed
        } else {
            MenuOutcome::Idle
        }
    }

    fn draw(&self, surface: &mut dyn RenderSurface) {
        surface.fill_rounded_rect(self.bounds, 2.0, theme::WINDOW_FRAME);
        surface.stroke_rounded_rect(self.bounds, 2.0, theme::BORDER_WIDTH, theme::WINDOW_BORDER);
        for (index, item) in self.items.iter().enumerate() {
            let row = self.row_rect(index);
            if item.is_separator() {
                let line = WindowRect::new(row.x + 2.0, row.y + row.h / 2.0, row.w - 4.0, 1.0);
                surface.fill_rounded_rect(line, 0.0, theme::WINDOW_BORDER);
                continue;
            }
            let highlighted = self.hovered == Some(index)
                || self.submenu.as_ref().is_some_and(|(open, _)| *open == index);
            let text_color = if !item.enabled {
                theme::TEXT_DISABLED
            } else if highlighted {
                surface.fill_rounded_rect(row, 0.0, theme::HIGHLIGHT);
                theme::HIGHLIGHT_TEXT
            } else {
                theme::TEXT
            };
            let text_y = row.y + (row.h - theme::TEXT_SIZE) / 2.0;
            if let MenuItemKind::Toggle { checked: true } = item.kind {
                let mark = Vec2::new(row.x + 4.0, text_y);
                surface.draw_text("*", mark, theme::TEXT_SIZE, text_color);
            }
            surface.draw_text(
                &item.text,
                Vec2::new(row.x + 20.0, text_y),
                theme::TEXT_SIZE,
                text_color,
            );
            if matches!(item.kind, MenuItemKind::Submenu(_)) {
                surface.draw_text(
                    ">",
                    Vec2::new(row.right() - 12.0, text_y),
                    theme::TEXT_SIZE,
                    text_color,
                );
            }
        }
        if let Some((_, child)) = &self.submenu {
            child.draw(surface);
        }
    }
}

fn row_height(item: &MenuItem) -> f32 {
    if item.is_separator() {
        SEPARATOR_HEIGHT
    } else {
        ITEM_HEIGHT
    }
}

/// An open context menu and the element it was opened on.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    target: Option<ElementId>,
    root: MenuPanel,
}

impl ContextMenu {
    pub(crate) fn open(
        target: Option<ElementId>,
        items: Vec<MenuItem>,
        position: Vec2,
        screen: WindowRect,
    ) -> Self {
        Self {
            target,
            root: MenuPanel::new(items, position, screen),
        }
    }

    /// Element the menu was opened on.
    pub fn target(&self) -> Option<ElementId> {
        self.target
    }

    /// Cleaned top-level items.
    pub fn items(&self) -> &[MenuItem] {
        &self.root.items
    }

    /// Bounds of the top-level panel.
    pub fn bounds(&self) -> WindowRect {
        self.root.bounds
    }

    /// Depth of open submenus below the top-level panel.
    pub fn open_submenu_depth(&self) -> usize {
        let mut depth = 0;
        let mut panel = &self.root;
        while let Some((_, child)) = &panel.submenu {
            depth += 1;
            panel = child;
        }
        depth
    }

    /// Top-left corner of row `index` in the top-level panel.
    pub fn item_rect(&self, index: usize) -> Option<WindowRect> {
        (index < self.root.items.len()).then(|| self.root.row_rect(index))
    }

    /// Returns `true` when `point` is over any open panel.
    pub fn contains(&self, point: Vec2) -> bool {
        self.root.contains_tree(point)
    }

    pub(crate) fn update(
        &mut self,
        pointer: &PointerState,
        timing: MenuTiming,
        screen: WindowRect,
    ) -> MenuOutcome {
        let inside = self.contains(pointer.position);
        match self.root.update(pointer, timing, screen) {
            MenuOutcome::Activated(item) => MenuOutcome::Activated(item),
            _ if inside => MenuOutcome::Consumed,
            _ if pointer.primary_pressed || pointer.secondary_pressed => MenuOutcome::Dismissed,
            _ => MenuOutcome::Idle,
        }
    }

    pub(crate) fn draw(&self, surface: &mut dyn RenderSurface) {
        self.root.draw(surface);
    }
}
