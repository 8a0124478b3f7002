//! Context-menu item composition.
//!
//! Items are gathered from the clicked element, each of its ancestors, and the global providers,
//! then cleaned: duplicates removed, separators collapsed, sorted by descending priority.

use std::collections::HashSet;
use std::rc::Rc;

use desktop_window_contract::{ContextMenuProvider, MenuItem, MenuItemKind, MenuRequest};

use crate::element::ElementKind;
use crate::model::ElementId;
use crate::tree::ElementTree;

/// Collects and cleans the items for a menu opened on `target`.
pub fn compose_menu(
    tree: &ElementTree,
    target: Option<ElementId>,
    providers: &[Rc<dyn ContextMenuProvider>],
    request: &MenuRequest,
) -> Vec<MenuItem> {
    let mut items = Vec::new();
    let mut cursor = target;
    while let Some(id) = cursor {
        let Some(element) = tree.get(id) else {
            break;
        };
        items.extend(element.context_items.iter().cloned());
        if let ElementKind::Custom(widget) = &element.kind {
            items.extend(widget.context_menu_items());
        }
        cursor = element.parent();
    }
    for provider in providers {
        items.extend(provider.menu_items(request));
    }
    clean_menu_items(items)
}

/// Removes duplicates, collapses separators, and sorts by descending priority (stable).
///
/// Submenu children are cleaned the same way, recursively.
pub fn clean_menu_items(items: Vec<MenuItem>) -> Vec<MenuItem> {
    let mut seen = HashSet::new();
    let unique: Vec<MenuItem> = items
        .into_iter()
        .filter(|item| {
            item.is_separator()
                || seen.insert((
                    item.text.clone(),
                    item.action.clone(),
                    item.kind.type_token(),
                ))
        })
        .map(|mut item| {
            if let MenuItemKind::Submenu(children) = &mut item.kind {
                *children = clean_menu_items(std::mem::take(children));
            }
            item
        })
        .collect();

    let mut sorted = collapse_separators(unique);
    sorted.sort_by(|a, b| b.priority.cmp(&a.priority));
    collapse_separators(sorted)
}

/// Drops leading, trailing, and consecutive separators.
pub fn collapse_separators(items: Vec<MenuItem>) -> Vec<MenuItem> {
    let mut out: Vec<MenuItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.is_separator() && out.last().map_or(true, MenuItem::is_separator) {
            continue;
        }
        out.push(item);
    }
    if out.last().is_some_and(MenuItem::is_separator) {
        out.pop();
    }
    out
}
