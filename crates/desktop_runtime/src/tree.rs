//! Element arena with parent/child links, absolute geometry, and hit-testing.

use platform_host::{Vec2, WindowRect};
use slotmap::SlotMap;

use crate::element::{Element, ElementKind};
use crate::error::{DesktopError, DesktopResult};
use crate::model::ElementId;
use crate::window::{WindowState, WindowZone};

/// Outcome of hit-testing one subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hit {
    /// The point is outside this subtree.
    Miss,
    /// The point is inside; carries the deepest consuming element found so far, if any.
    Inside(Option<ElementId>),
}

/// Owns every element. Elements are created detached and only leave the arena through
/// [`ElementTree::remove_child`].
#[derive(Debug)]
pub struct ElementTree {
    elements: SlotMap<ElementId, Element>,
    root: ElementId,
}

impl ElementTree {
    /// Creates a tree whose root container covers `size`.
    pub fn new(size: Vec2) -> Self {
        let mut elements = SlotMap::with_key();
        let mut root = Element::container();
        root.size = size;
        let root = elements.insert(root);
        Self { elements, root }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Like [`get`](Self::get) but reports a missing element as an error.
    pub fn element(&self, id: ElementId) -> DesktopResult<&Element> {
        self.elements.get(id).ok_or(DesktopError::ElementNotFound(id))
    }

    pub fn element_mut(&mut self, id: ElementId) -> DesktopResult<&mut Element> {
        self.elements
            .get_mut(id)
            .ok_or(DesktopError::ElementNotFound(id))
    }

    pub fn window(&self, id: ElementId) -> Option<&WindowState> {
        self.get(id).and_then(Element::window)
    }

    pub fn window_mut(&mut self, id: ElementId) -> Option<&mut WindowState> {
        self.get_mut(id).and_then(Element::window_mut)
    }

    /// Window state of `id`, or an error when it is missing or not a window.
    pub fn require_window(&self, id: ElementId) -> DesktopResult<&WindowState> {
        self.element(id)?.window().ok_or(DesktopError::NotAWindow(id))
    }

    pub fn require_window_mut(&mut self, id: ElementId) -> DesktopResult<&mut WindowState> {
        self.element_mut(id)?
            .window_mut()
            .ok_or(DesktopError::NotAWindow(id))
    }

    /// Adds a detached element to the arena.
    pub fn insert(&mut self, element: Element) -> ElementId {
        let mut element = element;
        element.parent = None;
        element.children.clear();
        self.elements.insert(element)
    }

    /// Attaches a detached `child` as the topmost child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails when either element is missing, the child already has a parent or is the root, or
    /// the child is an ancestor of `parent`.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> DesktopResult<()> {
        self.element(parent)?;
        let existing = self.element(child)?;
        if child == self.root {
            return Err(DesktopError::RootImmutable(child));
        }
        if existing.parent.is_some() {
            return Err(DesktopError::AlreadyAttached(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(DesktopError::WouldCreateCycle { parent, child });
        }
        self.element_mut(child)?.parent = Some(parent);
        self.element_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detaches `child` from `parent` and removes it and its whole subtree from the arena.
    ///
    /// Returns the removed elements, subtree root first, so the caller can release what they own.
    ///
    /// # Errors
    ///
    /// Fails when either element is missing, `child` is not a child of `parent`, or `child` is the
    /// root.
    pub fn remove_child(
        &mut self,
        parent: ElementId,
        child: ElementId,
    ) -> DesktopResult<Vec<(ElementId, Element)>> {
        if child == self.root {
            return Err(DesktopError::RootImmutable(child));
        }
        if self.element(child)?.parent != Some(parent) {
            return Err(DesktopError::ElementNotFound(child));
        }
        self.element_mut(parent)?.children.retain(|id| *id != child);

        let mut removed = Vec::new();
        for id in self.subtree(child) {
            if let Some(element) = self.elements.remove(id) {
                removed.push((id, element));
            }
        }
        Ok(removed)
    }

    /// Moves `id` to the end of its parent's children list (topmost).
    ///
    /// Returns `false` when the element has no parent.
    pub fn bring_to_front(&mut self, id: ElementId) -> DesktopResult<bool> {
        let Some(parent) = self.element(id)?.parent else {
            return Ok(false);
        };
        let siblings = &mut self.element_mut(parent)?.children;
        siblings.retain(|existing| *existing != id);
        siblings.push(id);
        Ok(true)
    }

    /// Replaces `parent`'s child order with `order`, which must be a permutation of it.
    pub(crate) fn reorder_children(&mut self, parent: ElementId, order: Vec<ElementId>) {
        if let Some(element) = self.elements.get_mut(parent) {
            if element.children.len() == order.len()
                && order.iter().all(|id| element.children.contains(id))
            {
                element.children = order;
            }
        }
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(Element::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(Element::parent)
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Returns `true` when `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        id == ancestor || self.ancestors(id).any(|current| current == ancestor)
    }

    /// `id` and all descendants, pre-order.
    pub fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Nearest window at or above `id`.
    pub fn enclosing_window(&self, id: ElementId) -> Option<ElementId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|current| self.window(*current).is_some())
    }

    /// Absolute origin of `id`'s children.
    pub fn child_origin(&self, id: ElementId) -> Vec2 {
        match self.get(id) {
            Some(element) => self.absolute_position(id) + element.children_origin_offset(),
            None => Vec2::ZERO,
        }
    }

    /// Parent's absolute position plus the parent's child offset plus the local position.
    pub fn absolute_position(&self, id: ElementId) -> Vec2 {
        let Some(element) = self.get(id) else {
            return Vec2::ZERO;
        };
        let mut position = element.position;
        let mut cursor = element.parent;
        while let Some(parent_id) = cursor {
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            position += parent.position + parent.children_origin_offset();
            cursor = parent.parent;
        }
        position
    }

    pub fn absolute_bounds(&self, id: ElementId) -> WindowRect {
        let size = self.get(id).map(|element| element.size).unwrap_or(Vec2::ZERO);
        WindowRect::from_pos_size(self.absolute_position(id), size)
    }

    /// Product of the element's and every ancestor's opacity.
    pub fn absolute_opacity(&self, id: ElementId) -> f32 {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|current| self.get(current))
            .map(|element| element.opacity)
            .product()
    }

    /// Visible itself and through every ancestor.
    pub fn is_effectively_visible(&self, id: ElementId) -> bool {
        self.contains(id)
            && std::iter::once(id)
                .chain(self.ancestors(id))
                .all(|current| self.get(current).is_some_and(|element| element.visible))
    }

    /// A window is blocked while one of its modal child windows is visible.
    pub fn is_blocked(&self, id: ElementId) -> bool {
        self.blocking_modal(id).is_some()
    }

    /// Topmost visible modal child window blocking `id`.
    pub fn blocking_modal(&self, id: ElementId) -> Option<ElementId> {
        let window = self.window(id)?;
        window
            .child_windows
            .iter()
            .rev()
            .copied()
            .find(|child| {
                self.window(*child)
                    .is_some_and(|state| state.modal && state.accepts_pointer())
                    && self.is_effectively_visible(*child)
            })
    }

    /// Deepest input-consuming element under `point`, searching topmost children first.
    ///
    /// The first element whose subtree contains the point ends the search, except plain
    /// containers that consume nothing.
    pub fn get_element_at(&self, point: Vec2) -> Option<ElementId> {
        match self.hit(self.root, point, Vec2::ZERO) {
            Hit::Inside(found) => found,
            Hit::Miss => None,
        }
    }

    fn hit(&self, id: ElementId, point: Vec2, origin: Vec2) -> Hit {
        let Some(element) = self.get(id) else {
            return Hit::Miss;
        };
        if !element.visible {
            return Hit::Miss;
        }
        let position = origin + element.position;
        let bounds = WindowRect::from_pos_size(position, element.size);
        let child_origin = position + element.children_origin_offset();

        if let ElementKind::Window(window) = &element.kind {
            if !window.accepts_pointer() || !bounds.contains(point) {
                return Hit::Miss;
            }
            if self.is_blocked(id) {
                return Hit::Inside(Some(id));
            }
            let local = point - position;
            let in_content = window.content_rect(bounds).contains(point)
                && matches!(window.zone_at(local, element.size), WindowZone::Content);
            if in_content {
                if let Some(found) = self.hit_children(element, point, child_origin) {
                    return Hit::Inside(found.or(Some(id)));
                }
            }
            return Hit::Inside(Some(id));
        }

        let own = element.consumes_input.then_some(id);
        if let Some(found) = self.hit_children(element, point, child_origin) {
            return Hit::Inside(found.or(own));
        }
        // Non-consuming containers only group; they never shadow lower siblings.
        let transparent = own.is_none() && matches!(element.kind, ElementKind::Container);
        if bounds.contains(point) && !transparent {
            Hit::Inside(own)
        } else {
            Hit::Miss
        }
    }

    fn hit_children(
        &self,
        element: &Element,
        point: Vec2,
        child_origin: Vec2,
    ) -> Option<Option<ElementId>> {
        element
            .children
            .iter()
            .rev()
            .find_map(|child| match self.hit(*child, point, child_origin) {
                Hit::Inside(found) => Some(found),
                Hit::Miss => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::widgets::panel::PanelStyle;

    fn tree() -> ElementTree {
        ElementTree::new(Vec2::new(800.0, 600.0))
    }

    fn attach(tree: &mut ElementTree, parent: ElementId, element: Element) -> ElementId {
        let id = tree.insert(element);
        tree.add_child(parent, id).expect("attach");
        id
    }

    fn panel(rect: WindowRect) -> Element {
        Element::panel(PanelStyle::default()).with_bounds(rect)
    }

    #[test]
    fn absolute_position_sums_parent_offsets() {
        let mut tree = tree();
        let root = tree.root();
        let outer = attach(
            &mut tree,
            root,
            Element::container()
                .with_bounds(WindowRect::new(10.0, 20.0, 300.0, 300.0))
                .with_child_offset(Vec2::new(4.0, 6.0)),
        );
        let inner = attach(&mut tree, outer, panel(WindowRect::new(1.0, 2.0, 50.0, 50.0)));
        assert_eq!(tree.absolute_position(inner), Vec2::new(15.0, 28.0));

        let before = tree.absolute_position(inner);
        tree.element_mut(outer).expect("outer").position += Vec2::new(7.0, -3.0);
        assert_eq!(tree.absolute_position(inner), before + Vec2::new(7.0, -3.0));
    }

    #[test]
    fn opacity_composes_multiplicatively() {
        let mut tree = tree();
        let root = tree.root();
        let parent = attach(
            &mut tree,
            root,
            Element::container().with_opacity(0.5),
        );
        let child = attach(&mut tree, parent, Element::container().with_opacity(0.5));
        assert_eq!(tree.absolute_opacity(child), 0.25);
    }

    #[test]
    fn add_child_rejects_reattach_and_cycles() {
        let mut tree = tree();
        let root = tree.root();
        let a = attach(&mut tree, root, Element::container());
        let b = attach(&mut tree, a, Element::container());

        assert_eq!(tree.add_child(root, b), Err(DesktopError::AlreadyAttached(b)));
        let root_id = tree.root();
        assert_eq!(
            tree.add_child(b, root_id),
            Err(DesktopError::RootImmutable(root_id))
        );

        let detached = tree.insert(Element::container());
        assert_eq!(
            tree.add_child(detached, detached),
            Err(DesktopError::WouldCreateCycle {
                parent: detached,
                child: detached
            })
        );
    }

    #[test]
    fn remove_child_drops_the_whole_subtree() {
        let mut tree = tree();
        let root = tree.root();
        let a = attach(&mut tree, root, Element::container());
        let b = attach(&mut tree, a, Element::container());
        let c = attach(&mut tree, b, Element::container());

        let removed = tree.remove_child(root, a).expect("remove");
        let ids: Vec<ElementId> = removed.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert!(!tree.contains(c));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn topmost_sibling_wins_and_bring_to_front_reorders() {
        let mut tree = tree();
        let root = tree.root();
        let back = attach(&mut tree, root, panel(WindowRect::new(0.0, 0.0, 100.0, 100.0)));
        let front = attach(&mut tree, root, panel(WindowRect::new(50.0, 50.0, 100.0, 100.0)));

        assert_eq!(tree.get_element_at(Vec2::new(75.0, 75.0)), Some(front));
        assert_eq!(tree.get_element_at(Vec2::new(25.0, 25.0)), Some(back));

        assert!(tree.bring_to_front(back).expect("raise"));
        assert_eq!(tree.get_element_at(Vec2::new(75.0, 75.0)), Some(back));
        assert_eq!(tree.get_element_at(Vec2::new(125.0, 125.0)), Some(front));
    }

    #[test]
    fn non_consuming_leaf_resolves_to_nearest_consuming_ancestor() {
        let mut tree = tree();
        let root = tree.root();
        let card = attach(&mut tree, root, panel(WindowRect::new(0.0, 0.0, 200.0, 200.0)));
        let _caption = attach(
            &mut tree,
            card,
            Element::container().with_bounds(WindowRect::new(10.0, 10.0, 50.0, 20.0)),
        );
        assert_eq!(tree.get_element_at(Vec2::new(20.0, 15.0)), Some(card));
        assert_eq!(tree.get_element_at(Vec2::new(500.0, 500.0)), None);
    }

    #[test]
    fn empty_containers_let_hits_reach_lower_siblings() {
        let mut tree = tree();
        let root = tree.root();
        let icon = attach(&mut tree, root, panel(WindowRect::new(0.0, 0.0, 50.0, 50.0)));
        let _overlay = attach(
            &mut tree,
            root,
            Element::container().with_bounds(WindowRect::new(0.0, 0.0, 800.0, 600.0)),
        );
        assert_eq!(tree.get_element_at(Vec2::new(10.0, 10.0)), Some(icon));
    }

    #[test]
    fn hidden_elements_are_not_hit() {
        let mut tree = tree();
        let root = tree.root();
        let hidden = attach(&mut tree, root, panel(WindowRect::new(0.0, 0.0, 100.0, 100.0)));
        tree.element_mut(hidden).expect("hidden").visible = false;
        assert_eq!(tree.get_element_at(Vec2::new(50.0, 50.0)), None);
    }

    #[test]
    fn children_outside_parent_bounds_are_still_hit() {
        let mut tree = tree();
        let root = tree.root();
        let group = attach(
            &mut tree,
            root,
            Element::container().with_bounds(WindowRect::new(0.0, 0.0, 10.0, 10.0)),
        );
        let overflow = attach(&mut tree, group, panel(WindowRect::new(50.0, 50.0, 20.0, 20.0)));
        assert_eq!(tree.get_element_at(Vec2::new(60.0, 60.0)), Some(overflow));
    }

    proptest! {
        #[test]
        fn translating_a_parent_translates_every_descendant(
            dx in -500.0f32..500.0,
            dy in -500.0f32..500.0,
            depth in 1usize..6,
        ) {
            let mut tree = tree();
            let mut parent = tree.root();
            let mut chain = Vec::new();
            for level in 0..depth {
                let offset = level as f32 * 3.0;
                let element = Element::container()
                    .with_bounds(WindowRect::new(offset, offset * 2.0, 10.0, 10.0))
                    .with_child_offset(Vec2::new(1.0, 1.0));
                let id = tree.insert(element);
                tree.add_child(parent, id).expect("attach");
                chain.push(id);
                parent = id;
            }
            let top = chain[0];
            let before: Vec<Vec2> = chain.iter().map(|id| tree.absolute_position(*id)).collect();
            tree.element_mut(top).expect("top").position += Vec2::new(dx, dy);
            for (id, old) in chain.iter().zip(before) {
                let new = tree.absolute_position(*id);
                prop_assert!((new.x - old.x - dx).abs() < 0.01);
                prop_assert!((new.y - old.y - dy).abs() < 0.01);
            }
        }

        #[test]
        fn opacity_of_a_chain_is_the_product(
            values in proptest::collection::vec(0.0f32..=1.0, 1..6),
        ) {
            let mut tree = tree();
            let mut parent = tree.root();
            for value in &values {
                let id = tree.insert(Element::container().with_opacity(*value));
                tree.add_child(parent, id).expect("attach");
                parent = id;
            }
            let expected: f32 = values.iter().product();
            prop_assert!((tree.absolute_opacity(parent) - expected).abs() < 1e-5);
        }
    }
}
