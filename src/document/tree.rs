// WidgetTree - arena holding every widget of a project
//
// Widgets are stored by id; structure is kept in each widget's parent/children
// fields plus an ordered list of toplevels. Commands detach whole subtrees and
// re-attach them later at the same slot, which keeps ids stable across
// undo/redo.

use crate::document::property::PropertyValue;
use crate::document::widget::{SignalHandler, Widget, WidgetId};
use std::collections::{BTreeMap, HashSet};

/// Errors raised by structural tree operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("Unknown widget {0}")]
    UnknownWidget(WidgetId),

    #[error("Widget id {0} is already in use")]
    IdInUse(WidgetId),

    #[error("A widget named '{0}' already exists")]
    DuplicateName(String),

    #[error("Cannot move {widget} into itself or its descendant {target}")]
    Cycle { widget: WidgetId, target: WidgetId },

    #[error("Widget {widget} has no signal handler at index {index}")]
    UnknownSignal { widget: WidgetId, index: usize },

    #[error("Invalid subtree: {0}")]
    InvalidSubtree(String),
}

/// A detached group of widgets rooted at `root`
#[derive(Debug, Clone, PartialEq)]
pub struct Subtree {
    pub(crate) root: WidgetId,
    pub(crate) widgets: Vec<Widget>,
}

impl Subtree {
    pub fn root(&self) -> WidgetId {
        self.root
    }

    pub fn root_widget(&self) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == self.root)
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

/// Place a widget occupies: its parent (None for toplevels) and index among siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub parent: Option<WidgetId>,
    pub position: usize,
}

/// Result of detaching a widget: the removed widgets and where they were
#[derive(Debug, Clone, PartialEq)]
pub struct Detached {
    pub subtree: Subtree,
    pub slot: Slot,
}

/// All widgets of one project
#[derive(Debug, Clone)]
pub struct WidgetTree {
    widgets: BTreeMap<WidgetId, Widget>,
    toplevels: Vec<WidgetId>,
    next_id: u64,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self {
            widgets: BTreeMap::new(),
            toplevels: Vec::new(),
            next_id: 1,
        }
    }

    /// Reserve a fresh id; ids are never handed out twice
    pub fn allocate_id(&mut self) -> WidgetId {
        let id = WidgetId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(&id)
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: WidgetId) -> Result<&mut Widget, TreeError> {
        self.widgets
            .get_mut(&id)
            .ok_or(TreeError::UnknownWidget(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.values()
    }

    pub fn toplevels(&self) -> &[WidgetId] {
        &self.toplevels
    }

    pub fn children(&self, id: WidgetId) -> Result<&[WidgetId], TreeError> {
        self.get(id)
            .map(|w| w.children.as_slice())
            .ok_or(TreeError::UnknownWidget(id))
    }

    pub fn parent_of(&self, id: WidgetId) -> Option<WidgetId> {
        self.get(id).and_then(|w| w.parent)
    }

    pub fn find_by_name(&self, name: &str) -> Option<WidgetId> {
        self.widgets
            .values()
            .find(|w| w.name == name)
            .map(|w| w.id)
    }

    /// Current slot of a widget
    pub fn slot_of(&self, id: WidgetId) -> Result<Slot, TreeError> {
        let widget = self.get(id).ok_or(TreeError::UnknownWidget(id))?;
        let siblings = match widget.parent {
            Some(parent) => self
                .get(parent)
                .map(|p| p.children.as_slice())
                .ok_or(TreeError::UnknownWidget(parent))?,
            None => self.toplevels.as_slice(),
        };
        let position = siblings.iter().position(|c| *c == id).ok_or_else(|| {
            TreeError::InvalidSubtree(format!("{} is missing from its parent", id))
        })?;
        Ok(Slot {
            parent: widget.parent,
            position,
        })
    }

    /// True if `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent_of(parent);
        }
        false
    }

    /// Ids of `id` and all its descendants, parents before children
    pub fn subtree_ids(&self, id: WidgetId) -> Result<Vec<WidgetId>, TreeError> {
        if !self.contains(id) {
            return Err(TreeError::UnknownWidget(id));
        }
        let mut ids = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            ids.push(current);
            if let Some(widget) = self.get(current) {
                stack.extend(widget.children.iter().rev().copied());
            }
        }
        Ok(ids)
    }

    /// First `prefixN` name (N >= 1) not used in the tree
    pub fn unique_name(&self, prefix: &str) -> String {
        self.unique_name_with(prefix, &HashSet::new())
    }

    /// Like `unique_name`, also avoiding names reserved by a pending subtree
    pub(crate) fn unique_name_with(&self, prefix: &str, reserved: &HashSet<String>) -> String {
        let used: HashSet<&str> = self.widgets.values().map(|w| w.name.as_str()).collect();
        let mut n = 1usize;
        loop {
            let candidate = format!("{}{}", prefix, n);
            if !used.contains(candidate.as_str()) && !reserved.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Check that `attach` would succeed, without consuming the subtree
    pub fn check_attach(&self, subtree: &Subtree, parent: Option<WidgetId>) -> Result<(), TreeError> {
        if !subtree.widgets.iter().any(|w| w.id == subtree.root) {
            return Err(TreeError::InvalidSubtree(format!(
                "root {} is not part of the subtree",
                subtree.root
            )));
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(TreeError::UnknownWidget(parent));
            }
        }
        for widget in &subtree.widgets {
            if self.contains(widget.id) {
                return Err(TreeError::IdInUse(widget.id));
            }
            if self.find_by_name(&widget.name).is_some() {
                return Err(TreeError::DuplicateName(widget.name.clone()));
            }
        }
        Ok(())
    }

    /// Insert a detached subtree under `parent` at `position` (clamped; None = append)
    pub fn attach(
        &mut self,
        subtree: Subtree,
        parent: Option<WidgetId>,
        position: Option<usize>,
    ) -> Result<WidgetId, TreeError> {
        self.check_attach(&subtree, parent)?;
        let root = subtree.root;

        for mut widget in subtree.widgets {
            if widget.id == root {
                widget.parent = parent;
            }
            self.next_id = self.next_id.max(widget.id.0 + 1);
            self.widgets.insert(widget.id, widget);
        }

        let siblings = self.siblings_mut(parent)?;
        let index = position.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, root);
        Ok(root)
    }

    /// Remove a widget and its descendants, remembering where it was
    pub fn detach(&mut self, id: WidgetId) -> Result<Detached, TreeError> {
        let slot = self.slot_of(id)?;
        let ids = self.subtree_ids(id)?;

        self.siblings_mut(slot.parent)?.remove(slot.position);

        let mut widgets = Vec::with_capacity(ids.len());
        for widget_id in ids {
            if let Some(mut widget) = self.widgets.remove(&widget_id) {
                if widget_id == id {
                    widget.parent = None;
                }
                widgets.push(widget);
            }
        }

        Ok(Detached {
            subtree: Subtree { root: id, widgets },
            slot,
        })
    }

    /// Move a widget to a new parent/position, returning its previous slot
    pub fn move_widget(
        &mut self,
        id: WidgetId,
        new_parent: Option<WidgetId>,
        position: Option<usize>,
    ) -> Result<Slot, TreeError> {
        if let Some(target) = new_parent {
            if !self.contains(target) {
                return Err(TreeError::UnknownWidget(target));
            }
            if target == id || self.is_ancestor(id, target) {
                return Err(TreeError::Cycle { widget: id, target });
            }
        }
        let old = self.slot_of(id)?;
        self.siblings_mut(old.parent)?.remove(old.position);

        let siblings = self.siblings_mut(new_parent)?;
        let index = position.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, id);
        self.get_mut(id)?.parent = new_parent;
        Ok(old)
    }

    /// Rename a widget, returning the previous name
    pub(crate) fn rename(&mut self, id: WidgetId, name: &str) -> Result<String, TreeError> {
        if let Some(owner) = self.find_by_name(name) {
            if owner != id {
                return Err(TreeError::DuplicateName(name.to_string()));
            }
        }
        let widget = self.get_mut(id)?;
        Ok(std::mem::replace(&mut widget.name, name.to_string()))
    }

    /// Set (Some) or remove (None) a property, returning the previous value
    pub(crate) fn replace_property(
        &mut self,
        id: WidgetId,
        name: &str,
        value: Option<PropertyValue>,
    ) -> Result<Option<PropertyValue>, TreeError> {
        let widget = self.get_mut(id)?;
        Ok(match value {
            Some(value) => widget.properties.insert(name.to_string(), value),
            None => widget.properties.remove(name),
        })
    }

    pub(crate) fn insert_signal(
        &mut self,
        id: WidgetId,
        handler: SignalHandler,
        index: Option<usize>,
    ) -> Result<usize, TreeError> {
        let signals = &mut self.get_mut(id)?.signals;
        let index = index.unwrap_or(signals.len()).min(signals.len());
        signals.insert(index, handler);
        Ok(index)
    }

    pub(crate) fn remove_signal(
        &mut self,
        id: WidgetId,
        index: usize,
    ) -> Result<SignalHandler, TreeError> {
        let signals = &mut self.get_mut(id)?.signals;
        if index >= signals.len() {
            return Err(TreeError::UnknownSignal { widget: id, index });
        }
        Ok(signals.remove(index))
    }

    fn siblings_mut(&mut self, parent: Option<WidgetId>) -> Result<&mut Vec<WidgetId>, TreeError> {
        match parent {
            Some(parent) => Ok(&mut self.get_mut(parent)?.children),
            None => Ok(&mut self.toplevels),
        }
    }
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

// next_id is not compared: undo never rewinds it.
impl PartialEq for WidgetTree {
    fn eq(&self, other: &Self) -> bool {
        self.widgets == other.widgets && self.toplevels == other.toplevels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(tree: &mut WidgetTree, class: &str, name: &str) -> Subtree {
        let id = tree.allocate_id();
        Subtree {
            root: id,
            widgets: vec![Widget::new(id, class, name)],
        }
    }

    fn window_with_box(tree: &mut WidgetTree) -> (WidgetId, WidgetId) {
        let window = single(tree, "Window", "window1");
        let window = tree.attach(window, None, None).unwrap();
        let vbox = single(tree, "Box", "box1");
        let vbox = tree.attach(vbox, Some(window), None).unwrap();
        (window, vbox)
    }

    #[test]
    fn test_attach_and_slots() {
        let mut tree = WidgetTree::new();
        let (window, vbox) = window_with_box(&mut tree);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.toplevels(), &[window]);
        assert_eq!(tree.children(window).unwrap(), &[vbox]);
        assert_eq!(
            tree.slot_of(vbox).unwrap(),
            Slot {
                parent: Some(window),
                position: 0
            }
        );
        assert!(tree.is_ancestor(window, vbox));
        assert!(!tree.is_ancestor(vbox, window));
    }

    #[test]
    fn test_attach_position_is_clamped() {
        let mut tree = WidgetTree::new();
        let (_, vbox) = window_with_box(&mut tree);
        let a = single(&mut tree, "Button", "button1");
        let a = tree.attach(a, Some(vbox), Some(99)).unwrap();
        let b = single(&mut tree, "Button", "button2");
        let b = tree.attach(b, Some(vbox), Some(0)).unwrap();
        assert_eq!(tree.children(vbox).unwrap(), &[b, a]);
    }

    #[test]
    fn test_detach_and_reattach_restores_tree() {
        let mut tree = WidgetTree::new();
        let (window, vbox) = window_with_box(&mut tree);
        let button = single(&mut tree, "Button", "button1");
        tree.attach(button, Some(vbox), None).unwrap();
        let before = tree.clone();

        let detached = tree.detach(vbox).unwrap();
        assert_eq!(detached.subtree.len(), 2);
        assert_eq!(tree.len(), 1);
        assert!(tree.children(window).unwrap().is_empty());

        tree.attach(detached.subtree, detached.slot.parent, Some(detached.slot.position))
            .unwrap();
        assert_eq!(tree, before);
    }

    #[test]
    fn test_attach_rejects_duplicate_name() {
        let mut tree = WidgetTree::new();
        window_with_box(&mut tree);
        let dup = single(&mut tree, "Box", "box1");
        assert_eq!(
            tree.attach(dup, None, None),
            Err(TreeError::DuplicateName("box1".into()))
        );
    }

    #[test]
    fn test_move_rejects_cycle() {
        let mut tree = WidgetTree::new();
        let (window, vbox) = window_with_box(&mut tree);
        assert_eq!(
            tree.move_widget(window, Some(vbox), None),
            Err(TreeError::Cycle {
                widget: window,
                target: vbox
            })
        );
        assert!(matches!(
            tree.move_widget(window, Some(window), None),
            Err(TreeError::Cycle { .. })
        ));
    }

    #[test]
    fn test_move_returns_old_slot() {
        let mut tree = WidgetTree::new();
        let (window, vbox) = window_with_box(&mut tree);
        let old = tree.move_widget(vbox, None, None).unwrap();
        assert_eq!(
            old,
            Slot {
                parent: Some(window),
                position: 0
            }
        );
        assert_eq!(tree.toplevels(), &[window, vbox]);
        assert_eq!(tree.parent_of(vbox), None);
    }

    #[test]
    fn test_unique_name_skips_used_names() {
        let mut tree = WidgetTree::new();
        let b1 = single(&mut tree, "Button", "button1");
        tree.attach(b1, None, None).unwrap();
        let b3 = single(&mut tree, "Button", "button3");
        tree.attach(b3, None, None).unwrap();

        assert_eq!(tree.unique_name("button"), "button2");
        let reserved: HashSet<String> = ["button2".to_string()].into_iter().collect();
        assert_eq!(tree.unique_name_with("button", &reserved), "button4");
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut tree = WidgetTree::new();
        let first = single(&mut tree, "Window", "window1");
        let first_id = tree.attach(first, None, None).unwrap();
        tree.detach(first_id).unwrap();
        assert_ne!(tree.allocate_id(), first_id);
    }

    #[test]
    fn test_rename() {
        let mut tree = WidgetTree::new();
        let (window, vbox) = window_with_box(&mut tree);
        assert_eq!(tree.rename(window, "main").unwrap(), "window1");
        assert_eq!(tree.find_by_name("main"), Some(window));
        assert!(matches!(
            tree.rename(vbox, "main"),
            Err(TreeError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_remove_signal_out_of_range() {
        let mut tree = WidgetTree::new();
        let (window, _) = window_with_box(&mut tree);
        assert_eq!(
            tree.remove_signal(window, 0),
            Err(TreeError::UnknownSignal {
                widget: window,
                index: 0
            })
        );
    }
}
