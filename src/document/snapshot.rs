// Serializable copies of widget subtrees (used by the clipboard)

use crate::document::property::PropertyValue;
use crate::document::tree::{Subtree, TreeError, WidgetTree};
use crate::document::widget::{SignalHandler, Widget, WidgetId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Id-free copy of a widget and its descendants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSnapshot {
    pub class_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<SignalHandler>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<WidgetSnapshot>,
}

impl WidgetSnapshot {
    /// Copy the subtree rooted at `id`
    pub fn capture(tree: &WidgetTree, id: WidgetId) -> Result<Self, TreeError> {
        let widget = tree.get(id).ok_or(TreeError::UnknownWidget(id))?;
        let children = widget
            .children()
            .iter()
            .map(|child| Self::capture(tree, *child))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            class_name: widget.class_name.clone(),
            name: widget.name.clone(),
            properties: widget.properties.clone(),
            signals: widget.signals.clone(),
            children,
        })
    }

    /// Number of widgets in the snapshot
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }

    /// Every class name used in the snapshot, root first
    pub fn class_names(&self) -> Vec<&str> {
        let mut names = vec![self.class_name.as_str()];
        for child in &self.children {
            names.extend(child.class_names());
        }
        names
    }

    /// Build a detached subtree with fresh ids
    ///
    /// Names that are still free in `tree` are kept; taken names are replaced
    /// by the next free `prefixN`, where the prefix is the name without its
    /// trailing digits.
    pub fn instantiate(&self, tree: &mut WidgetTree) -> Subtree {
        let mut reserved = HashSet::new();
        let mut widgets = Vec::with_capacity(self.count());
        let root = self.build(tree, None, &mut reserved, &mut widgets);
        Subtree { root, widgets }
    }

    fn build(
        &self,
        tree: &mut WidgetTree,
        parent: Option<WidgetId>,
        reserved: &mut HashSet<String>,
        out: &mut Vec<Widget>,
    ) -> WidgetId {
        let id = tree.allocate_id();
        let name = if tree.find_by_name(&self.name).is_none() && !reserved.contains(&self.name) {
            self.name.clone()
        } else {
            tree.unique_name_with(&name_prefix(&self.name, &self.class_name), reserved)
        };
        reserved.insert(name.clone());

        let mut widget = Widget::new(id, self.class_name.clone(), name);
        widget.properties = self.properties.clone();
        widget.signals = self.signals.clone();
        widget.parent = parent;
        widget.children = self
            .children
            .iter()
            .map(|child| child.build(tree, Some(id), reserved, out))
            .collect();

        out.push(widget);
        id
    }
}

fn name_prefix(name: &str, class_name: &str) -> String {
    let prefix = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if prefix.is_empty() {
        class_name.to_lowercase()
    } else {
        prefix.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> (WidgetTree, WidgetId) {
        let mut tree = WidgetTree::new();
        let window_id = tree.allocate_id();
        let button_id = tree.allocate_id();

        let mut window = Widget::new(window_id, "Window", "window1");
        window.children = vec![button_id];
        window
            .properties
            .insert("title".into(), PropertyValue::from("Main"));

        let mut button = Widget::new(button_id, "Button", "button1");
        button.parent = Some(window_id);
        button.signals.push(SignalHandler::new("clicked", "on_button1_clicked"));

        tree.attach(
            Subtree {
                root: window_id,
                widgets: vec![window, button],
            },
            None,
            None,
        )
        .unwrap();
        (tree, window_id)
    }

    #[test]
    fn test_capture() {
        let (tree, window) = sample_tree();
        let snapshot = WidgetSnapshot::capture(&tree, window).unwrap();

        assert_eq!(snapshot.name, "window1");
        assert_eq!(snapshot.count(), 2);
        assert_eq!(snapshot.class_names(), vec!["Window", "Button"]);
        assert_eq!(snapshot.children[0].signals.len(), 1);
    }

    #[test]
    fn test_instantiate_renames_taken_names() {
        let (mut tree, window) = sample_tree();
        let snapshot = WidgetSnapshot::capture(&tree, window).unwrap();

        let subtree = snapshot.instantiate(&mut tree);
        let names: Vec<&str> = subtree.widgets().iter().map(|w| w.name.as_str()).collect();
        assert!(names.contains(&"window2"));
        assert!(names.contains(&"button2"));

        let root = tree.attach(subtree, None, None).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.children(root).unwrap().len(), 1);
    }

    #[test]
    fn test_instantiate_keeps_free_names() {
        let (tree, window) = sample_tree();
        let snapshot = WidgetSnapshot::capture(&tree, window).unwrap();

        let mut empty = WidgetTree::new();
        let subtree = snapshot.instantiate(&mut empty);
        assert_eq!(subtree.root_widget().unwrap().name, "window1");
    }

    #[test]
    fn test_json_payload() {
        let (tree, window) = sample_tree();
        let snapshot = WidgetSnapshot::capture(&tree, window).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("on_button1_clicked"));
        let decoded: WidgetSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_name_prefix() {
        assert_eq!(name_prefix("button12", "Button"), "button");
        assert_eq!(name_prefix("42", "Label"), "label");
    }
}
