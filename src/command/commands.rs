// Concrete command implementations

use crate::command::trait_def::{Command, CommandError, CommandResult, MergeKey};
use crate::document::property::PropertyValue;
use crate::document::tree::{Detached, Slot, Subtree, WidgetTree};
use crate::document::widget::{SignalHandler, WidgetId};
use log::warn;
use std::any::Any;

/// Command that inserts a prepared subtree (create and paste)
///
/// The subtree is built up front with fresh ids; undo detaches it again and
/// keeps it so that redo re-inserts the very same widgets.
pub struct InsertWidgetCommand {
    verb: String,
    root: WidgetId,
    name: String,
    parent: Option<WidgetId>,
    position: Option<usize>,
    pending: Option<Subtree>,
}

impl InsertWidgetCommand {
    /// # Arguments
    /// * `verb` - Label prefix, e.g. "Create" or "Paste"
    /// * `subtree` - Detached widgets to insert
    /// * `parent` - Container to insert into, `None` for a toplevel
    /// * `position` - Index among siblings, `None` to append
    pub fn new(
        verb: impl Into<String>,
        subtree: Subtree,
        parent: Option<WidgetId>,
        position: Option<usize>,
    ) -> Self {
        let name = subtree
            .root_widget()
            .map(|w| w.name.clone())
            .unwrap_or_default();
        Self {
            verb: verb.into(),
            root: subtree.root(),
            name,
            parent,
            position,
            pending: Some(subtree),
        }
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }
}

impl Command for InsertWidgetCommand {
    fn execute(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        let subtree = self.pending.as_ref().ok_or_else(|| {
            CommandError::ExecutionFailed(format!("{} is already inserted", self.name))
        })?;
        tree.check_attach(subtree, self.parent)?;

        if let Some(subtree) = self.pending.take() {
            tree.attach(subtree, self.parent, self.position)?;
        }
        Ok(())
    }

    fn undo(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        let detached = tree.detach(self.root)?;
        self.position = Some(detached.slot.position);
        self.pending = Some(detached.subtree);
        Ok(())
    }

    fn description(&self) -> String {
        format!("{} {}", self.verb, self.name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Command that removes a widget and all of its descendants
pub struct DeleteWidgetCommand {
    verb: String,
    widget: WidgetId,
    name: String,
    detached: Option<Detached>,
}

impl DeleteWidgetCommand {
    pub fn new(widget: WidgetId, name: impl Into<String>) -> Self {
        Self::with_verb("Delete", widget, name)
    }

    /// Same as `new` with a custom label prefix (e.g. "Cut")
    pub fn with_verb(verb: impl Into<String>, widget: WidgetId, name: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            widget,
            name: name.into(),
            detached: None,
        }
    }
}

impl Command for DeleteWidgetCommand {
    fn execute(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        self.detached = Some(tree.detach(self.widget)?);
        Ok(())
    }

    fn undo(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        let detached = self
            .detached
            .as_ref()
            .ok_or_else(|| CommandError::UndoFailed(format!("{} was not deleted", self.name)))?;
        tree.check_attach(&detached.subtree, detached.slot.parent)?;

        if let Some(Detached { subtree, slot }) = self.detached.take() {
            tree.attach(subtree, slot.parent, Some(slot.position))?;
        }
        Ok(())
    }

    fn description(&self) -> String {
        format!("{} {}", self.verb, self.name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Command to set a widget property
///
/// Repeated edits of the same property collapse into one entry which keeps
/// the value from before the first edit.
pub struct SetPropertyCommand {
    widget: WidgetId,
    widget_name: String,
    property: String,
    new_value: PropertyValue,
    // Outer None: not executed yet. Inner None: the property was unset.
    old_value: Option<Option<PropertyValue>>,
}

impl SetPropertyCommand {
    pub fn new(
        widget: WidgetId,
        widget_name: impl Into<String>,
        property: impl Into<String>,
        value: PropertyValue,
    ) -> Self {
        Self {
            widget,
            widget_name: widget_name.into(),
            property: property.into(),
            new_value: value,
            old_value: None,
        }
    }

    pub fn new_value(&self) -> &PropertyValue {
        &self.new_value
    }
}

impl Command for SetPropertyCommand {
    fn execute(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        let previous =
            tree.replace_property(self.widget, &self.property, Some(self.new_value.clone()))?;
        if self.old_value.is_none() {
            self.old_value = Some(previous);
        }
        Ok(())
    }

    fn undo(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        let old_value = self.old_value.clone().ok_or_else(|| {
            CommandError::UndoFailed(format!("No previous value of '{}' stored", self.property))
        })?;
        tree.replace_property(self.widget, &self.property, old_value)?;
        Ok(())
    }

    fn description(&self) -> String {
        format!("Set {} of {}", self.property, self.widget_name)
    }

    fn merge_key(&self) -> Option<MergeKey> {
        Some(MergeKey::Property {
            widget: self.widget,
            property: self.property.clone(),
        })
    }

    fn collapse(&mut self, other: &dyn Command) -> CommandResult<()> {
        match other.as_any().downcast_ref::<SetPropertyCommand>() {
            Some(other) if other.widget == self.widget && other.property == self.property => {
                self.new_value = other.new_value.clone();
                Ok(())
            }
            _ => Err(CommandError::CannotCollapse {
                target: self.description(),
                incoming: other.description(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Command to rename a widget
pub struct RenameWidgetCommand {
    widget: WidgetId,
    from: String,
    to: String,
}

impl RenameWidgetCommand {
    pub fn new(widget: WidgetId, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            widget,
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Command for RenameWidgetCommand {
    fn execute(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        self.from = tree.rename(self.widget, &self.to)?;
        Ok(())
    }

    fn undo(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        tree.rename(self.widget, &self.from)?;
        Ok(())
    }

    fn description(&self) -> String {
        format!("Rename {} to {}", self.from, self.to)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Command to reparent or reorder a widget
///
/// Consecutive moves of the same widget (a drag) collapse into one entry that
/// returns the widget to where the drag started.
pub struct MoveWidgetCommand {
    widget: WidgetId,
    name: String,
    parent: Option<WidgetId>,
    position: Option<usize>,
    origin: Option<Slot>,
}

impl MoveWidgetCommand {
    pub fn new(
        widget: WidgetId,
        name: impl Into<String>,
        parent: Option<WidgetId>,
        position: Option<usize>,
    ) -> Self {
        Self {
            widget,
            name: name.into(),
            parent,
            position,
            origin: None,
        }
    }
}

impl Command for MoveWidgetCommand {
    fn execute(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        let old = tree.move_widget(self.widget, self.parent, self.position)?;
        if self.origin.is_none() {
            self.origin = Some(old);
        }
        Ok(())
    }

    fn undo(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        let origin = self
            .origin
            .ok_or_else(|| CommandError::UndoFailed(format!("{} was not moved", self.name)))?;
        tree.move_widget(self.widget, origin.parent, Some(origin.position))?;
        Ok(())
    }

    fn description(&self) -> String {
        format!("Move {}", self.name)
    }

    fn merge_key(&self) -> Option<MergeKey> {
        Some(MergeKey::Move {
            widget: self.widget,
        })
    }

    fn collapse(&mut self, other: &dyn Command) -> CommandResult<()> {
        match other.as_any().downcast_ref::<MoveWidgetCommand>() {
            Some(other) if other.widget == self.widget => {
                self.parent = other.parent;
                self.position = other.position;
                Ok(())
            }
            _ => Err(CommandError::CannotCollapse {
                target: self.description(),
                incoming: other.description(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Command to connect a signal handler
pub struct AddSignalCommand {
    widget: WidgetId,
    widget_name: String,
    handler: SignalHandler,
    index: Option<usize>,
}

impl AddSignalCommand {
    pub fn new(widget: WidgetId, widget_name: impl Into<String>, handler: SignalHandler) -> Self {
        Self {
            widget,
            widget_name: widget_name.into(),
            handler,
            index: None,
        }
    }
}

impl Command for AddSignalCommand {
    fn execute(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        self.index = Some(tree.insert_signal(self.widget, self.handler.clone(), self.index)?);
        Ok(())
    }

    fn undo(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        let index = self.index.ok_or_else(|| {
            CommandError::UndoFailed(format!("{} was never connected", self.handler.handler))
        })?;
        tree.remove_signal(self.widget, index)?;
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Connect {}::{} to {}",
            self.widget_name, self.handler.signal, self.handler.handler
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Command to disconnect a signal handler
pub struct RemoveSignalCommand {
    widget: WidgetId,
    widget_name: String,
    index: usize,
    label: String,
    removed: Option<SignalHandler>,
}

impl RemoveSignalCommand {
    /// `index` is the handler's position in the widget's signal list
    pub fn new(
        widget: WidgetId,
        widget_name: impl Into<String>,
        index: usize,
        handler: &SignalHandler,
    ) -> Self {
        Self {
            widget,
            widget_name: widget_name.into(),
            index,
            label: format!("{} from {}", handler.handler, handler.signal),
            removed: None,
        }
    }
}

impl Command for RemoveSignalCommand {
    fn execute(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        self.removed = Some(tree.remove_signal(self.widget, self.index)?);
        Ok(())
    }

    fn undo(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        let handler = self
            .removed
            .take()
            .ok_or_else(|| CommandError::UndoFailed("No handler was removed".into()))?;
        tree.insert_signal(self.widget, handler, Some(self.index))?;
        Ok(())
    }

    fn description(&self) -> String {
        format!("Disconnect {} on {}", self.label, self.widget_name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Several commands recorded as one history entry
///
/// Runs its commands in order and undoes them in reverse. A failure part way
/// rolls back the commands that already ran before returning the error.
pub struct CommandList {
    description: String,
    commands: Vec<Box<dyn Command>>,
}

impl CommandList {
    pub fn new(description: impl Into<String>, commands: Vec<Box<dyn Command>>) -> Self {
        Self {
            description: description.into(),
            commands,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn run_forward(&mut self, tree: &mut WidgetTree, redo: bool) -> CommandResult<()> {
        for i in 0..self.commands.len() {
            let result = if redo {
                self.commands[i].redo(tree)
            } else {
                self.commands[i].execute(tree)
            };
            if let Err(err) = result {
                for done in self.commands[..i].iter_mut().rev() {
                    if let Err(rollback) = done.undo(tree) {
                        warn!("Rollback of '{}' failed: {}", done.description(), rollback);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

impl Command for CommandList {
    fn execute(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        self.run_forward(tree, false)
    }

    fn undo(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        let count = self.commands.len();
        for i in (0..count).rev() {
            if let Err(err) = self.commands[i].undo(tree) {
                for undone in self.commands[i + 1..].iter_mut() {
                    if let Err(rollback) = undone.redo(tree) {
                        warn!("Rollback of '{}' failed: {}", undone.description(), rollback);
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn redo(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        self.run_forward(tree, true)
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::widget::Widget;

    fn single(tree: &mut WidgetTree, class: &str, name: &str) -> Subtree {
        let id = tree.allocate_id();
        Subtree {
            root: id,
            widgets: vec![Widget::new(id, class, name)],
        }
    }

    fn tree_with_box() -> (WidgetTree, WidgetId, WidgetId) {
        let mut tree = WidgetTree::new();
        let window = single(&mut tree, "Window", "window1");
        let window = tree.attach(window, None, None).unwrap();
        let vbox = single(&mut tree, "Box", "box1");
        let vbox = tree.attach(vbox, Some(window), None).unwrap();
        (tree, window, vbox)
    }

    #[test]
    fn test_insert_command() {
        let (mut tree, _, vbox) = tree_with_box();
        let before = tree.clone();
        let subtree = single(&mut tree, "Button", "button1");
        let mut cmd = InsertWidgetCommand::new("Create", subtree, Some(vbox), None);

        cmd.execute(&mut tree).unwrap();
        assert!(tree.contains(cmd.root()));
        assert_eq!(cmd.description(), "Create button1");

        cmd.undo(&mut tree).unwrap();
        assert_eq!(tree, before);

        cmd.redo(&mut tree).unwrap();
        assert_eq!(tree.children(vbox).unwrap(), &[cmd.root()]);
    }

    #[test]
    fn test_insert_twice_fails() {
        let (mut tree, _, vbox) = tree_with_box();
        let subtree = single(&mut tree, "Button", "button1");
        let mut cmd = InsertWidgetCommand::new("Create", subtree, Some(vbox), None);
        cmd.execute(&mut tree).unwrap();
        assert!(matches!(
            cmd.execute(&mut tree),
            Err(CommandError::ExecutionFailed(_))
        ));
    }

    #[test]
    fn test_delete_command_restores_position() {
        let (mut tree, _, vbox) = tree_with_box();
        let a = single(&mut tree, "Button", "button1");
        let a = tree.attach(a, Some(vbox), None).unwrap();
        let b = single(&mut tree, "Button", "button2");
        let b = tree.attach(b, Some(vbox), None).unwrap();
        let before = tree.clone();

        let mut cmd = DeleteWidgetCommand::new(a, "button1");
        cmd.execute(&mut tree).unwrap();
        assert_eq!(tree.children(vbox).unwrap(), &[b]);

        cmd.undo(&mut tree).unwrap();
        assert_eq!(tree, before);
    }

    #[test]
    fn test_undo_without_execute_fails() {
        let (mut tree, window, _) = tree_with_box();
        let mut cmd = DeleteWidgetCommand::new(window, "window1");
        assert!(matches!(cmd.undo(&mut tree), Err(CommandError::UndoFailed(_))));

        let mut cmd = SetPropertyCommand::new(window, "window1", "title", "x".into());
        assert!(matches!(cmd.undo(&mut tree), Err(CommandError::UndoFailed(_))));
    }

    #[test]
    fn test_set_property_restores_unset_property() {
        let (mut tree, window, _) = tree_with_box();
        let mut cmd = SetPropertyCommand::new(window, "window1", "title", "Main".into());

        cmd.execute(&mut tree).unwrap();
        assert_eq!(
            tree.get(window).unwrap().property("title"),
            Some(&PropertyValue::from("Main"))
        );

        cmd.undo(&mut tree).unwrap();
        assert_eq!(tree.get(window).unwrap().property("title"), None);
    }

    #[test]
    fn test_set_property_collapse_keeps_original_value() {
        let (mut tree, window, _) = tree_with_box();
        tree.replace_property(window, "title", Some("Start".into()))
            .unwrap();

        let mut first = SetPropertyCommand::new(window, "window1", "title", "S".into());
        first.execute(&mut tree).unwrap();
        let mut second = SetPropertyCommand::new(window, "window1", "title", "St".into());
        second.execute(&mut tree).unwrap();

        assert!(first.unifies(&second));
        first.collapse(&second).unwrap();
        assert_eq!(first.new_value(), &PropertyValue::from("St"));

        first.undo(&mut tree).unwrap();
        assert_eq!(
            tree.get(window).unwrap().property("title"),
            Some(&PropertyValue::from("Start"))
        );
    }

    #[test]
    fn test_collapse_rejects_other_types() {
        let (_, window, _) = tree_with_box();
        let mut set = SetPropertyCommand::new(window, "window1", "title", "a".into());
        let rename = RenameWidgetCommand::new(window, "window1", "main");
        assert!(!set.unifies(&rename));
        assert!(matches!(
            set.collapse(&rename),
            Err(CommandError::CannotCollapse { .. })
        ));
    }

    #[test]
    fn test_move_collapse_returns_to_drag_start() {
        let (mut tree, window, vbox) = tree_with_box();
        let a = single(&mut tree, "Button", "button1");
        let a = tree.attach(a, Some(vbox), None).unwrap();
        let b = single(&mut tree, "Button", "button2");
        tree.attach(b, Some(vbox), None).unwrap();
        let before = tree.clone();

        let mut first = MoveWidgetCommand::new(a, "button1", Some(vbox), Some(1));
        first.execute(&mut tree).unwrap();
        let mut second = MoveWidgetCommand::new(a, "button1", Some(window), None);
        second.execute(&mut tree).unwrap();
        first.collapse(&second).unwrap();

        first.undo(&mut tree).unwrap();
        assert_eq!(tree, before);

        first.redo(&mut tree).unwrap();
        assert_eq!(tree.parent_of(a), Some(window));
    }

    #[test]
    fn test_rename_command() {
        let (mut tree, window, _) = tree_with_box();
        let mut cmd = RenameWidgetCommand::new(window, "window1", "main_window");
        cmd.execute(&mut tree).unwrap();
        assert_eq!(cmd.description(), "Rename window1 to main_window");
        assert_eq!(tree.find_by_name("main_window"), Some(window));
        cmd.undo(&mut tree).unwrap();
        assert_eq!(tree.find_by_name("window1"), Some(window));
    }

    #[test]
    fn test_signal_commands() {
        let (mut tree, window, _) = tree_with_box();
        let handler = SignalHandler::new("destroy", "on_quit");
        let mut add = AddSignalCommand::new(window, "window1", handler.clone());
        add.execute(&mut tree).unwrap();
        assert_eq!(tree.get(window).unwrap().signals, vec![handler.clone()]);

        let mut remove = RemoveSignalCommand::new(window, "window1", 0, &handler);
        remove.execute(&mut tree).unwrap();
        assert!(tree.get(window).unwrap().signals.is_empty());
        remove.undo(&mut tree).unwrap();
        assert_eq!(tree.get(window).unwrap().signals, vec![handler]);

        add.undo(&mut tree).unwrap();
        assert!(tree.get(window).unwrap().signals.is_empty());
    }

    #[test]
    fn test_command_list_rolls_back_on_failure() {
        let (mut tree, window, vbox) = tree_with_box();
        let before = tree.clone();

        let mut list = CommandList::new(
            "Broken",
            vec![
                Box::new(SetPropertyCommand::new(window, "window1", "title", "x".into())),
                Box::new(DeleteWidgetCommand::new(vbox, "box1")),
                // Already gone once the delete above ran
                Box::new(DeleteWidgetCommand::new(vbox, "box1")),
            ],
        );
        assert!(list.execute(&mut tree).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_command_list_round_trip() {
        let (mut tree, window, vbox) = tree_with_box();
        let before = tree.clone();

        let mut list = CommandList::new(
            "Edit",
            vec![
                Box::new(SetPropertyCommand::new(window, "window1", "title", "x".into())),
                Box::new(DeleteWidgetCommand::new(vbox, "box1")),
            ],
        );
        assert_eq!(list.len(), 2);
        list.execute(&mut tree).unwrap();
        let after = tree.clone();

        list.undo(&mut tree).unwrap();
        assert_eq!(tree, before);
        list.redo(&mut tree).unwrap();
        assert_eq!(tree, after);
    }
}
