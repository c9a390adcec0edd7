// CommandManager - builds commands for UI actions and runs them against a project

use crate::clipboard::Clipboard;
use crate::command::commands::{
    AddSignalCommand, CommandList, DeleteWidgetCommand, InsertWidgetCommand, MoveWidgetCommand,
    RemoveSignalCommand, RenameWidgetCommand, SetPropertyCommand,
};
use crate::command::stack::Pushed;
use crate::command::trait_def::{Command, CommandError, CommandResult};
use crate::document::project::Project;
use crate::document::property::PropertyValue;
use crate::document::snapshot::WidgetSnapshot;
use crate::document::tree::{TreeError, WidgetTree};
use crate::document::widget::{SignalHandler, WidgetId};
use crate::registry::{AdaptorRegistry, RegistryError};
use log::{debug, trace, warn};
use std::collections::HashSet;

/// Facade used by menu actions, keyboard shortcuts and property editors
///
/// Every edit is turned into a `Command`, executed against the project's
/// widget tree and pushed onto the project's `UndoRedoStack`:
/// 1. Validate the request against the registry
/// 2. Execute the command
/// 3. Push it to the undo history (this clears the redo history)
///
/// A command that fails to execute is never recorded.
pub struct CommandManager<'r> {
    registry: &'r AdaptorRegistry,
}

impl<'r> CommandManager<'r> {
    pub fn new(registry: &'r AdaptorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r AdaptorRegistry {
        self.registry
    }

    /// Execute a command and record it in the project's history
    ///
    /// # Errors
    /// Returns the command's own error; the history is left unchanged then.
    pub fn execute(&self, project: &mut Project, mut command: Box<dyn Command>) -> CommandResult<Pushed> {
        let (tree, history) = project.parts_mut();
        command.execute(tree)?;

        let description = command.description();
        let pushed = history.push_undo(command);
        debug!("Executed '{}' ({:?})", description, pushed);

        project.metadata.touch();
        Ok(pushed)
    }

    /// Undo the last command
    ///
    /// Returns the description of the undone command, or `None` when there is
    /// nothing to undo.
    ///
    /// # Errors
    /// If the command's undo fails, it is put back on the undo history and the
    /// error is returned.
    pub fn undo(&self, project: &mut Project) -> CommandResult<Option<String>> {
        let (tree, history) = project.parts_mut();
        let Some(command) = history.pop_undo() else {
            trace!("Nothing to undo");
            return Ok(None);
        };

        let description = command.description();
        if let Err(err) = command.undo(tree) {
            warn!("Undo of '{}' failed: {}", description, err);
            history.pop_redo();
            return Err(err);
        }

        debug!("Undo: {}", description);
        project.metadata.touch();
        Ok(Some(description))
    }

    /// Redo the last undone command
    pub fn redo(&self, project: &mut Project) -> CommandResult<Option<String>> {
        let (tree, history) = project.parts_mut();
        let Some(command) = history.pop_redo() else {
            trace!("Nothing to redo");
            return Ok(None);
        };

        let description = command.description();
        if let Err(err) = command.redo(tree) {
            warn!("Redo of '{}' failed: {}", description, err);
            history.pop_undo();
            return Err(err);
        }

        debug!("Redo: {}", description);
        project.metadata.touch();
        Ok(Some(description))
    }

    /// Create a widget of `class` under `parent` (None for a toplevel)
    pub fn create(
        &self,
        project: &mut Project,
        class: &str,
        parent: Option<WidgetId>,
        position: Option<usize>,
    ) -> CommandResult<WidgetId> {
        self.check_placement(project.tree(), class, parent, None)?;

        let subtree = self.registry.build_widget(project.tree_mut(), class)?;
        let command = InsertWidgetCommand::new("Create", subtree, parent, position);
        let id = command.root();
        self.execute(project, Box::new(command))?;
        Ok(id)
    }

    /// Delete widgets with their descendants as one undoable step
    ///
    /// Widgets whose ancestor is also selected are covered by the ancestor.
    /// An empty selection does nothing.
    pub fn delete(&self, project: &mut Project, widgets: &[WidgetId]) -> CommandResult<()> {
        let tree = project.tree();
        if let Some(missing) = widgets.iter().find(|id| !tree.contains(**id)) {
            return Err(TreeError::UnknownWidget(*missing).into());
        }

        let mut seen = HashSet::new();
        let roots: Vec<WidgetId> = widgets
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .filter(|id| !widgets.iter().any(|other| tree.is_ancestor(*other, *id)))
            .collect();

        let mut commands: Vec<Box<dyn Command>> = Vec::with_capacity(roots.len());
        for id in &roots {
            commands.push(Box::new(DeleteWidgetCommand::new(*id, widget_name(tree, *id)?)));
        }

        let command: Box<dyn Command> = match commands.len() {
            0 => return Ok(()),
            1 => commands.remove(0),
            n => Box::new(CommandList::new(format!("Delete {} widgets", n), commands)),
        };
        self.execute(project, command)?;
        Ok(())
    }

    /// Set a property after validating it; setting the current value is a no-op
    pub fn set_property(
        &self,
        project: &mut Project,
        widget: WidgetId,
        property: &str,
        value: PropertyValue,
    ) -> CommandResult<()> {
        let current = project
            .tree()
            .get(widget)
            .ok_or(TreeError::UnknownWidget(widget))?;
        self.registry
            .validate_property(&current.class_name, property, &value)?;

        if current.property(property) == Some(&value) {
            trace!("{} of {} already is {}", property, current.name, value);
            return Ok(());
        }

        let command = SetPropertyCommand::new(widget, current.name.clone(), property, value);
        self.execute(project, Box::new(command))?;
        Ok(())
    }

    /// Rename a widget; names must be non-empty, without whitespace and unique
    pub fn rename(&self, project: &mut Project, widget: WidgetId, name: &str) -> CommandResult<()> {
        let tree = project.tree();
        let current = widget_name(tree, widget)?;
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(CommandError::InvalidName(name.to_string()));
        }
        if current == name {
            return Ok(());
        }
        if tree.find_by_name(name).is_some() {
            return Err(TreeError::DuplicateName(name.to_string()).into());
        }

        self.execute(project, Box::new(RenameWidgetCommand::new(widget, current, name)))?;
        Ok(())
    }

    /// Reparent or reorder a widget
    ///
    /// Successive moves of the same widget coalesce (per the project's policy)
    /// so a drag is undone in one step.
    pub fn move_widget(
        &self,
        project: &mut Project,
        widget: WidgetId,
        new_parent: Option<WidgetId>,
        position: Option<usize>,
    ) -> CommandResult<()> {
        let tree = project.tree();
        let current = tree.get(widget).ok_or(TreeError::UnknownWidget(widget))?;
        if let Some(target) = new_parent {
            if target == widget || tree.is_ancestor(widget, target) {
                return Err(TreeError::Cycle { widget, target }.into());
            }
        }
        self.check_placement(tree, &current.class_name, new_parent, Some(widget))?;

        let slot = tree.slot_of(widget)?;
        if slot.parent == new_parent {
            let siblings = match new_parent {
                Some(parent) => tree.children(parent)?.len(),
                None => tree.toplevels().len(),
            };
            // The widget leaves its slot before being reinserted
            let len = siblings.saturating_sub(1);
            if position.unwrap_or(len).min(len) == slot.position {
                trace!("'{}' is already in place", current.name);
                return Ok(());
            }
        }

        let command = MoveWidgetCommand::new(widget, current.name.clone(), new_parent, position);
        self.execute(project, Box::new(command))?;
        Ok(())
    }

    /// Connect a handler to one of the widget's signals
    pub fn add_signal(
        &self,
        project: &mut Project,
        widget: WidgetId,
        handler: SignalHandler,
    ) -> CommandResult<()> {
        let current = project
            .tree()
            .get(widget)
            .ok_or(TreeError::UnknownWidget(widget))?;
        if !self.registry.has_signal(&current.class_name, &handler.signal)? {
            return Err(RegistryError::UnknownSignal {
                class: current.class_name.clone(),
                signal: handler.signal,
            }
            .into());
        }
        if handler.handler.trim().is_empty() {
            return Err(CommandError::InvalidState("Handler name is empty".into()));
        }

        let command = AddSignalCommand::new(widget, current.name.clone(), handler);
        self.execute(project, Box::new(command))?;
        Ok(())
    }

    /// Disconnect the first handler named `handler` from `signal`
    pub fn remove_signal(
        &self,
        project: &mut Project,
        widget: WidgetId,
        signal: &str,
        handler: &str,
    ) -> CommandResult<()> {
        let current = project
            .tree()
            .get(widget)
            .ok_or(TreeError::UnknownWidget(widget))?;
        let index = current
            .signals
            .iter()
            .position(|s| s.signal == signal && s.handler == handler)
            .ok_or_else(|| {
                CommandError::InvalidState(format!(
                    "{} has no handler '{}' for '{}'",
                    current.name, handler, signal
                ))
            })?;

        let command =
            RemoveSignalCommand::new(widget, current.name.clone(), index, &current.signals[index]);
        self.execute(project, Box::new(command))?;
        Ok(())
    }

    /// Copy a widget subtree to the clipboard (not undoable)
    pub fn copy(&self, project: &Project, clipboard: &mut Clipboard, widget: WidgetId) -> CommandResult<()> {
        let snapshot = WidgetSnapshot::capture(project.tree(), widget)?;
        clipboard.add(&snapshot)?;
        Ok(())
    }

    /// Copy a widget to the clipboard and delete it as one undoable step
    pub fn cut(
        &self,
        project: &mut Project,
        clipboard: &mut Clipboard,
        widget: WidgetId,
    ) -> CommandResult<()> {
        self.copy(project, clipboard, widget)?;
        let name = widget_name(project.tree(), widget)?;
        self.execute(project, Box::new(DeleteWidgetCommand::with_verb("Cut", widget, name)))?;
        Ok(())
    }

    /// Paste the selected clipboard item under `parent`
    pub fn paste(
        &self,
        project: &mut Project,
        clipboard: &Clipboard,
        parent: Option<WidgetId>,
        position: Option<usize>,
    ) -> CommandResult<WidgetId> {
        let snapshot = clipboard.selected()?.snapshot()?;
        for class in snapshot.class_names() {
            self.registry.adaptor(class)?;
        }
        self.check_placement(project.tree(), &snapshot.class_name, parent, None)?;

        let subtree = snapshot.instantiate(project.tree_mut());
        let command = InsertWidgetCommand::new("Paste", subtree, parent, position);
        let id = command.root();
        self.execute(project, Box::new(command))?;
        Ok(id)
    }

    /// Check that a widget of `class` may live under `parent`
    ///
    /// `moving` is the widget being moved, which does not count against the
    /// parent's capacity if it already lives there.
    fn check_placement(
        &self,
        tree: &WidgetTree,
        class: &str,
        parent: Option<WidgetId>,
        moving: Option<WidgetId>,
    ) -> CommandResult<()> {
        let adaptor = self.registry.adaptor(class)?;
        let Some(parent_id) = parent else {
            if adaptor.is_toplevel() {
                return Ok(());
            }
            return Err(CommandError::InvalidPlacement(format!(
                "{} must be placed inside a container",
                class
            )));
        };

        if adaptor.is_toplevel() {
            return Err(CommandError::InvalidPlacement(format!(
                "{} is a toplevel and cannot be placed inside another widget",
                class
            )));
        }

        let parent = tree
            .get(parent_id)
            .ok_or(TreeError::UnknownWidget(parent_id))?;
        let parent_adaptor = self.registry.adaptor(&parent.class_name)?;
        let occupied = parent
            .children()
            .iter()
            .filter(|child| Some(**child) != moving)
            .count();

        match parent_adaptor.max_children() {
            Some(0) => Err(CommandError::InvalidPlacement(format!(
                "{} is not a container",
                parent.name
            ))),
            Some(max) if occupied >= max => Err(CommandError::InvalidPlacement(format!(
                "{} is full",
                parent.name
            ))),
            _ if !parent_adaptor.accepts_child(class) => Err(CommandError::InvalidPlacement(
                format!("{} does not accept {}", parent.name, class),
            )),
            _ => Ok(()),
        }
    }
}

fn widget_name(tree: &WidgetTree, id: WidgetId) -> CommandResult<String> {
    tree.get(id)
        .map(|w| w.name.clone())
        .ok_or_else(|| TreeError::UnknownWidget(id).into())
}
