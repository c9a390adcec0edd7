// DesignerContext - application state shared by every editing action

use crate::clipboard::Clipboard;
use crate::command::manager::CommandManager;
use crate::command::trait_def::{CommandError, CommandResult};
use crate::config::DesignerConfig;
use crate::document::project::Project;
use crate::document::property::PropertyValue;
use crate::document::widget::{SignalHandler, WidgetId};
use crate::registry::AdaptorRegistry;
use log::info;
use uuid::Uuid;

/// Owns the configuration, the adaptor registry, the clipboard and every
/// open project, and routes edits to the active one
///
/// Each project carries its own undo history, so switching projects switches
/// what Undo and Redo act on.
#[derive(Debug)]
pub struct DesignerContext {
    config: DesignerConfig,
    registry: AdaptorRegistry,
    clipboard: Clipboard,
    projects: Vec<Project>,
    active: Option<Uuid>,
}

impl DesignerContext {
    pub fn new(config: DesignerConfig) -> Self {
        Self::with_registry(config, AdaptorRegistry::with_builtin())
    }

    pub fn with_registry(config: DesignerConfig, registry: AdaptorRegistry) -> Self {
        let clipboard = Clipboard::from_config(&config.clipboard);
        Self {
            config,
            registry,
            clipboard,
            projects: Vec::new(),
            active: None,
        }
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    pub fn registry(&self) -> &AdaptorRegistry {
        &self.registry
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut Clipboard {
        &mut self.clipboard
    }

    /// Open a new empty project and make it active
    pub fn new_project(&mut self, name: impl Into<String>) -> Uuid {
        let project = Project::from_config(name, &self.config.history);
        let id = project.id();
        info!("Opened project '{}' ({})", project.name(), id);
        self.projects.push(project);
        self.active = Some(id);
        id
    }

    /// Close a project, dropping its history
    ///
    /// If it was active, the most recently opened remaining project becomes
    /// active.
    pub fn close_project(&mut self, id: Uuid) -> CommandResult<Project> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id() == id)
            .ok_or(CommandError::UnknownProject(id))?;
        let project = self.projects.remove(index);
        info!("Closed project '{}' ({})", project.name(), id);

        if self.active == Some(id) {
            self.active = self.projects.last().map(Project::id);
        }
        Ok(project)
    }

    pub fn set_active(&mut self, id: Uuid) -> CommandResult<()> {
        if !self.projects.iter().any(|p| p.id() == id) {
            return Err(CommandError::UnknownProject(id));
        }
        self.active = Some(id);
        Ok(())
    }

    pub fn active_id(&self) -> Option<Uuid> {
        self.active
    }

    pub fn active_project(&self) -> Option<&Project> {
        let id = self.active?;
        self.projects.iter().find(|p| p.id() == id)
    }

    pub fn active_project_mut(&mut self) -> Option<&mut Project> {
        let id = self.active?;
        self.projects.iter_mut().find(|p| p.id() == id)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Undo in the active project; a no-op without one
    pub fn undo(&mut self) -> CommandResult<Option<String>> {
        match self.with_active(|manager, project, _| manager.undo(project)) {
            Err(CommandError::NoActiveProject) => Ok(None),
            other => other,
        }
    }

    /// Redo in the active project; a no-op without one
    pub fn redo(&mut self) -> CommandResult<Option<String>> {
        match self.with_active(|manager, project, _| manager.redo(project)) {
            Err(CommandError::NoActiveProject) => Ok(None),
            other => other,
        }
    }

    /// Menu label for Undo, e.g. "Undo: Set label of button1"
    pub fn undo_label(&self) -> Option<String> {
        let description = self.active_project()?.history().undo_info()?;
        Some(format!("Undo: {}", description))
    }

    pub fn redo_label(&self) -> Option<String> {
        let description = self.active_project()?.history().redo_info()?;
        Some(format!("Redo: {}", description))
    }

    pub fn create(
        &mut self,
        class: &str,
        parent: Option<WidgetId>,
        position: Option<usize>,
    ) -> CommandResult<WidgetId> {
        self.with_active(|manager, project, _| manager.create(project, class, parent, position))
    }

    pub fn delete(&mut self, widgets: &[WidgetId]) -> CommandResult<()> {
        self.with_active(|manager, project, _| manager.delete(project, widgets))
    }

    pub fn set_property(
        &mut self,
        widget: WidgetId,
        property: &str,
        value: PropertyValue,
    ) -> CommandResult<()> {
        self.with_active(|manager, project, _| {
            manager.set_property(project, widget, property, value)
        })
    }

    pub fn rename(&mut self, widget: WidgetId, name: &str) -> CommandResult<()> {
        self.with_active(|manager, project, _| manager.rename(project, widget, name))
    }

    pub fn move_widget(
        &mut self,
        widget: WidgetId,
        new_parent: Option<WidgetId>,
        position: Option<usize>,
    ) -> CommandResult<()> {
        self.with_active(|manager, project, _| {
            manager.move_widget(project, widget, new_parent, position)
        })
    }

    pub fn add_signal(&mut self, widget: WidgetId, handler: SignalHandler) -> CommandResult<()> {
        self.with_active(|manager, project, _| manager.add_signal(project, widget, handler))
    }

    pub fn remove_signal(&mut self, widget: WidgetId, signal: &str, handler: &str) -> CommandResult<()> {
        self.with_active(|manager, project, _| {
            manager.remove_signal(project, widget, signal, handler)
        })
    }

    pub fn copy(&mut self, widget: WidgetId) -> CommandResult<()> {
        self.with_active(|manager, project, clipboard| manager.copy(project, clipboard, widget))
    }

    pub fn cut(&mut self, widget: WidgetId) -> CommandResult<()> {
        self.with_active(|manager, project, clipboard| manager.cut(project, clipboard, widget))
    }

    pub fn paste(
        &mut self,
        parent: Option<WidgetId>,
        position: Option<usize>,
    ) -> CommandResult<WidgetId> {
        self.with_active(|manager, project, clipboard| {
            manager.paste(project, clipboard, parent, position)
        })
    }

    // Splits the borrow: the manager reads the registry while the project and
    // clipboard are mutated.
    fn with_active<T>(
        &mut self,
        f: impl FnOnce(&CommandManager<'_>, &mut Project, &mut Clipboard) -> CommandResult<T>,
    ) -> CommandResult<T> {
        let id = self.active.ok_or(CommandError::NoActiveProject)?;
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or(CommandError::UnknownProject(id))?;
        let manager = CommandManager::new(&self.registry);
        f(&manager, project, &mut self.clipboard)
    }
}

impl Default for DesignerContext {
    fn default() -> Self {
        Self::new(DesignerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with_box() -> (DesignerContext, WidgetId, WidgetId) {
        let mut ctx = DesignerContext::default();
        ctx.new_project("Form");
        let window = ctx.create("Window", None, None).unwrap();
        let vbox = ctx.create("Box", Some(window), None).unwrap();
        (ctx, window, vbox)
    }

    #[test]
    fn test_no_active_project() {
        let mut ctx = DesignerContext::default();
        assert_eq!(ctx.undo().unwrap(), None);
        assert_eq!(ctx.redo().unwrap(), None);
        assert_eq!(ctx.undo_label(), None);
        assert!(matches!(
            ctx.create("Window", None, None),
            Err(CommandError::NoActiveProject)
        ));
    }

    #[test]
    fn test_labels() {
        let (mut ctx, _, vbox) = context_with_box();
        ctx.set_property(vbox, "spacing", PropertyValue::Int(6)).unwrap();
        assert_eq!(ctx.undo_label().as_deref(), Some("Undo: Set spacing of box1"));
        assert_eq!(ctx.redo_label(), None);

        ctx.undo().unwrap();
        assert_eq!(ctx.redo_label().as_deref(), Some("Redo: Set spacing of box1"));
        assert_eq!(ctx.undo_label().as_deref(), Some("Undo: Create box1"));
    }

    #[test]
    fn test_histories_are_per_project() {
        let (mut ctx, _, _) = context_with_box();
        let first = ctx.active_id().unwrap();
        let second = ctx.new_project("Other");
        assert!(ctx.undo_label().is_none());

        ctx.create("Dialog", None, None).unwrap();
        ctx.set_active(first).unwrap();
        assert_eq!(ctx.undo_label().as_deref(), Some("Undo: Create box1"));

        ctx.set_active(second).unwrap();
        ctx.undo().unwrap();
        assert!(ctx.active_project().unwrap().tree().is_empty());
        assert_eq!(ctx.projects()[0].tree().len(), 2);
    }

    #[test]
    fn test_close_project() {
        let (mut ctx, _, _) = context_with_box();
        let first = ctx.active_id().unwrap();
        let second = ctx.new_project("Other");

        let closed = ctx.close_project(second).unwrap();
        assert_eq!(closed.name(), "Other");
        assert_eq!(ctx.active_id(), Some(first));

        ctx.close_project(first).unwrap();
        assert_eq!(ctx.active_id(), None);
        assert!(matches!(
            ctx.close_project(first),
            Err(CommandError::UnknownProject(_))
        ));
        assert!(matches!(
            ctx.set_active(first),
            Err(CommandError::UnknownProject(_))
        ));
    }

    #[test]
    fn test_clipboard_between_projects() {
        let (mut ctx, _, vbox) = context_with_box();
        let button = ctx.create("Button", Some(vbox), None).unwrap();
        ctx.copy(button).unwrap();

        ctx.new_project("Other");
        let window = ctx.create("Window", None, None).unwrap();
        let frame = ctx.create("Frame", Some(window), None).unwrap();
        let pasted = ctx.paste(Some(frame), None).unwrap();

        let tree = ctx.active_project().unwrap().tree();
        assert_eq!(tree.get(pasted).unwrap().name, "button1");
        assert_eq!(tree.children(frame).unwrap(), &[pasted]);
    }

    #[test]
    fn test_config_applies_to_new_projects() {
        let mut config = DesignerConfig::default();
        config.history.max_depth = 2;
        config.clipboard.capacity = 1;
        let mut ctx = DesignerContext::new(config);
        ctx.new_project("Form");

        let window = ctx.create("Window", None, None).unwrap();
        let vbox = ctx.create("Box", Some(window), None).unwrap();
        ctx.create("Button", Some(vbox), None).unwrap();
        assert_eq!(ctx.active_project().unwrap().history().undo_len(), 2);

        ctx.copy(vbox).unwrap();
        ctx.copy(window).unwrap();
        assert_eq!(ctx.clipboard().len(), 1);
    }
}
