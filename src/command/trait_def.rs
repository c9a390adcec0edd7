// Command trait definition

use crate::clipboard::ClipboardError;
use crate::document::tree::{TreeError, WidgetTree};
use crate::document::widget::WidgetId;
use crate::registry::RegistryError;
use std::any::Any;
use uuid::Uuid;

/// Result type for command operations
pub type CommandResult<T> = Result<T, CommandError>;

/// Errors that can occur while building or running commands
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Command execution failed
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Undo operation failed
    #[error("Undo failed: {0}")]
    UndoFailed(String),

    /// Invalid state for this operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Cannot collapse '{incoming}' into '{target}'")]
    CannotCollapse { target: String, incoming: String },

    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("Invalid widget name '{0}'")]
    InvalidName(String),

    #[error("No active project")]
    NoActiveProject,

    #[error("Unknown project {0}")]
    UnknownProject(Uuid),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Identifies the stream of edits a command belongs to
///
/// Two adjacent commands with equal keys are candidates for coalescing,
/// e.g. every step of a slider drag on the same property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MergeKey {
    Property { widget: WidgetId, property: String },
    Move { widget: WidgetId },
}

/// A reversible edit of a project's widget tree
///
/// Commands capture whatever they need to reverse themselves the first time
/// they execute. Once pushed, a command is owned by the project's
/// `UndoRedoStack`.
///
/// # Example
/// ```no_run
/// use myform_designer::command::{Command, CommandResult};
/// use myform_designer::document::WidgetTree;
/// use std::any::Any;
///
/// struct Noop;
///
/// impl Command for Noop {
///     fn execute(&mut self, _tree: &mut WidgetTree) -> CommandResult<()> {
///         Ok(())
///     }
///
///     fn undo(&mut self, _tree: &mut WidgetTree) -> CommandResult<()> {
///         Ok(())
///     }
///
///     fn description(&self) -> String {
///         "Nothing".to_string()
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
/// ```
pub trait Command: Send {
    /// Apply the edit and remember the previous state
    fn execute(&mut self, tree: &mut WidgetTree) -> CommandResult<()>;

    /// Restore the state from before `execute`
    fn undo(&mut self, tree: &mut WidgetTree) -> CommandResult<()>;

    /// Re-apply after an undo. Defaults to `execute`.
    fn redo(&mut self, tree: &mut WidgetTree) -> CommandResult<()> {
        self.execute(tree)
    }

    /// Human-readable label, e.g. "Set label of button1"
    fn description(&self) -> String;

    /// Edit stream used by the coalescing policy; `None` never coalesces
    fn merge_key(&self) -> Option<MergeKey> {
        None
    }

    /// Whether `other` continues the same edit as `self`
    fn unifies(&self, other: &dyn Command) -> bool {
        match (self.merge_key(), other.merge_key()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Absorb `other` into `self`: keep our "before" state, take its "after" state
    ///
    /// `other` has already been executed. Only called when `unifies` holds.
    fn collapse(&mut self, other: &dyn Command) -> CommandResult<()> {
        Err(CommandError::CannotCollapse {
            target: self.description(),
            incoming: other.description(),
        })
    }

    fn as_any(&self) -> &dyn Any;
}
