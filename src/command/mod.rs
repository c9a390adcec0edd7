// Command Pattern for Undo/Redo functionality
//
// Every edit of a project's widget tree goes through a Command so it can be
// undone and redone.
//
// Architecture:
// - Command trait: execute(), undo(), redo(), description(), merge hooks
// - UndoRedoStack: per-project undo/redo lists with depth limit and save point
// - CoalescePolicy: which successive commands collapse into one history entry
// - CommandManager: validates UI requests, builds and runs commands
// - Concrete commands: InsertWidgetCommand, SetPropertyCommand, etc.

pub mod commands;
pub mod manager;
pub mod policy;
pub mod stack;
pub mod trait_def;

pub use commands::{
    AddSignalCommand, CommandList, DeleteWidgetCommand, InsertWidgetCommand, MoveWidgetCommand,
    RemoveSignalCommand, RenameWidgetCommand, SetPropertyCommand,
};
pub use manager::CommandManager;
pub use policy::CoalescePolicy;
pub use stack::{DEFAULT_MAX_DEPTH, Pushed, UndoRedoStack};
pub use trait_def::{Command, CommandError, CommandResult, MergeKey};
