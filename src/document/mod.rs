// Document model edited by commands
//
// A Project owns a WidgetTree (the edited document) and its UndoRedoStack.
// Widgets are plain data; what a class of widget may contain or which
// properties it has is described by the adaptor registry.

pub mod project;
pub mod property;
pub mod snapshot;
pub mod tree;
pub mod widget;

pub use project::{Project, ProjectMetadata};
pub use property::PropertyValue;
pub use snapshot::WidgetSnapshot;
pub use tree::{Detached, Slot, Subtree, TreeError, WidgetTree};
pub use widget::{SignalHandler, Widget, WidgetId};
