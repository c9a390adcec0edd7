// MyForm Designer - Library exports for the designer front-end, tests and benchmarks

pub mod app;
pub mod clipboard;
pub mod command;
pub mod config;
pub mod document;
pub mod registry;

// Re-export commonly used types for convenience
pub use app::DesignerContext;
pub use clipboard::{Clipboard, ClipboardError, ClipboardItem};
pub use command::{
    CoalescePolicy, Command, CommandError, CommandManager, CommandResult, MergeKey, Pushed,
    UndoRedoStack,
};
pub use config::{ClipboardConfig, ConfigError, DesignerConfig, HistoryConfig};
pub use document::{
    Project, PropertyValue, SignalHandler, Widget, WidgetId, WidgetSnapshot, WidgetTree,
};
pub use registry::{AdaptorRegistry, RegistryError, WidgetAdaptor};
