// Project - one open document: its widget tree and its undo history

use crate::command::stack::UndoRedoStack;
use crate::config::HistoryConfig;
use crate::document::tree::WidgetTree;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
    /// Creation timestamp (RFC 3339)
    pub created: String,
    /// Last edit timestamp (RFC 3339)
    pub modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl ProjectMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            name: name.into(),
            created: now.clone(),
            modified: now,
            author: None,
        }
    }

    pub fn touch(&mut self) {
        self.modified = chrono::Utc::now().to_rfc3339();
    }
}

/// An open project
///
/// The history lives and dies with the project: closing a project drops its
/// undo/redo stack.
#[derive(Debug)]
pub struct Project {
    id: Uuid,
    pub metadata: ProjectMetadata,
    tree: WidgetTree,
    history: UndoRedoStack,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_history(name, UndoRedoStack::new())
    }

    pub fn from_config(name: impl Into<String>, config: &HistoryConfig) -> Self {
        Self::with_history(name, UndoRedoStack::from_config(config))
    }

    pub fn with_history(name: impl Into<String>, history: UndoRedoStack) -> Self {
        Self {
            id: Uuid::new_v4(),
            metadata: ProjectMetadata::new(name),
            tree: WidgetTree::new(),
            history,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn history(&self) -> &UndoRedoStack {
        &self.history
    }

    /// Direct history access, e.g. to change the coalescing policy
    pub fn history_mut(&mut self) -> &mut UndoRedoStack {
        &mut self.history
    }

    /// Unsaved edits exist
    pub fn is_modified(&self) -> bool {
        self.history.is_dirty()
    }

    /// Record the current state as saved
    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    // Edits outside of commands would desync the history; only the command
    // manager (and id allocation for pending subtrees) goes through these.
    pub(crate) fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut WidgetTree, &mut UndoRedoStack) {
        (&mut self.tree, &mut self.history)
    }
}
