// UndoRedoStack - per-project undo/redo history

use crate::command::policy::CoalescePolicy;
use crate::command::trait_def::Command;
use crate::config::HistoryConfig;
use log::debug;
use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

/// Default maximum number of entries kept in the undo history
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Outcome of `UndoRedoStack::push_undo`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pushed {
    /// A new history entry was added
    Appended,
    /// The top entry absorbed the command; history length is unchanged
    Collapsed,
}

struct HistoryEntry {
    /// Unique per state the document can be in; used for save-point tracking
    serial: u64,
    recorded_at: Instant,
    command: Box<dyn Command>,
}

/// Linear undo/redo history of one project
///
/// Both lists keep the most recent entry last. Pushing a new command always
/// clears the redo list: history branches are not kept.
///
/// The stack never runs commands itself; `CommandManager` executes a command
/// before pushing it and calls `undo`/`redo` on what `pop_undo`/`pop_redo`
/// hand back.
pub struct UndoRedoStack {
    undo_list: VecDeque<HistoryEntry>,
    redo_list: Vec<HistoryEntry>,
    /// 0 means unlimited
    max_depth: usize,
    policy: CoalescePolicy,
    next_serial: u64,
    /// Serial of the state reached by undoing everything that is left
    base_serial: u64,
    saved_serial: u64,
}

impl UndoRedoStack {
    pub fn new() -> Self {
        Self::with_policy(DEFAULT_MAX_DEPTH, CoalescePolicy::default())
    }

    pub fn with_policy(max_depth: usize, policy: CoalescePolicy) -> Self {
        Self {
            undo_list: VecDeque::new(),
            redo_list: Vec::new(),
            max_depth,
            policy,
            next_serial: 1,
            base_serial: 0,
            saved_serial: 0,
        }
    }

    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::with_policy(config.max_depth, config.coalesce.clone())
    }

    /// Record an already executed command
    ///
    /// If the top entry unifies with `command` under the current policy, the
    /// top entry collapses it instead of growing the history. The redo list is
    /// cleared either way.
    pub fn push_undo(&mut self, command: Box<dyn Command>) -> Pushed {
        self.redo_list.clear();

        if let Some(top) = self.undo_list.back_mut() {
            let age = top.recorded_at.elapsed();
            if self.policy.allows(top.command.as_ref(), age, command.as_ref()) {
                match top.command.collapse(command.as_ref()) {
                    Ok(()) => {
                        top.serial = self.next_serial;
                        top.recorded_at = Instant::now();
                        self.next_serial += 1;
                        debug!("Collapsed '{}' into top of history", command.description());
                        return Pushed::Collapsed;
                    }
                    Err(err) => debug!("Not collapsing: {}", err),
                }
            }
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        self.undo_list.push_back(HistoryEntry {
            serial,
            recorded_at: Instant::now(),
            command,
        });
        self.trim();
        Pushed::Appended
    }

    /// Move the most recent undo entry to the redo list and return it
    ///
    /// Returns `None` and leaves the stack untouched when there is nothing to undo.
    pub fn pop_undo(&mut self) -> Option<&mut (dyn Command + 'static)> {
        let entry = self.undo_list.pop_back()?;
        self.redo_list.push(entry);
        self.redo_list.last_mut().map(|e| e.command.as_mut())
    }

    /// Move the most recent redo entry back to the undo list and return it
    pub fn pop_redo(&mut self) -> Option<&mut (dyn Command + 'static)> {
        let entry = self.redo_list.pop()?;
        self.undo_list.push_back(entry);
        self.undo_list.back_mut().map(|e| e.command.as_mut())
    }

    pub fn has_undo(&self) -> bool {
        !self.undo_list.is_empty()
    }

    pub fn has_redo(&self) -> bool {
        !self.redo_list.is_empty()
    }

    /// Description of the command the next undo would revert
    pub fn undo_info(&self) -> Option<String> {
        self.undo_list.back().map(|e| e.command.description())
    }

    /// Description of the command the next redo would re-apply
    pub fn redo_info(&self) -> Option<String> {
        self.redo_list.last().map(|e| e.command.description())
    }

    pub fn undo_len(&self) -> usize {
        self.undo_list.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_list.len()
    }

    /// Undo history, most recent first
    pub fn undo_descriptions(&self) -> Vec<String> {
        self.undo_list
            .iter()
            .rev()
            .map(|e| e.command.description())
            .collect()
    }

    /// Redo history, next redo first
    pub fn redo_descriptions(&self) -> Vec<String> {
        self.redo_list
            .iter()
            .rev()
            .map(|e| e.command.description())
            .collect()
    }

    /// Forget all history. The dirty flag is kept.
    pub fn clear(&mut self) {
        self.base_serial = self.current_serial();
        self.undo_list.clear();
        self.redo_list.clear();
    }

    pub fn policy(&self) -> &CoalescePolicy {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: CoalescePolicy) {
        self.policy = policy;
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
        self.trim();
    }

    /// Remember the current state as the saved one
    pub fn mark_saved(&mut self) {
        self.saved_serial = self.current_serial();
    }

    /// True when the document differs from the last saved state
    pub fn is_dirty(&self) -> bool {
        self.current_serial() != self.saved_serial
    }

    fn current_serial(&self) -> u64 {
        self.undo_list
            .back()
            .map(|e| e.serial)
            .unwrap_or(self.base_serial)
    }

    fn trim(&mut self) {
        if self.max_depth == 0 {
            return;
        }
        while self.undo_list.len() > self.max_depth {
            if let Some(dropped) = self.undo_list.pop_front() {
                debug!("History full, dropping '{}'", dropped.command.description());
                self.base_serial = dropped.serial;
            }
        }
    }
}

impl Default for UndoRedoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UndoRedoStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoRedoStack")
            .field("undo", &self.undo_descriptions())
            .field("redo", &self.redo_descriptions())
            .field("max_depth", &self.max_depth)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::trait_def::{CommandResult, MergeKey};
    use crate::document::{WidgetId, WidgetTree};
    use std::any::Any;

    // Mock command: `key` drives coalescing, `value` is what collapse takes over
    struct MockCommand {
        name: &'static str,
        key: Option<u64>,
        value: i32,
    }

    impl MockCommand {
        fn plain(name: &'static str) -> Box<Self> {
            Box::new(Self {
                name,
                key: None,
                value: 0,
            })
        }

        fn drag(key: u64, value: i32) -> Box<Self> {
            Box::new(Self {
                name: "Drag",
                key: Some(key),
                value,
            })
        }
    }

    impl Command for MockCommand {
        fn execute(&mut self, _tree: &mut WidgetTree) -> CommandResult<()> {
            Ok(())
        }

        fn undo(&mut self, _tree: &mut WidgetTree) -> CommandResult<()> {
            Ok(())
        }

        fn description(&self) -> String {
            format!("{} {}", self.name, self.value)
        }

        fn merge_key(&self) -> Option<MergeKey> {
            self.key.map(|k| MergeKey::Move {
                widget: WidgetId(k),
            })
        }

        fn collapse(&mut self, other: &dyn Command) -> CommandResult<()> {
            if let Some(other) = other.as_any().downcast_ref::<MockCommand>() {
                self.value = other.value;
            }
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_push_and_pop() {
        let mut stack = UndoRedoStack::new();
        assert_eq!(stack.push_undo(MockCommand::plain("A")), Pushed::Appended);
        assert!(stack.has_undo());
        assert!(!stack.has_redo());

        let popped = stack.pop_undo().map(|c| c.description());
        assert_eq!(popped.as_deref(), Some("A 0"));
        assert!(!stack.has_undo());
        assert_eq!(stack.redo_info().as_deref(), Some("A 0"));

        stack.pop_redo();
        assert_eq!(stack.undo_info().as_deref(), Some("A 0"));
        assert!(!stack.has_redo());
    }

    #[test]
    fn test_pop_on_empty_is_noop() {
        let mut stack = UndoRedoStack::new();
        assert!(stack.pop_undo().is_none());
        assert!(stack.pop_redo().is_none());
        assert_eq!(stack.undo_len(), 0);
        assert_eq!(stack.redo_len(), 0);
        assert!(!stack.is_dirty());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut stack = UndoRedoStack::new();
        stack.push_undo(MockCommand::plain("A"));
        stack.push_undo(MockCommand::plain("B"));
        stack.pop_undo();
        assert_eq!(stack.redo_descriptions(), vec!["B 0"]);

        stack.push_undo(MockCommand::plain("C"));
        assert!(!stack.has_redo());
        assert_eq!(stack.undo_descriptions(), vec!["C 0", "A 0"]);
    }

    #[test]
    fn test_unifiable_commands_collapse() {
        let mut stack = UndoRedoStack::new();
        stack.push_undo(MockCommand::drag(1, 10));
        assert_eq!(stack.push_undo(MockCommand::drag(1, 20)), Pushed::Collapsed);
        assert_eq!(stack.push_undo(MockCommand::drag(1, 30)), Pushed::Collapsed);
        assert_eq!(stack.undo_len(), 1);
        assert_eq!(stack.undo_info().as_deref(), Some("Drag 30"));

        // Different key starts a new entry
        assert_eq!(stack.push_undo(MockCommand::drag(2, 5)), Pushed::Appended);
        assert_eq!(stack.undo_len(), 2);
    }

    #[test]
    fn test_disabled_policy_appends() {
        let mut stack = UndoRedoStack::with_policy(0, CoalescePolicy::disabled());
        stack.push_undo(MockCommand::drag(1, 10));
        stack.push_undo(MockCommand::drag(1, 20));
        assert_eq!(stack.undo_len(), 2);
    }

    #[test]
    fn test_max_depth_drops_oldest() {
        let mut stack = UndoRedoStack::with_policy(3, CoalescePolicy::default());
        for name in ["A", "B", "C", "D", "E"] {
            stack.push_undo(MockCommand::plain(name));
        }
        assert_eq!(stack.undo_descriptions(), vec!["E 0", "D 0", "C 0"]);

        stack.set_max_depth(1);
        assert_eq!(stack.undo_descriptions(), vec!["E 0"]);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut stack = UndoRedoStack::new();
        stack.push_undo(MockCommand::plain("A"));
        assert!(stack.is_dirty());

        stack.mark_saved();
        assert!(!stack.is_dirty());

        stack.pop_undo();
        assert!(stack.is_dirty());
        stack.pop_redo();
        assert!(!stack.is_dirty());
    }

    #[test]
    fn test_collapse_at_save_point_marks_dirty() {
        let mut stack = UndoRedoStack::new();
        stack.push_undo(MockCommand::drag(1, 1));
        stack.mark_saved();
        stack.push_undo(MockCommand::drag(1, 2));
        assert!(stack.is_dirty());
    }

    #[test]
    fn test_trimmed_history_is_not_clean_at_bottom() {
        let mut stack = UndoRedoStack::with_policy(1, CoalescePolicy::default());
        stack.push_undo(MockCommand::plain("A"));
        stack.push_undo(MockCommand::plain("B"));
        stack.pop_undo();
        // Bottom of history is the state after A, not the saved empty document
        assert!(stack.is_dirty());
    }

    #[test]
    fn test_clear_keeps_dirty_flag() {
        let mut stack = UndoRedoStack::new();
        stack.push_undo(MockCommand::plain("A"));
        stack.clear();
        assert!(!stack.has_undo());
        assert!(stack.is_dirty());
        stack.mark_saved();
        assert!(!stack.is_dirty());
    }
}
