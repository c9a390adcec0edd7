// Coalescing policy: which adjacent edits merge into one history entry

use crate::command::trait_def::{Command, MergeKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Decides whether a new command may collapse into the top of the undo history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoalescePolicy {
    /// Master switch
    pub enabled: bool,
    /// Merge repeated edits of the same property on the same widget
    pub properties: bool,
    /// Merge repeated moves of the same widget (drags)
    pub moves: bool,
    /// Only merge when the top entry was recorded at most this long ago
    pub window_ms: Option<u64>,
}

impl Default for CoalescePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            properties: true,
            moves: true,
            window_ms: None,
        }
    }
}

impl CoalescePolicy {
    /// A policy that never merges
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Builder-style time window
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window_ms = Some(u64::try_from(window.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// `top_age` is the time since `top` was pushed or last absorbed a command
    pub fn allows(&self, top: &dyn Command, top_age: Duration, incoming: &dyn Command) -> bool {
        if !self.enabled {
            return false;
        }
        if let Some(window_ms) = self.window_ms {
            if top_age > Duration::from_millis(window_ms) {
                return false;
            }
        }
        let kind_enabled = match incoming.merge_key() {
            Some(MergeKey::Property { .. }) => self.properties,
            Some(MergeKey::Move { .. }) => self.moves,
            None => false,
        };
        kind_enabled && top.unifies(incoming)
    }
}
