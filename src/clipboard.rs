// Clipboard - recently copied widget subtrees
//
// Items are stored as JSON payloads so a copy is independent of the project
// it came from. The newest item is selected after every copy; the UI may
// select an older one before pasting.

use crate::config::ClipboardConfig;
use crate::document::snapshot::WidgetSnapshot;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::VecDeque;

/// Clipboard errors
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard is empty")]
    Empty,

    #[error("No clipboard item at index {0}")]
    InvalidIndex(usize),

    #[error("Clipboard payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// One copied subtree
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub name: String,
    pub class_name: String,
    pub copied_at: DateTime<Utc>,
    payload: String,
}

impl ClipboardItem {
    pub fn new(snapshot: &WidgetSnapshot) -> Result<Self, ClipboardError> {
        Ok(Self {
            name: snapshot.name.clone(),
            class_name: snapshot.class_name.clone(),
            copied_at: Utc::now(),
            payload: serde_json::to_string(snapshot)?,
        })
    }

    /// Decode the stored subtree
    pub fn snapshot(&self) -> Result<WidgetSnapshot, ClipboardError> {
        Ok(serde_json::from_str(&self.payload)?)
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Bounded list of copied items, newest first
#[derive(Debug)]
pub struct Clipboard {
    items: VecDeque<ClipboardItem>,
    capacity: usize,
    selected: Option<usize>,
}

impl Clipboard {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            selected: None,
        }
    }

    pub fn from_config(config: &ClipboardConfig) -> Self {
        Self::new(config.capacity)
    }

    /// Store a copy and select it
    pub fn add(&mut self, snapshot: &WidgetSnapshot) -> Result<(), ClipboardError> {
        let item = ClipboardItem::new(snapshot)?;
        debug!("Copied {} ({} widgets) to clipboard", item.name, snapshot.count());
        self.items.push_front(item);
        self.items.truncate(self.capacity);
        self.selected = Some(0);
        Ok(())
    }

    pub fn items(&self) -> impl Iterator<Item = &ClipboardItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected(&self) -> Result<&ClipboardItem, ClipboardError> {
        self.selected
            .and_then(|index| self.items.get(index))
            .ok_or(ClipboardError::Empty)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: usize) -> Result<(), ClipboardError> {
        if index >= self.items.len() {
            return Err(ClipboardError::InvalidIndex(index));
        }
        self.selected = Some(index);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::from_config(&ClipboardConfig::default())
    }
}
