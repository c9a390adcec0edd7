// Widget records held by the widget tree

use crate::document::property::PropertyValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a widget inside one project
///
/// Ids are allocated by the owning `WidgetTree` and never reused, so a
/// command can keep referring to a widget across undo/redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WidgetId(pub(crate) u64);

impl WidgetId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A signal connected to a handler name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalHandler {
    pub signal: String,
    pub handler: String,
    /// Connect after the default handler
    #[serde(default)]
    pub after: bool,
}

impl SignalHandler {
    pub fn new(signal: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            signal: signal.into(),
            handler: handler.into(),
            after: false,
        }
    }
}

/// A widget in the edited tree
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: WidgetId,
    pub class_name: String,
    /// Project-unique name (e.g. "button1")
    pub name: String,
    pub properties: BTreeMap<String, PropertyValue>,
    pub signals: Vec<SignalHandler>,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
}

impl Widget {
    pub fn new(id: WidgetId, class_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            class_name: class_name.into(),
            name: name.into(),
            properties: BTreeMap::new(),
            signals: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}
