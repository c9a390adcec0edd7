// Adaptor registry
//
// Describes every widget class the designer knows: its properties (with
// inheritance through `parent_class`), signals and container behaviour.
// The registry is built once at startup and owned by the application context;
// commands and the command manager borrow it.

pub mod adaptor;
pub mod property;

pub use adaptor::{GenericAdaptor, LabelledAdaptor, WidgetAdaptor, builtin_adaptors};
pub use property::{PropertyKind, PropertySpec};

use crate::document::property::PropertyValue;
use crate::document::tree::{Subtree, WidgetTree};
use crate::document::widget::Widget;
use log::debug;
use std::collections::HashMap;
use std::fmt;

// Guards against parent_class cycles in user-registered adaptors
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Registry errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown widget class '{0}'")]
    UnknownClass(String),

    #[error("Widget class '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Class '{class}' has no property '{property}'")]
    UnknownProperty { class: String, property: String },

    #[error("Class '{class}' has no signal '{signal}'")]
    UnknownSignal { class: String, signal: String },

    #[error("Property '{property}' expects {expected}, got {found}")]
    TypeMismatch {
        property: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Property '{property}' value {value} is outside {min}..={max}")]
    OutOfRange {
        property: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("'{value}' is not a valid value for '{property}'")]
    InvalidEnumValue { property: String, value: String },

    #[error("Inheritance of '{0}' is too deep or cyclic")]
    InheritanceCycle(String),
}

/// Lookup table of widget adaptors by class name
#[derive(Default)]
pub struct AdaptorRegistry {
    adaptors: HashMap<String, Box<dyn WidgetAdaptor>>,
}

impl AdaptorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in widget classes
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for adaptor in builtin_adaptors() {
            registry
                .adaptors
                .insert(adaptor.class_name().to_string(), adaptor);
        }
        registry
    }

    pub fn register(&mut self, adaptor: Box<dyn WidgetAdaptor>) -> Result<(), RegistryError> {
        let class = adaptor.class_name().to_string();
        if self.adaptors.contains_key(&class) {
            return Err(RegistryError::AlreadyRegistered(class));
        }
        debug!("Registered widget class '{}'", class);
        self.adaptors.insert(class, adaptor);
        Ok(())
    }

    pub fn contains(&self, class: &str) -> bool {
        self.adaptors.contains_key(class)
    }

    pub fn adaptor(&self, class: &str) -> Result<&dyn WidgetAdaptor, RegistryError> {
        self.adaptors
            .get(class)
            .map(|a| a.as_ref())
            .ok_or_else(|| RegistryError::UnknownClass(class.to_string()))
    }

    /// Registered class names, sorted
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.adaptors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The class followed by its ancestors
    pub fn lineage(&self, class: &str) -> Result<Vec<&dyn WidgetAdaptor>, RegistryError> {
        let mut current = self.adaptor(class)?;
        let mut chain = vec![current];
        while let Some(parent) = current.parent_class() {
            if chain.len() >= MAX_INHERITANCE_DEPTH {
                return Err(RegistryError::InheritanceCycle(class.to_string()));
            }
            current = self.adaptor(parent)?;
            chain.push(current);
        }
        Ok(chain)
    }

    /// All properties of a class, inherited first; subclasses override by name
    pub fn all_properties(&self, class: &str) -> Result<Vec<&PropertySpec>, RegistryError> {
        let mut specs: Vec<&PropertySpec> = Vec::new();
        for adaptor in self.lineage(class)?.into_iter().rev() {
            for spec in adaptor.properties() {
                match specs.iter().position(|s| s.name == spec.name) {
                    Some(index) => specs[index] = spec,
                    None => specs.push(spec),
                }
            }
        }
        Ok(specs)
    }

    pub fn property_spec(&self, class: &str, property: &str) -> Result<&PropertySpec, RegistryError> {
        self.lineage(class)?
            .into_iter()
            .find_map(|a| a.properties().iter().find(|s| s.name == property))
            .ok_or_else(|| RegistryError::UnknownProperty {
                class: class.to_string(),
                property: property.to_string(),
            })
    }

    /// All signals of a class including inherited ones
    pub fn signals(&self, class: &str) -> Result<Vec<&str>, RegistryError> {
        let mut signals = Vec::new();
        for adaptor in self.lineage(class)?.into_iter().rev() {
            signals.extend(adaptor.signals().iter().map(String::as_str));
        }
        Ok(signals)
    }

    /// Names of properties whose text is shown to end users, own and inherited
    pub fn translatable_properties(&self, class: &str) -> Result<Vec<&str>, RegistryError> {
        Ok(self
            .all_properties(class)?
            .into_iter()
            .filter(|spec| spec.translatable)
            .map(|spec| spec.name.as_str())
            .collect())
    }

    pub fn has_signal(&self, class: &str, signal: &str) -> Result<bool, RegistryError> {
        Ok(self.signals(class)?.contains(&signal))
    }

    pub fn validate_property(
        &self,
        class: &str,
        property: &str,
        value: &PropertyValue,
    ) -> Result<(), RegistryError> {
        self.property_spec(class, property)?.validate(value)
    }

    /// Build a detached widget of `class` with a fresh id and unique name
    pub fn build_widget(&self, tree: &mut WidgetTree, class: &str) -> Result<Subtree, RegistryError> {
        let adaptor = self.adaptor(class)?;
        let defaults: Vec<(String, PropertyValue)> = self
            .all_properties(class)?
            .into_iter()
            .map(|spec| (spec.name.clone(), spec.default.clone()))
            .collect();

        let id = tree.allocate_id();
        let name = tree.unique_name(&adaptor.name_prefix());
        let mut widget = Widget::new(id, class, name);
        widget.properties.extend(defaults);
        adaptor.post_create(&mut widget);

        Ok(Subtree {
            root: id,
            widgets: vec![widget],
        })
    }
}

impl fmt::Debug for AdaptorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptorRegistry")
            .field("classes", &self.class_names())
            .finish()
    }
}
