// Property specifications used to validate and default widget properties

use crate::document::property::PropertyValue;
use crate::registry::RegistryError;

/// Accepted values of a property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    Bool,
    Int { min: i64, max: i64 },
    Float { min: f64, max: f64 },
    Text,
    Enum(Vec<String>),
}

impl PropertyKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyKind::Bool => "bool",
            PropertyKind::Int { .. } => "int",
            PropertyKind::Float { .. } => "float",
            PropertyKind::Text => "text",
            PropertyKind::Enum(_) => "enum",
        }
    }
}

/// Description of one property of a widget class
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub name: String,
    pub kind: PropertyKind,
    pub default: PropertyValue,
    /// Text shown to end users (marked for translation when exported)
    pub translatable: bool,
}

impl PropertySpec {
    pub fn boolean(name: &str, default: bool) -> Self {
        Self::new(name, PropertyKind::Bool, PropertyValue::Bool(default))
    }

    pub fn int(name: &str, min: i64, max: i64, default: i64) -> Self {
        Self::new(name, PropertyKind::Int { min, max }, PropertyValue::Int(default))
    }

    pub fn float(name: &str, min: f64, max: f64, default: f64) -> Self {
        Self::new(
            name,
            PropertyKind::Float { min, max },
            PropertyValue::Float(default),
        )
    }

    pub fn text(name: &str, default: &str) -> Self {
        Self::new(name, PropertyKind::Text, PropertyValue::from(default))
    }

    pub fn enumeration(name: &str, values: &[&str], default: &str) -> Self {
        Self::new(
            name,
            PropertyKind::Enum(values.iter().map(|v| v.to_string()).collect()),
            PropertyValue::Enum(default.to_string()),
        )
    }

    pub fn translatable(mut self) -> Self {
        self.translatable = true;
        self
    }

    fn new(name: &str, kind: PropertyKind, default: PropertyValue) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default,
            translatable: false,
        }
    }

    /// Check that `value` is acceptable for this property
    pub fn validate(&self, value: &PropertyValue) -> Result<(), RegistryError> {
        match (&self.kind, value) {
            (PropertyKind::Bool, PropertyValue::Bool(_)) => Ok(()),
            (PropertyKind::Text, PropertyValue::Text(_)) => Ok(()),
            (PropertyKind::Int { min, max }, PropertyValue::Int(v)) => {
                if v < min || v > max {
                    return Err(self.out_of_range(v.to_string(), min.to_string(), max.to_string()));
                }
                Ok(())
            }
            (PropertyKind::Float { min, max }, PropertyValue::Float(v)) => {
                if !v.is_finite() || v < min || v > max {
                    return Err(self.out_of_range(v.to_string(), min.to_string(), max.to_string()));
                }
                Ok(())
            }
            // Plain text is accepted for enums so UI combo boxes can pass strings through
            (PropertyKind::Enum(values), PropertyValue::Enum(v) | PropertyValue::Text(v)) => {
                if values.iter().any(|allowed| allowed == v) {
                    Ok(())
                } else {
                    Err(RegistryError::InvalidEnumValue {
                        property: self.name.clone(),
                        value: v.clone(),
                    })
                }
            }
            _ => Err(RegistryError::TypeMismatch {
                property: self.name.clone(),
                expected: self.kind.type_name(),
                found: value.type_name(),
            }),
        }
    }

    fn out_of_range(&self, value: String, min: String, max: String) -> RegistryError {
        RegistryError::OutOfRange {
            property: self.name.clone(),
            value,
            min,
            max,
        }
    }
}
