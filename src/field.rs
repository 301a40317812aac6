//! Field descriptors

use serde_json::Value;

use crate::types::FieldType;

/// Default of a field.
///
/// `Absent` and `Value(Value::Null)` are different things: an absent field
/// reads as null but is never reported as set, so patch-style consumers can
/// tell "not supplied" apart from "explicitly null".
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDefault {
    /// No default; the field must be supplied
    Required,
    /// The field may be omitted and is then unset
    Absent,
    /// The field may be omitted and then takes this value
    Value(Value),
}

impl FieldDefault {
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }

    /// The value a field takes when it is not supplied
    pub fn materialize(&self) -> Option<Value> {
        match self {
            Self::Required => None,
            Self::Absent => Some(Value::Null),
            Self::Value(v) => Some(v.clone()),
        }
    }
}

/// One field of a schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub default: FieldDefault,
    pub description: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType, default: FieldDefault) -> Self {
        Self {
            name: name.into(),
            field_type,
            default,
            description: None,
        }
    }

    /// A field that must always be supplied
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type, FieldDefault::Required)
    }

    /// A field that may be left unset; the type is widened to accept null
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(name, field_type.or_absent(), FieldDefault::Absent)
    }

    /// A field with a concrete default
    pub fn with_default(name: impl Into<String>, field_type: FieldType, default: Value) -> Self {
        Self::new(name, field_type, FieldDefault::Value(default))
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_required()
    }

    /// Same field under a different name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}
