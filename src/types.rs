//! Field type expressions
//!
//! A [`FieldType`] is the semantic type of a single field. It knows how to
//! render itself, check a JSON value against itself, widen itself to accept
//! absence, and convert to and from JSON Schema fragments.

use serde_json::{json, Value};
use std::fmt;

/// Semantic type of a field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Null,
    /// Accepts any JSON value, including null
    Any,
    /// Homogeneous list
    Array(Box<FieldType>),
    /// String-keyed map with homogeneous values
    Map(Box<FieldType>),
    /// Reference to another named schema; checked as an object
    Ref(String),
    /// `T | null`
    Optional(Box<FieldType>),
    Union(Vec<FieldType>),
}

impl FieldType {
    pub fn array(items: FieldType) -> Self {
        Self::Array(Box::new(items))
    }

    pub fn map(values: FieldType) -> Self {
        Self::Map(Box::new(values))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref(name.into())
    }

    pub fn optional(inner: FieldType) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Whether null (absence) is a valid value of this type
    pub fn accepts_null(&self) -> bool {
        match self {
            Self::Null | Self::Any | Self::Optional(_) => true,
            Self::Union(members) => members.iter().any(FieldType::accepts_null),
            _ => false,
        }
    }

    /// Widen to "this type or absent".
    ///
    /// Types that already accept null are returned unchanged, so widening is
    /// idempotent: `string | null` never becomes `(string | null) | null`.
    pub fn or_absent(&self) -> Self {
        if self.accepts_null() {
            self.clone()
        } else {
            Self::optional(self.clone())
        }
    }

    /// Check a JSON value against this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Null => value.is_null(),
            Self::Any => true,
            Self::Array(items) => value
                .as_array()
                .map(|arr| arr.iter().all(|v| items.accepts(v)))
                .unwrap_or(false),
            Self::Map(values) => value
                .as_object()
                .map(|obj| obj.values().all(|v| values.accepts(v)))
                .unwrap_or(false),
            Self::Ref(_) => value.is_object(),
            Self::Optional(inner) => value.is_null() || inner.accepts(value),
            Self::Union(members) => members.iter().any(|m| m.accepts(value)),
        }
    }

    /// Describe why this type cannot be built, if it is degenerate
    pub fn structural_problem(&self) -> Option<String> {
        match self {
            Self::Ref(name) if name.trim().is_empty() => {
                Some("reference has an empty schema name".to_string())
            }
            Self::Union(members) if members.is_empty() => {
                Some("union has no members".to_string())
            }
            Self::Union(members) => members.iter().find_map(FieldType::structural_problem),
            Self::Array(inner) | Self::Map(inner) | Self::Optional(inner) => {
                inner.structural_problem()
            }
            _ => None,
        }
    }

    /// Render as a JSON Schema fragment
    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Number => json!({ "type": "number" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Null => json!({ "type": "null" }),
            Self::Any => json!({}),
            Self::Array(items) => json!({ "type": "array", "items": items.to_json_schema() }),
            Self::Map(values) => json!({
                "type": "object",
                "additionalProperties": values.to_json_schema(),
            }),
            Self::Ref(name) => json!({ "$ref": name }),
            Self::Optional(inner) => json!({
                "anyOf": [inner.to_json_schema(), { "type": "null" }],
            }),
            Self::Union(members) => json!({
                "anyOf": members.iter().map(FieldType::to_json_schema).collect::<Vec<_>>(),
            }),
        }
    }

    /// Read a JSON Schema property fragment.
    ///
    /// `anyOf`/`oneOf` with exactly one non-null member plus `null` becomes
    /// [`FieldType::Optional`]; a list-valued `type` becomes a union.
    pub fn from_json_schema(fragment: &Value) -> Result<Self, String> {
        let obj = fragment
            .as_object()
            .ok_or_else(|| format!("expected an object, got {}", fragment))?;

        if let Some(target) = obj.get("$ref").and_then(|v| v.as_str()) {
            return Ok(Self::reference(target));
        }

        if let Some(members) = obj
            .get("anyOf")
            .or_else(|| obj.get("oneOf"))
            .and_then(|v| v.as_array())
        {
            let members = members
                .iter()
                .map(Self::from_json_schema)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::from_members(members));
        }

        match obj.get("type") {
            None => Ok(Self::Any),
            Some(Value::String(name)) => Self::from_type_name(name, obj),
            Some(Value::Array(names)) => {
                let members = names
                    .iter()
                    .map(|n| {
                        n.as_str()
                            .ok_or_else(|| format!("type list entries must be strings, got {}", n))
                            .and_then(|n| Self::from_type_name(n, obj))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::from_members(members))
            }
            Some(other) => Err(format!("unsupported type keyword {}", other)),
        }
    }

    fn from_type_name(name: &str, obj: &serde_json::Map<String, Value>) -> Result<Self, String> {
        match name {
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "null" => Ok(Self::Null),
            "array" => match obj.get("items") {
                Some(items) => Ok(Self::array(Self::from_json_schema(items)?)),
                None => Ok(Self::array(Self::Any)),
            },
            "object" => match obj.get("additionalProperties") {
                Some(values) if values.is_object() => Ok(Self::map(Self::from_json_schema(values)?)),
                _ => Ok(Self::map(Self::Any)),
            },
            other => Err(format!("unknown type '{}'", other)),
        }
    }

    fn from_members(mut members: Vec<FieldType>) -> Self {
        let nulls = members.iter().filter(|m| **m == Self::Null).count();
        if nulls == 1 && members.len() == 2 {
            members.retain(|m| *m != Self::Null);
            return Self::optional(members.remove(0));
        }
        if members.len() == 1 {
            return members.remove(0);
        }
        Self::Union(members)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Null => write!(f, "null"),
            Self::Any => write!(f, "any"),
            Self::Array(items) => write!(f, "array<{}>", items),
            Self::Map(values) => write!(f, "map<{}>", values),
            Self::Ref(name) => write!(f, "{}", name),
            Self::Optional(inner) => write!(f, "{} | null", inner),
            Self::Union(members) => {
                let rendered: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "{}", rendered.join(" | "))
            }
        }
    }
}
