//! Schema instances
//!
//! [`Record`] is a constructed, type-checked instance of a [`Schema`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::config::ExtraPolicy;
use super::Schema;
use crate::error::{FieldIssue, IssueKind, Result, ValidationError};

/// An instance of a schema
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    values: HashMap<String, Value>,
    fields_set: HashSet<String>,
    extra: Map<String, Value>,
}

impl Schema {
    /// Construct a record from a JSON object.
    ///
    /// All problems are collected before failing, so the error lists every
    /// missing, mistyped and forbidden key at once.
    pub fn construct(self: &Arc<Self>, input: Value) -> Result<Record> {
        let input = match input {
            Value::Object(map) => map,
            _ => {
                return Err(ValidationError::single(self.name(), "", IssueKind::NotAnObject).into());
            }
        };
        self.construct_map(input, self.config().extra)
    }

    /// Construct a record from any serializable value.
    ///
    /// Requires `from_attributes`. Attributes that are not fields are dropped
    /// whatever the `extra` policy says.
    pub fn construct_from<T: Serialize>(self: &Arc<Self>, source: &T) -> Result<Record> {
        if !self.config().from_attributes {
            return Err(
                ValidationError::single(self.name(), "", IssueKind::FromAttributesDisabled).into(),
            );
        }
        match serde_json::to_value(source)? {
            Value::Object(map) => self.construct_map(map, ExtraPolicy::Ignore),
            _ => Err(ValidationError::single(self.name(), "", IssueKind::NotAnObject).into()),
        }
    }

    fn construct_map(self: &Arc<Self>, mut input: Map<String, Value>, extra_policy: ExtraPolicy) -> Result<Record> {
        let mut issues = Vec::new();
        let mut values = HashMap::with_capacity(self.fields().len());
        let mut fields_set = HashSet::new();

        for field in self.fields() {
            match input.remove(&field.name) {
                Some(value) => {
                    if field.field_type.accepts(&value) {
                        fields_set.insert(field.name.clone());
                        values.insert(field.name.clone(), value);
                    } else {
                        issues.push(FieldIssue {
                            field: field.name.clone(),
                            kind: IssueKind::TypeMismatch {
                                expected: field.field_type.to_string(),
                            },
                        });
                    }
                }
                None => match field.default.materialize() {
                    Some(value) => {
                        values.insert(field.name.clone(), value);
                    }
                    None => issues.push(FieldIssue {
                        field: field.name.clone(),
                        kind: IssueKind::Missing,
                    }),
                },
            }
        }

        let mut extra = Map::new();
        match extra_policy {
            ExtraPolicy::Ignore => {}
            ExtraPolicy::Allow => extra = input,
            ExtraPolicy::Forbid => {
                issues.extend(input.keys().map(|key| FieldIssue {
                    field: key.clone(),
                    kind: IssueKind::ExtraForbidden,
                }));
            }
        }

        if !issues.is_empty() {
            return Err(ValidationError {
                schema: self.name().to_string(),
                issues,
            }
            .into());
        }

        Ok(Record {
            schema: Arc::clone(self),
            values,
            fields_set,
            extra,
        })
    }
}

impl Record {
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Value of a field; `None` when `field` is not a field of the schema
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Whether the field was explicitly supplied or assigned
    pub fn is_set(&self, field: &str) -> bool {
        self.fields_set.contains(field)
    }

    /// Explicitly supplied fields, in declaration order
    pub fn fields_set(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .filter(|name| self.fields_set.contains(*name))
            .collect()
    }

    /// Names of every field of the record's schema
    pub fn field_names(&self) -> Vec<&str> {
        self.schema.field_names()
    }

    /// Undeclared values kept under `extra = "allow"`
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Assign a field after construction
    pub fn set(&mut self, field: &str, value: Value) -> Result<()> {
        let schema_name = self.schema.name().to_string();
        if self.schema.config().frozen {
            return Err(ValidationError::single(schema_name, field, IssueKind::Frozen).into());
        }
        let descriptor = self
            .schema
            .field(field)
            .ok_or_else(|| ValidationError::single(&schema_name, field, IssueKind::UnknownField))?;
        if !descriptor.field_type.accepts(&value) {
            let expected = descriptor.field_type.to_string();
            return Err(
                ValidationError::single(schema_name, field, IssueKind::TypeMismatch { expected }).into(),
            );
        }
        self.fields_set.insert(field.to_string());
        self.values.insert(field.to_string(), value);
        Ok(())
    }

    /// Serialize in declaration order.
    ///
    /// With `exclude_unset`, only explicitly supplied fields are written,
    /// which is what a patch payload needs.
    pub fn to_json(&self, exclude_unset: bool) -> Value {
        let mut out = Map::with_capacity(self.values.len() + self.extra.len());
        for field in self.schema.fields() {
            if exclude_unset && !self.fields_set.contains(&field.name) {
                continue;
            }
            if let Some(value) = self.values.get(&field.name) {
                out.insert(field.name.clone(), value.clone());
            }
        }
        for (key, value) in &self.extra {
            out.insert(key.clone(), value.clone());
        }
        Value::Object(out)
    }
}
