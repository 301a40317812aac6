//! JSON Schema interop
//!
//! Export any schema as a JSON Schema object document, and read base schemas
//! back from such documents.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::config::{ExtraPolicy, SchemaConfig, RESERVED_KEYWORDS};
use super::names::Identifiers;
use super::Schema;
use crate::error::{Result, SchemaError};
use crate::field::{FieldDefault, FieldDescriptor};
use crate::types::FieldType;

impl Schema {
    /// Export as a JSON Schema object document.
    ///
    /// Properties keep declaration order. `json_schema_extra` is merged into
    /// the top level last; reserved keywords in it are skipped.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::with_capacity(self.fields().len());
        let mut required = Vec::new();

        for field in self.fields() {
            let mut property = match field.field_type.to_json_schema() {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            if let Some(description) = &field.description {
                property.insert("description".to_string(), json!(description));
            }
            match &field.default {
                FieldDefault::Required => required.push(json!(field.name)),
                FieldDefault::Absent => {}
                FieldDefault::Value(value) => {
                    property.insert("default".to_string(), value.clone());
                }
            }
            properties.insert(field.name.clone(), Value::Object(property));
        }

        let mut doc = Map::new();
        doc.insert("title".to_string(), json!(self.title()));
        doc.insert("type".to_string(), json!("object"));
        doc.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            doc.insert("required".to_string(), Value::Array(required));
        }
        if self.config().extra == ExtraPolicy::Forbid {
            doc.insert("additionalProperties".to_string(), json!(false));
        }
        if let Some(extra) = &self.config().json_schema_extra {
            for (key, value) in extra {
                if !RESERVED_KEYWORDS.contains(&key.as_str()) {
                    doc.insert(key.clone(), value.clone());
                }
            }
        }
        Value::Object(doc)
    }

    /// Read a base schema from a JSON Schema object document.
    ///
    /// Required properties become required fields, properties with a
    /// `default` keep it, and every other property becomes an absent-default
    /// field whose type is widened to accept null. The schema is named `name`,
    /// or else its `title` made into an identifier; a title that differs from
    /// the name is kept as the `title` option. `additionalProperties: false`
    /// reads as `extra = "forbid"` and unrecognized top-level keywords land in
    /// `json_schema_extra`, so an exported schema reads back with the same
    /// fingerprint.
    pub fn from_json_schema(doc: &Value, name: Option<&str>) -> Result<Arc<Schema>> {
        let obj = doc
            .as_object()
            .ok_or_else(|| SchemaError::InvalidFormat("schema document must be an object".to_string()))?;

        let title = obj.get("title").and_then(|t| t.as_str());
        let name = match (name, title) {
            (Some(name), _) => name.to_string(),
            (None, Some(title)) => Identifiers::new().sanitize(title),
            (None, None) => {
                return Err(SchemaError::InvalidFormat(
                    "schema has no title and no name was given".to_string(),
                ))
            }
        };

        let required: Vec<&str> = obj
            .get("required")
            .and_then(|r| r.as_array())
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        let mut fields = Vec::new();
        if let Some(properties) = obj.get("properties") {
            let properties = properties
                .as_object()
                .ok_or_else(|| SchemaError::InvalidFormat("'properties' must be an object".to_string()))?;
            for (prop_name, fragment) in properties {
                let field_type = FieldType::from_json_schema(fragment)
                    .map_err(|e| SchemaError::InvalidFormat(format!("property '{}': {}", prop_name, e)))?;
                let mut field = if required.contains(&prop_name.as_str()) {
                    FieldDescriptor::required(prop_name.clone(), field_type)
                } else if let Some(default) = fragment.get("default") {
                    FieldDescriptor::with_default(prop_name.clone(), field_type, default.clone())
                } else {
                    FieldDescriptor::optional(prop_name.clone(), field_type)
                };
                field.description = fragment
                    .get("description")
                    .and_then(|d| d.as_str())
                    .map(str::to_string);
                fields.push(field);
            }
        }

        let mut config = SchemaConfig::default();
        if title != Some(name.as_str()) {
            config.title = title.map(str::to_string);
        }
        if obj.get("additionalProperties") == Some(&Value::Bool(false)) {
            config.extra = ExtraPolicy::Forbid;
        }
        let extra: Map<String, Value> = obj
            .iter()
            .filter(|(key, _)| !RESERVED_KEYWORDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if !extra.is_empty() {
            config.json_schema_extra = Some(extra);
        }

        Schema::builder(name).fields(fields).config(config).build()
    }
}
