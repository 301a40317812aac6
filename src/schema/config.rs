//! Schema validation configuration
//!
//! Every [`Schema`](super::Schema) carries one [`SchemaConfig`]. Derived
//! schemas either inherit their base's configuration or replace it outright
//! from an option mapping; options never merge.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level keywords generated by JSON Schema export; `json_schema_extra`
/// may not override them
pub const RESERVED_KEYWORDS: &[&str] = &["title", "type", "properties", "required", "additionalProperties"];

/// How undeclared input keys are treated during construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtraPolicy {
    /// Drop undeclared keys
    #[default]
    Ignore,
    /// Reject undeclared keys
    Forbid,
    /// Keep undeclared keys on the record
    Allow,
}

/// Validation configuration of a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    /// Title used in exported JSON Schema (defaults to the schema name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Treatment of undeclared keys
    pub extra: ExtraPolicy,

    /// Reject mutation of constructed records
    pub frozen: bool,

    /// Allow construction from arbitrary serializable values
    pub from_attributes: bool,

    /// Merged into the top level of exported JSON Schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema_extra: Option<Map<String, Value>>,
}

impl SchemaConfig {
    /// Build a configuration from an option mapping.
    ///
    /// Options missing from `options` take their defaults. Unknown option
    /// names and ill-typed values are rejected.
    pub fn from_options(options: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(options.clone()))
    }

    /// Reject configurations whose `json_schema_extra` would clobber generated
    /// keywords of the exported document
    pub fn check(&self) -> Result<(), String> {
        let Some(extra) = &self.json_schema_extra else {
            return Ok(());
        };
        match extra.keys().find(|k| RESERVED_KEYWORDS.contains(&k.as_str())) {
            Some(key) if key == "title" => Err(
                "json_schema_extra may not set 'title'; use the 'title' option".to_string(),
            ),
            Some(key) => Err(format!("json_schema_extra may not set reserved keyword '{}'", key)),
            None => Ok(()),
        }
    }

    /// The configuration as an option mapping, including defaulted options
    pub fn to_options(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(options)) => options,
            _ => Map::new(),
        }
    }

    /// Look up a single option by name
    pub fn get(&self, option: &str) -> Option<Value> {
        self.to_options().remove(option)
    }
}
