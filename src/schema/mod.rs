//! Schema types and structures
//!
//! A [`Schema`] is an immutable, named, ordered set of fields plus a
//! [`SchemaConfig`]. Schemas are shared as `Arc<Schema>`; a derived schema
//! keeps its base as `parent`, so it remains an extension of the base.

pub mod builder;
pub mod config;
pub mod json;
pub mod names;
pub mod record;

use std::sync::Arc;

use serde_json::Value;

pub use builder::{BuildRequest, ConfigSource, RecordFactory, SchemaBuilder, SchemaFactory};
pub use config::{ExtraPolicy, SchemaConfig, RESERVED_KEYWORDS};
pub use names::Identifiers;
pub use record::Record;

use crate::checksum::Checksum;
use crate::derive::DerivationSpec;
use crate::error::Result;
use crate::field::FieldDescriptor;

/// A schema definition
#[derive(Debug)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
    config: SchemaConfig,
    parent: Option<Arc<Schema>>,
}

impl Schema {
    /// Start declaring a schema
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Assemble a schema without any checks.
    ///
    /// Factories call this after validating the payload; everything else
    /// should go through [`SchemaBuilder`] or a [`SchemaFactory`].
    pub fn from_parts(
        name: String,
        fields: Vec<FieldDescriptor>,
        config: SchemaConfig,
        parent: Option<Arc<Schema>>,
    ) -> Self {
        Self {
            name,
            fields,
            config,
            parent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Look up a configuration option by name
    pub fn config_value(&self, option: &str) -> Option<Value> {
        self.config.get(option)
    }

    /// The schema this one was derived from or declared to extend
    pub fn parent(&self) -> Option<&Arc<Schema>> {
        self.parent.as_ref()
    }

    /// Walk the parent chain, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &Arc<Schema>> {
        std::iter::successors(self.parent.as_ref(), |s| s.parent.as_ref())
    }

    /// Whether `other` is this schema or one of its ancestors
    pub fn extends(&self, other: &Schema) -> bool {
        std::ptr::eq(self, other) || self.ancestors().any(|a| std::ptr::eq(a.as_ref(), other))
    }

    /// Title used in exported JSON Schema
    pub fn title(&self) -> &str {
        self.config.title.as_deref().unwrap_or(&self.name)
    }

    /// Derive a new schema from this one
    pub fn derive(self: &Arc<Self>, spec: &DerivationSpec) -> Result<Arc<Schema>> {
        crate::derive::derive(self, spec)
    }

    /// SHA256 fingerprint of the exported JSON Schema
    pub fn fingerprint(&self) -> Checksum {
        Checksum::from_json(&self.json_schema())
    }
}
