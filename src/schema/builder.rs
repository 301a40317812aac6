//! Schema construction
//!
//! [`SchemaFactory`] is the seam between the derivation engine and the
//! schema type. The engine only prepares a [`BuildRequest`]; the factory
//! decides whether that payload makes a valid schema. [`RecordFactory`] is the
//! default factory and produces runtime-checked record schemas.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::config::SchemaConfig;
use super::names::Identifiers;
use super::Schema;
use crate::error::{ConstructionError, Result, SchemaError};
use crate::field::{FieldDefault, FieldDescriptor};

/// Where a new schema's configuration comes from
#[derive(Debug, Clone, Default)]
pub enum ConfigSource {
    /// Use the parent's configuration, or the defaults without a parent
    #[default]
    Inherit,
    /// Parse this option mapping into a fresh configuration
    Replace(Map<String, Value>),
    /// Use this configuration as-is
    Explicit(SchemaConfig),
}

/// Everything a factory needs to build one schema
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub name: String,
    /// Final fields, in declaration order
    pub fields: Vec<FieldDescriptor>,
    pub parent: Option<Arc<Schema>>,
    pub config: ConfigSource,
}

/// Builds schemas from a field/config payload
pub trait SchemaFactory {
    fn build(&self, request: BuildRequest) -> std::result::Result<Schema, ConstructionError>;
}

impl<F: SchemaFactory + ?Sized> SchemaFactory for &F {
    fn build(&self, request: BuildRequest) -> std::result::Result<Schema, ConstructionError> {
        (**self).build(request)
    }
}

/// Default factory producing runtime-checked record schemas
#[derive(Debug, Clone)]
pub struct RecordFactory {
    identifiers: Identifiers,
}

impl Default for RecordFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFactory {
    pub fn new() -> Self {
        Self {
            identifiers: Identifiers::new(),
        }
    }

    fn check_field(&self, field: &FieldDescriptor) -> std::result::Result<(), ConstructionError> {
        if !self.identifiers.is_valid(&field.name) {
            return Err(ConstructionError::InvalidFieldName(field.name.clone()));
        }
        if let Some(reason) = field.field_type.structural_problem() {
            return Err(ConstructionError::InvalidType {
                field: field.name.clone(),
                reason,
            });
        }
        match &field.default {
            FieldDefault::Required => Ok(()),
            FieldDefault::Absent if field.field_type.accepts_null() => Ok(()),
            FieldDefault::Absent => Err(ConstructionError::AbsentNotAccepted {
                field: field.name.clone(),
                field_type: field.field_type.to_string(),
            }),
            FieldDefault::Value(value) if field.field_type.accepts(value) => Ok(()),
            FieldDefault::Value(value) => Err(ConstructionError::InvalidDefault {
                field: field.name.clone(),
                expected: field.field_type.to_string(),
                default: value.clone(),
            }),
        }
    }
}

impl SchemaFactory for RecordFactory {
    fn build(&self, request: BuildRequest) -> std::result::Result<Schema, ConstructionError> {
        if !self.identifiers.is_valid(&request.name) {
            return Err(ConstructionError::InvalidSchemaName(request.name));
        }

        let mut seen = HashSet::with_capacity(request.fields.len());
        for field in &request.fields {
            self.check_field(field)?;
            if !seen.insert(field.name.as_str()) {
                return Err(ConstructionError::DuplicateField(field.name.clone()));
            }
        }

        let config = match request.config {
            ConfigSource::Inherit => request
                .parent
                .as_ref()
                .map(|p| p.config().clone())
                .unwrap_or_default(),
            ConfigSource::Replace(options) => SchemaConfig::from_options(&options)
                .map_err(|e| ConstructionError::InvalidConfig(e.to_string()))?,
            ConfigSource::Explicit(config) => config,
        };
        config.check().map_err(ConstructionError::InvalidConfig)?;

        tracing::debug!(
            schema = %request.name,
            fields = request.fields.len(),
            parent = request.parent.as_ref().map(|p| p.name()),
            "built record schema"
        );

        Ok(Schema::from_parts(request.name, request.fields, config, request.parent))
    }
}

/// Fluent declaration of a schema
///
/// ```
/// use familiar_dto::{FieldDescriptor, FieldType, Schema};
///
/// let user = Schema::builder("User")
///     .field(FieldDescriptor::required("id", FieldType::String))
///     .field(FieldDescriptor::optional("nickname", FieldType::String))
///     .build()
///     .unwrap();
/// assert_eq!(user.field_names(), vec!["id", "nickname"]);
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    request: BuildRequest,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            request: BuildRequest {
                name: name.into(),
                fields: Vec::new(),
                parent: None,
                config: ConfigSource::Inherit,
            },
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.request.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.request.fields.extend(fields);
        self
    }

    pub fn config(mut self, config: SchemaConfig) -> Self {
        self.request.config = ConfigSource::Explicit(config);
        self
    }

    /// Configure from an option mapping; validated at build time
    pub fn options(mut self, options: Map<String, Value>) -> Self {
        self.request.config = ConfigSource::Replace(options);
        self
    }

    /// Declare the new schema as an extension of `parent`
    pub fn extends(mut self, parent: &Arc<Schema>) -> Self {
        self.request.parent = Some(Arc::clone(parent));
        self
    }

    pub fn build(self) -> Result<Arc<Schema>> {
        self.build_with(&RecordFactory::new())
    }

    pub fn build_with<F: SchemaFactory>(self, factory: &F) -> Result<Arc<Schema>> {
        let name = self.request.name.clone();
        factory
            .build(self.request)
            .map(Arc::new)
            .map_err(|source| SchemaError::SchemaConstruction { schema: name, source })
    }
}
