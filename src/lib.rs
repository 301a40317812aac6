//! Familiar DTO
//!
//! Derives new schemas from existing ones: pick or omit fields, rename them,
//! make every field optional ("partial"), and replace the validation
//! configuration. A derived schema extends its base and exposes the same
//! construction, introspection and JSON Schema export surface.
//!
//! ## Example
//!
//! ```
//! use familiar_dto::{derive, DerivationSpec, FieldDescriptor, FieldType, Schema};
//! use serde_json::json;
//!
//! let entity = Schema::builder("Entity")
//!     .field(FieldDescriptor::required("id", FieldType::String))
//!     .field(FieldDescriptor::required("name", FieldType::String))
//!     .build()?;
//!
//! let patch = derive(&entity, &DerivationSpec::new().partial(true).output_name("EntityPatch"))?;
//! let record = patch.construct(json!({ "name": "renamed" }))?;
//!
//! assert_eq!(record.to_json(true), json!({ "name": "renamed" }));
//! assert!(patch.extends(&entity));
//! # Ok::<(), familiar_dto::SchemaError>(())
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Schema ──extract──> fields ──pick/omit──> ──rename──> ──partial──> SchemaFactory ──> Schema
//! ```
//!
//! The last step is pluggable through [`SchemaFactory`]; [`RecordFactory`] is
//! the default.

pub mod checksum;
pub mod config;
pub mod derive;
pub mod error;
pub mod field;
pub mod schema;
pub mod types;

pub use checksum::Checksum;
pub use config::DtoConfig;
pub use derive::{derive, DerivationSpec, Deriver};
pub use error::{ConstructionError, FieldIssue, IssueKind, Result, SchemaError, ValidationError};
pub use field::{FieldDefault, FieldDescriptor};
pub use schema::{
    BuildRequest, ConfigSource, ExtraPolicy, Record, RecordFactory, Schema, SchemaBuilder,
    SchemaConfig, SchemaFactory,
};
pub use types::FieldType;
