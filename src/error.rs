//! Error types for schema derivation

use std::fmt;

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema derivation errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Field not found: '{field}' is not declared on schema {schema}")]
    FieldNotFound { field: String, schema: String },

    #[error("Duplicate field name: '{first}' and '{second}' both resolve to '{target}'")]
    DuplicateFieldName {
        target: String,
        first: String,
        second: String,
    },

    #[error("Failed to construct schema {schema}: {source}")]
    SchemaConstruction {
        schema: String,
        #[source]
        source: ConstructionError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejections raised by a [`SchemaFactory`](crate::schema::SchemaFactory)
/// when the requested field/config payload is structurally invalid.
#[derive(Error, Debug)]
pub enum ConstructionError {
    #[error("invalid schema name '{0}'")]
    InvalidSchemaName(String),

    #[error("invalid field name '{0}'")]
    InvalidFieldName(String),

    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("field '{field}' has an invalid type: {reason}")]
    InvalidType { field: String, reason: String },

    #[error("default {default} of field '{field}' is not a valid {expected}")]
    InvalidDefault {
        field: String,
        expected: String,
        default: serde_json::Value,
    },

    #[error("field '{field}' defaults to absent but its type {field_type} does not accept null")]
    AbsentNotAccepted { field: String, field_type: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Why a single field failed instance validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// A required field was not supplied
    Missing,
    /// The supplied value does not match the declared type
    TypeMismatch { expected: String },
    /// An undeclared key was supplied under `extra = "forbid"`
    ExtraForbidden,
    /// The key is not a field of the schema
    UnknownField,
    /// Mutation attempted on a frozen record
    Frozen,
    /// Input was not a JSON object
    NotAnObject,
    /// Attribute construction attempted without `from_attributes`
    FromAttributesDisabled,
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "{}: field required", self.field),
            IssueKind::TypeMismatch { expected } => {
                write!(f, "{}: expected {}", self.field, expected)
            }
            IssueKind::ExtraForbidden => write!(f, "{}: extra inputs are not permitted", self.field),
            IssueKind::UnknownField => write!(f, "{}: not a field", self.field),
            IssueKind::Frozen => write!(f, "{}: instance is frozen", self.field),
            IssueKind::NotAnObject => write!(f, "input should be an object"),
            IssueKind::FromAttributesDisabled => {
                write!(f, "construction from attributes is disabled")
            }
        }
    }
}

/// Every issue found while constructing or mutating a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} validation error(s) for {schema}: {}", .issues.len(), render_issues(.issues))]
pub struct ValidationError {
    pub schema: String,
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(schema: impl Into<String>, field: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            schema: schema.into(),
            issues: vec![FieldIssue {
                field: field.into(),
                kind,
            }],
        }
    }

    /// Whether any issue was reported for `field`
    pub fn has_issue(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
