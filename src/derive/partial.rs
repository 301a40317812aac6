//! Partial derivation

use crate::field::{FieldDefault, FieldDescriptor};

/// Make a field optional with an absent default, whatever it was before
pub fn partialize_field(field: FieldDescriptor) -> FieldDescriptor {
    FieldDescriptor {
        field_type: field.field_type.or_absent(),
        default: FieldDefault::Absent,
        ..field
    }
}

/// Make every field optional with an absent default
pub fn partialize(fields: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
    tracing::debug!(fields = fields.len(), "partializing fields");
    fields.into_iter().map(partialize_field).collect()
}
