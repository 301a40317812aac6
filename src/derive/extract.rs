//! Field extraction

use crate::field::FieldDescriptor;
use crate::schema::Schema;

/// Descriptors of `schema` in declaration order.
///
/// A schema without fields yields an empty list.
pub fn extract_fields(schema: &Schema) -> Vec<FieldDescriptor> {
    schema.fields().to_vec()
}
