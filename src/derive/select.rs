//! Field selection (pick/omit)

use std::collections::HashSet;

use crate::error::{Result, SchemaError};
use crate::field::FieldDescriptor;

/// Apply `pick` then `omit` to `fields`.
///
/// An absent or empty `pick` keeps every field. Picked names must exist on
/// the schema; omitted names need not. Survivors keep their original order.
pub fn select_fields(
    schema: &str,
    fields: Vec<FieldDescriptor>,
    pick: Option<&[String]>,
    omit: &[String],
) -> Result<Vec<FieldDescriptor>> {
    let pick: Option<HashSet<&str>> = match pick {
        Some(names) if !names.is_empty() => {
            if let Some(missing) = names.iter().find(|n| !fields.iter().any(|f| f.name == **n)) {
                return Err(SchemaError::FieldNotFound {
                    field: missing.clone(),
                    schema: schema.to_string(),
                });
            }
            Some(names.iter().map(String::as_str).collect())
        }
        _ => None,
    };
    let omit: HashSet<&str> = omit.iter().map(String::as_str).collect();

    let selected: Vec<FieldDescriptor> = fields
        .into_iter()
        .filter(|f| pick.as_ref().map_or(true, |p| p.contains(f.name.as_str())))
        .filter(|f| !omit.contains(f.name.as_str()))
        .collect();

    tracing::debug!(schema, kept = selected.len(), "selected fields");
    Ok(selected)
}
