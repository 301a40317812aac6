//! Field renaming

use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, SchemaError};
use crate::field::FieldDescriptor;

/// Give every field its target name.
///
/// Fields without an entry in `rename` keep their name; entries for fields
/// that are not in `fields` are ignored. Two fields ending up with the same
/// name is an error naming both source fields.
pub fn rename_fields(
    fields: Vec<FieldDescriptor>,
    rename: &BTreeMap<String, String>,
) -> Result<Vec<FieldDescriptor>> {
    let mut claimed: HashMap<String, String> = HashMap::with_capacity(fields.len());
    let mut renamed = Vec::with_capacity(fields.len());

    for field in fields {
        let target = rename.get(&field.name).cloned().unwrap_or_else(|| field.name.clone());
        if let Some(first) = claimed.get(&target) {
            return Err(SchemaError::DuplicateFieldName {
                target,
                first: first.clone(),
                second: field.name,
            });
        }
        claimed.insert(target.clone(), field.name.clone());

        if target != field.name {
            tracing::debug!(from = %field.name, to = %target, "renamed field");
            renamed.push(field.renamed(target));
        } else {
            renamed.push(field);
        }
    }

    Ok(renamed)
}
