//! Schema assembly

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::field::FieldDescriptor;
use crate::schema::{BuildRequest, ConfigSource, Schema, SchemaFactory};

/// Hand the final fields to `factory` as an extension of `base`.
///
/// With `config`, the new schema's configuration is built from that mapping
/// alone; otherwise it is inherited from `base`. Factory rejections come
/// back as [`SchemaError::SchemaConstruction`] for `name`.
pub fn assemble<F: SchemaFactory>(
    factory: &F,
    base: &Arc<Schema>,
    name: String,
    fields: Vec<FieldDescriptor>,
    config: Option<&Map<String, Value>>,
) -> Result<Arc<Schema>> {
    let request = BuildRequest {
        name: name.clone(),
        fields,
        parent: Some(Arc::clone(base)),
        config: match config {
            Some(options) => ConfigSource::Replace(options.clone()),
            None => ConfigSource::Inherit,
        },
    };

    factory
        .build(request)
        .map(Arc::new)
        .map_err(|source| SchemaError::SchemaConstruction { schema: name, source })
}
