//! Schema Derivation
//!
//! Produces a new schema from a base schema in one linear pass:
//!
//! ```text
//! extract -> select (pick/omit) -> rename -> partialize -> assemble
//! ```
//!
//! Every check (unknown picks, rename collisions, factory rejections) fails
//! the whole derivation; nothing is cached and the base is never touched.

pub mod assemble;
pub mod extract;
pub mod partial;
pub mod rename;
pub mod select;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::schema::{RecordFactory, Schema, SchemaFactory};

/// A derivation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationSpec {
    /// Make every field optional with an absent default
    pub partial: bool,

    /// Keep only these fields; `None` or empty keeps all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pick: Option<Vec<String>>,

    /// Drop these fields if present
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub omit: Vec<String>,

    /// Source name -> target name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rename: BTreeMap<String, String>,

    /// Replacement configuration options for the derived schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,

    /// Name of the derived schema; defaults to the base name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
}

impl DerivationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    pub fn pick<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pick = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn omit<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omit.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename.insert(from.into(), to.into());
        self
    }

    /// Replace the derived schema's configuration with `options`
    pub fn config(mut self, options: Map<String, Value>) -> Self {
        self.config = Some(options);
        self
    }

    /// Add one option to the replacement configuration
    pub fn option(mut self, name: impl Into<String>, value: Value) -> Self {
        self.config.get_or_insert_with(Map::new).insert(name.into(), value);
        self
    }

    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Whether deriving with this spec reproduces the base schema
    pub fn is_noop(&self) -> bool {
        !self.partial
            && self.pick.as_ref().map_or(true, Vec::is_empty)
            && self.omit.is_empty()
            && self.rename.is_empty()
            && self.config.is_none()
            && self.output_name.is_none()
    }
}

/// Runs derivations against a [`SchemaFactory`]
#[derive(Debug, Clone)]
pub struct Deriver<F = RecordFactory> {
    factory: F,
}

impl Deriver<RecordFactory> {
    pub fn new() -> Self {
        Self::with_factory(RecordFactory::new())
    }
}

impl Default for Deriver<RecordFactory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SchemaFactory> Deriver<F> {
    pub fn with_factory(factory: F) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Derive a new schema from `base`
    #[tracing::instrument(level = "debug", skip_all, fields(base = %base.name()))]
    pub fn derive(&self, base: &Arc<Schema>, spec: &DerivationSpec) -> Result<Arc<Schema>> {
        let name = spec
            .output_name
            .clone()
            .unwrap_or_else(|| base.name().to_string());

        let fields = extract::extract_fields(base);
        let fields = select::select_fields(base.name(), fields, spec.pick.as_deref(), &spec.omit)?;
        let fields = rename::rename_fields(fields, &spec.rename)?;
        let fields = if spec.partial {
            partial::partialize(fields)
        } else {
            fields
        };

        let derived = assemble::assemble(&self.factory, base, name, fields, spec.config.as_ref())?;
        tracing::debug!(
            derived = %derived.name(),
            fields = derived.fields().len(),
            "derived schema"
        );
        Ok(derived)
    }
}

/// Derive a new schema from `base` with the default [`RecordFactory`]
pub fn derive(base: &Arc<Schema>, spec: &DerivationSpec) -> Result<Arc<Schema>> {
    Deriver::new().derive(base, spec)
}
