//! Configuration management for schema-dto
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (dto.toml)
//! - Environment variables (DTO__*)
//!
//! `[derivations]` tables are read from the config files only, straight
//! through `toml`, so field names, option names and table keys keep their
//! case. The layered loader lowercases keys, which would break renames of
//! camelCase fields.
//!
//! ## Example config file (dto.toml):
//! ```toml
//! [schemas]
//! dir = "./schemas"
//!
//! [output]
//! format = "pretty"
//! dir = "./generated"
//!
//! [derivations.entity_patch]
//! base = "entity.schema.json"
//! output_name = "EntityPatch"
//! partial = true
//! omit = ["created_at"]
//!
//! [derivations.entity_patch.config]
//! title = "Entity patch"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::derive::DerivationSpec;

/// Main configuration for schema-dto
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DtoConfig {
    /// Where base schemas live
    #[serde(default)]
    pub schemas: SchemasConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Named derivations; the key doubles as the output name when
    /// `output_name` is not set
    #[serde(default)]
    pub derivations: BTreeMap<String, NamedDerivation>,
}

/// Base schema location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemasConfig {
    /// Directory that `base` paths are resolved against
    #[serde(default = "default_schemas_dir")]
    pub dir: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON layout
    #[serde(default)]
    pub format: OutputFormat,

    /// Write derived schemas here instead of stdout
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Print each derived schema's fingerprint
    #[serde(default = "default_true")]
    pub show_fingerprint: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn render(&self, value: &serde_json::Value) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

/// One derivation declared in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedDerivation {
    /// Base schema file, relative to `schemas.dir`
    pub base: PathBuf,

    #[serde(flatten)]
    pub spec: DerivationSpec,
}

/// The `[derivations]` part of one config file
#[derive(Debug, Default, Deserialize)]
struct DerivationsFile {
    #[serde(default)]
    derivations: BTreeMap<String, NamedDerivation>,
}

/// Existing config files at the default locations, in load order
fn default_config_files() -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = ["dto.toml", ".dto.toml", "config/dto.toml"]
        .into_iter()
        .map(PathBuf::from)
        .collect();

    // XDG config directory
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "dto") {
        files.push(config_dir.config_dir().join("dto.toml"));
    }

    files.retain(|path| path.is_file());
    files
}

/// An explicit config path may omit its `.toml` extension
fn resolve_config_path(path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.extension().is_none() && !path.exists() {
        path.with_extension("toml")
    } else {
        path
    }
}

/// Read derivation tables from `files`, preserving key case.
///
/// A derivation defined in several files takes the last definition whole.
fn load_derivations(files: &[PathBuf]) -> Result<BTreeMap<String, NamedDerivation>, ConfigError> {
    let mut derivations = BTreeMap::new();
    for path in files {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Message(format!("{}: {}", path.display(), e)))?;
        let file: DerivationsFile = toml::from_str(&content)
            .map_err(|e| ConfigError::Message(format!("{}: {}", path.display(), e)))?;
        derivations.extend(file.derivations);
    }
    Ok(derivations)
}

// Default value functions
fn default_schemas_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

impl Default for SchemasConfig {
    fn default() -> Self {
        Self {
            dir: default_schemas_dir(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pretty,
            dir: None,
            show_fingerprint: true,
        }
    }
}

impl DtoConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally adding a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        let mut files = default_config_files();

        // Load from default locations
        for path in &files {
            builder = builder.add_source(File::from(path.as_path()).required(false));
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (DTO__*)
        builder = builder.add_source(
            Environment::with_prefix("DTO")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut loaded: Self = config.try_deserialize()?;

        if let Some(path) = config_path {
            files.push(resolve_config_path(path));
        }
        loaded.derivations = load_derivations(&files)?;
        tracing::debug!(derivations = loaded.derivations.len(), "loaded dto config");
        Ok(loaded)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Resolve a derivation's base schema path
    pub fn base_path(&self, derivation: &NamedDerivation) -> PathBuf {
        if derivation.base.is_absolute() {
            derivation.base.clone()
        } else {
            self.schemas.dir.join(&derivation.base)
        }
    }

    /// Spec for a named derivation, with the key as fallback output name
    pub fn spec_for(&self, key: &str) -> Option<DerivationSpec> {
        let derivation = self.derivations.get(key)?;
        let mut spec = derivation.spec.clone();
        if spec.output_name.is_none() {
            spec.output_name = Some(key.to_string());
        }
        Some(spec)
    }

    /// Where a derived schema is written, if an output directory is set
    pub fn output_path(&self, name: &str) -> Option<PathBuf> {
        self.output
            .dir
            .as_deref()
            .map(|dir: &Path| dir.join(format!("{}.schema.json", name)))
    }
}
