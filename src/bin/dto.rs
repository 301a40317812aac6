//! Schema DTO CLI
//!
//! Derives schemas from JSON Schema documents and prints the result.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use familiar_dto::config::{DtoConfig, NamedDerivation, OutputFormat};
use familiar_dto::schema::Identifiers;
use familiar_dto::{DerivationSpec, Schema};
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-dto")]
#[command(about = "Derive pick/omit/rename/partial schemas from JSON Schema documents")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive a schema and print it as JSON Schema
    Derive {
        #[command(flatten)]
        derivation: DerivationArgs,

        /// Single-line output
        #[arg(long)]
        compact: bool,
    },

    /// Show what a derivation changes, as a unified diff
    Diff {
        #[command(flatten)]
        derivation: DerivationArgs,
    },

    /// Run the derivations declared in the config file
    Run {
        /// Only run this derivation
        name: Option<String>,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a starter config file
    Init {
        /// Output path
        #[arg(short, long, default_value = "dto.toml")]
        output: String,
    },
}

#[derive(Args)]
struct DerivationArgs {
    /// Base schema (JSON Schema document)
    base: PathBuf,

    /// Derivation spec (TOML); the flags below are applied on top of it
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Keep only these fields
    #[arg(long, value_delimiter = ',')]
    pick: Vec<String>,

    /// Drop these fields
    #[arg(long, value_delimiter = ',')]
    omit: Vec<String>,

    /// Rename a field, as from=to (repeatable)
    #[arg(long, value_parser = parse_rename)]
    rename: Vec<(String, String)>,

    /// Make every field optional
    #[arg(long)]
    partial: bool,

    /// Replacement config option, as name=json (repeatable)
    #[arg(long = "option", value_parser = parse_option)]
    options: Vec<(String, serde_json::Value)>,

    /// Name of the derived schema
    #[arg(long)]
    name: Option<String>,
}

impl DerivationArgs {
    fn to_spec(&self) -> Result<DerivationSpec> {
        let mut spec = match &self.spec {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("reading spec {}", path.display()))?;
                toml::from_str(&content).with_context(|| format!("parsing spec {}", path.display()))?
            }
            None => DerivationSpec::new(),
        };

        if !self.pick.is_empty() {
            spec = spec.pick(self.pick.iter().cloned());
        }
        spec = spec.omit(self.omit.iter().cloned());
        for (from, to) in &self.rename {
            spec = spec.rename(from.clone(), to.clone());
        }
        if self.partial {
            spec = spec.partial(true);
        }
        for (name, value) in &self.options {
            spec = spec.option(name.clone(), value.clone());
        }
        if let Some(name) = &self.name {
            spec = spec.output_name(name.clone());
        }
        Ok(spec)
    }
}

fn parse_rename(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((from, to)) if !from.is_empty() && !to.is_empty() => Ok((from.to_string(), to.to_string())),
        _ => Err(format!("expected from=to, got '{}'", s)),
    }
}

fn parse_option(s: &str) -> Result<(String, serde_json::Value), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    // Bare words are taken as strings so `--option title=Patch` works
    let value = serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Derive { derivation, compact } => {
            let base = load_base(&derivation.base)?;
            let derived = base.derive(&derivation.to_spec()?)?;
            let format = if compact { OutputFormat::Compact } else { OutputFormat::Pretty };
            println!("{}", format.render(&derived.json_schema())?);
        }

        Commands::Diff { derivation } => {
            let base = load_base(&derivation.base)?;
            let derived = base.derive(&derivation.to_spec()?)?;
            let old = OutputFormat::Pretty.render(&base.json_schema())? + "\n";
            let new = OutputFormat::Pretty.render(&derived.json_schema())? + "\n";
            let diff = TextDiff::from_lines(&old, &new);
            print!(
                "{}",
                diff.unified_diff()
                    .context_radius(3)
                    .header(base.name(), derived.name())
            );
        }

        Commands::Run { name } => {
            let config = DtoConfig::load_from(cli.config.as_deref())?;
            if let Some(name) = &name {
                if !config.derivations.contains_key(name) {
                    bail!("no derivation named '{}' in config", name);
                }
            }
            for (key, derivation) in &config.derivations {
                if name.as_deref().map_or(false, |n| n != key) {
                    continue;
                }
                run_named(&config, key, derivation)?;
            }
        }

        Commands::Config { action: ConfigAction::Show } => {
            let config = DtoConfig::load_from(cli.config.as_deref())?;
            print!("{}", toml::to_string_pretty(&config)?);
        }

        Commands::Config { action: ConfigAction::Init { output } } => {
            let mut config = DtoConfig::default();
            config.derivations.insert(
                "entity_patch".to_string(),
                NamedDerivation {
                    base: PathBuf::from("entity.schema.json"),
                    spec: DerivationSpec::new().partial(true).output_name("EntityPatch"),
                },
            );
            config.save(&output).with_context(|| format!("writing {}", output))?;
            println!("✅ Created config file: {}", output);
        }
    }

    Ok(())
}

fn run_named(config: &DtoConfig, key: &str, derivation: &NamedDerivation) -> Result<()> {
    let base = load_base(&config.base_path(derivation))?;
    let spec = config
        .spec_for(key)
        .with_context(|| format!("derivation '{}' disappeared", key))?;
    let derived = base
        .derive(&spec)
        .with_context(|| format!("derivation '{}'", key))?;
    let rendered = config.output.format.render(&derived.json_schema())?;

    match config.output_path(derived.name()) {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, rendered + "\n")?;
            println!("✅ {} -> {}", derived.name(), path.display());
        }
        None => println!("{}", rendered),
    }

    if config.output.show_fingerprint {
        eprintln!("{} {}", derived.name(), derived.fingerprint().short());
    }
    Ok(())
}

fn load_base(path: &Path) -> Result<Arc<Schema>> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let doc: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

    // Documents without an identifier-like title are named after the file
    let identifiers = Identifiers::new();
    let name = match doc.get("title").and_then(|t| t.as_str()) {
        Some(title) if identifiers.is_valid(title) => None,
        _ => Some(identifiers.sanitize(&schema_stem(path))),
    };

    Schema::from_json_schema(&doc, name.as_deref())
        .with_context(|| format!("loading base schema {}", path.display()))
}

/// `base-entity.schema.json` -> `base-entity`
fn schema_stem(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    stem.strip_suffix(".schema").unwrap_or(stem).to_string()
}
