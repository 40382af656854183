//! # strukt-cli: Command-Line Validation
//!
//! Provides the `strukt` command-line interface over `strukt-schema`.
//!
//! ## Subcommands
//!
//! - `strukt validate`: validate YAML/JSON documents against a schema
//!   document or a built-in dashboard preset.
//! - `strukt check-schema`: compile a schema document and print its type.
//!
//! ```bash
//! strukt validate --schema card.schema.yaml cards/*.yaml
//! strukt validate --preset entities-card --format json card.yaml
//! strukt check-schema --schema card.schema.yaml --types types.yaml
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers in each module.
//! - Handlers return an exit code: 0 valid, 1 invalid input. Operational
//!   errors (unreadable files, bad schemas) propagate as `anyhow::Error`.

pub mod check;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use strukt_schema::{dashboard, SchemaDocument, Struct, Superstruct, TypeRegistry, TypesConfig};

/// Where scalar type names are resolved.
#[derive(Args, Debug, Clone, Default)]
pub struct TypeArgs {
    /// YAML/JSON file declaring additional scalar types.
    #[arg(long, value_name = "FILE")]
    pub types: Option<PathBuf>,

    /// Register the dashboard types `entity-id` and `icon`.
    #[arg(long)]
    pub dashboard_types: bool,
}

impl TypeArgs {
    /// Build a factory over the built-ins plus the requested types.
    pub fn factory(&self) -> Result<Superstruct> {
        let mut builder = TypeRegistry::builder();
        if self.dashboard_types {
            builder = dashboard::register_types(builder);
        }
        if let Some(path) = &self.types {
            let config = TypesConfig::load(path)
                .with_context(|| format!("failed to load types from {}", path.display()))?;
            builder = config
                .apply(builder)
                .with_context(|| format!("invalid types in {}", path.display()))?;
        }
        let registry = builder.build();
        tracing::debug!(types = registry.len(), "built type registry");
        Ok(Superstruct::with_registry(registry))
    }
}

/// Load and compile a schema document.
pub fn load_schema(path: &std::path::Path, factory: &Superstruct) -> Result<Struct> {
    let document = SchemaDocument::load(path)
        .with_context(|| format!("failed to load schema {}", path.display()))?;
    document
        .compile(factory)
        .with_context(|| format!("failed to compile schema {}", path.display()))
}
