//! # Validate Subcommand
//!
//! Validates YAML/JSON documents against a schema document or a dashboard
//! preset. Every document is checked; the exit code reflects whether any
//! of them failed.
//!
//! Text output prints one `OK:` or `FAIL:` line per document followed by
//! one `path: message` line per failure. JSON output prints one report
//! object per document.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use strukt_core::{join_path, Failure, StructError};
use strukt_schema::{dashboard, load_value, Struct};

use crate::TypeArgs;

/// Output format for validation reports.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON report per document.
    Json,
}

/// Arguments for the `strukt validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema document to validate against.
    #[arg(long, value_name = "FILE", conflicts_with = "preset")]
    pub schema: Option<PathBuf>,

    /// Built-in dashboard preset to validate against.
    #[arg(
        long,
        value_name = "NAME",
        value_parser = clap::builder::PossibleValuesParser::new(dashboard::PRESETS.iter().copied())
    )]
    pub preset: Option<String>,

    #[command(flatten)]
    pub types: TypeArgs,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Documents to validate.
    #[arg(value_name = "DOCUMENT", required = true)]
    pub documents: Vec<PathBuf>,
}

/// Validation result for one document.
#[derive(Debug, Serialize)]
pub struct DocumentReport {
    /// The document path as given.
    pub document: String,
    /// Whether the document passed.
    pub valid: bool,
    /// The validation error, when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StructError>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every document is valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let schema = resolve_schema(args)?;
    tracing::info!(
        type_label = schema.type_label(),
        documents = args.documents.len(),
        "validating documents"
    );

    let mut had_failures = false;
    for path in &args.documents {
        let report = validate_document(&schema, path)?;
        had_failures |= !report.valid;
        match args.format {
            OutputFormat::Text => {
                for line in render_text(&report) {
                    println!("{line}");
                }
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&report)
                    .context("failed to serialize report")?;
                println!("{json}");
            }
        }
    }

    Ok(u8::from(had_failures))
}

fn resolve_schema(args: &ValidateArgs) -> Result<Struct> {
    match (&args.schema, &args.preset) {
        (Some(path), _) => crate::load_schema(path, &args.types.factory()?),
        (None, Some(name)) => dashboard::preset(name)
            .with_context(|| format!("failed to build dashboard preset {name}")),
        (None, None) => bail!("either --schema or --preset is required"),
    }
}

/// Load one document and validate it.
pub fn validate_document(schema: &Struct, path: &Path) -> Result<DocumentReport> {
    let value = load_value(path)
        .with_context(|| format!("failed to load document {}", path.display()))?;
    let error = schema.validate(Some(&value)).err();
    if let Some(e) = &error {
        tracing::debug!(document = %path.display(), failures = e.errors.len(), "document invalid");
    }
    Ok(DocumentReport {
        document: path.display().to_string(),
        valid: error.is_none(),
        error,
    })
}

/// Text lines for one report.
pub fn render_text(report: &DocumentReport) -> Vec<String> {
    match &report.error {
        None => vec![format!("OK: {}", report.document)],
        Some(error) => std::iter::once(format!("FAIL: {}", report.document))
            .chain(error.errors.iter().map(|f| format!("  {}", failure_line(f))))
            .collect(),
    }
}

fn failure_line(failure: &Failure) -> String {
    let path = if failure.path.is_empty() {
        "<root>".to_string()
    } else {
        join_path(&failure.path)
    };
    match &failure.reason {
        Some(reason) => format!("{path}: {} {reason}", failure.message()),
        None => format!("{path}: {}", failure.message()),
    }
}
