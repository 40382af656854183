//! # Check-Schema Subcommand
//!
//! Compiles a schema document without validating anything and prints the
//! resulting kind and type label. Unknown type names and malformed shapes
//! are reported here, before any document is touched.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::TypeArgs;

/// Arguments for the `strukt check-schema` subcommand.
#[derive(Args, Debug)]
pub struct CheckSchemaArgs {
    /// Schema document to compile.
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,

    #[command(flatten)]
    pub types: TypeArgs,
}

/// Execute the check-schema subcommand.
///
/// Returns exit code 0; compile errors propagate.
pub fn run_check_schema(args: &CheckSchemaArgs) -> Result<u8> {
    let compiled = crate::load_schema(&args.schema, &args.types.factory()?)?;
    println!("{}: {}", compiled.name(), compiled.type_label());
    Ok(0)
}
