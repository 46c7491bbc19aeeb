use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface for the `schemasync` application.
#[derive(Debug, Parser)]
#[command(
    name = "schemasync",
    about = "Export and import declarative content-type field schemas"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available `schemasync` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Exports live fields from a store snapshot into a schema document.
    Export {
        /// Path to the live store snapshot.
        #[arg(long, value_name = "FILE")]
        store: PathBuf,
        /// Output path for the schema document (stdout when omitted).
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Field handles to export (all fields when omitted).
        handles: Vec<String>,
    },
    /// Imports a schema document into the store snapshot.
    Import {
        /// Path to the live store snapshot (created when missing).
        #[arg(long, value_name = "FILE")]
        store: PathBuf,
        /// Schema document to import.
        schema: PathBuf,
        /// Deletes live entities absent from the document.
        #[arg(long, default_value_t = false)]
        force: bool,
        /// Previews the import without writing the store back.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}
