//! Command-line interface for the `schemasync` application.
//!
//! Loads a live store snapshot and a declarative schema document from
//! disk, runs the engine over them, and reports per-field outcomes with
//! a non-zero exit code when anything failed.

mod cli;
mod runner;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match runner::dispatch(cli::Cli::parse()) {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
