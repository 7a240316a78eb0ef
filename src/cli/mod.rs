//! CLI module for the wpt harness
//!
//! ## Commands
//!
//! - `run` - Evaluate every spec directory, run all tests, persist the snapshot and catalog
//! - `test <file>` - Evaluate and run a single file without persisting anything
//! - `build` - Render the compatibility matrix from persisted snapshots
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::config::HarnessConfig;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Render a diagnostic through miette's report handler.
    pub fn diagnostic<D>(diagnostic: D) -> Self
    where
        D: miette::Diagnostic + Send + Sync + 'static,
    {
        Self::failure(format!("{:?}", miette::Report::new(diagnostic)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Web-platform conformance harness
#[derive(Parser, Debug)]
#[command(name = "wpt")]
#[command(version = VERSION)]
#[command(about = "Run web-platform conformance tests and build a cross-version compatibility matrix", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every spec directory and persist the results
    Run {
        /// Directory whose subdirectories hold test files
        #[arg(long, value_name = "DIR", default_value = "spec")]
        spec_dir: PathBuf,
        /// Directory receiving `<version>.json` snapshots
        #[arg(long, value_name = "DIR", default_value = "result")]
        result_dir: PathBuf,
        /// Catalog of test sources
        #[arg(long, value_name = "FILE", default_value = "testers.json")]
        catalog: PathBuf,
        /// JSON array of spec directory names to skip
        #[arg(long, value_name = "FILE", default_value = "ignore.json")]
        ignore: PathBuf,
        /// Record the snapshot under this version id instead of the host's
        #[arg(long, value_name = "VERSION")]
        runtime_version: Option<String>,
        /// Do not persist the snapshot or the catalog
        #[arg(long)]
        no_save: bool,
    },

    /// Run a single test file without persisting results
    Test {
        /// Test file to evaluate
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Render the compatibility matrix
    Build {
        /// Directory holding `<version>.json` snapshots
        #[arg(long, value_name = "DIR", default_value = "result")]
        result_dir: PathBuf,
        /// Catalog of test sources
        #[arg(long, value_name = "FILE", default_value = "testers.json")]
        catalog: PathBuf,
        /// Output document
        #[arg(long, value_name = "FILE", default_value = "index.html")]
        out: PathBuf,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Run {
            spec_dir,
            result_dir,
            catalog,
            ignore,
            runtime_version,
            no_save,
        } => {
            let config = HarnessConfig::new()
                .with_spec_dir(spec_dir)
                .with_result_dir(result_dir)
                .with_catalog_path(catalog)
                .with_ignore_path(ignore)
                .with_persist(!no_save);
            commands::run_suite(&config, runtime_version.as_deref())
        }
        Command::Test { file } => commands::test_file(&file),
        Command::Build {
            result_dir,
            catalog,
            out,
        } => {
            let config = HarnessConfig::new()
                .with_result_dir(result_dir)
                .with_catalog_path(catalog)
                .with_report_path(out);
            commands::build(&config)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
