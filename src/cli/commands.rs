//! Command implementations

use std::fs;
use std::future::Future;
use std::path::Path;

use crate::config::HarnessConfig;
use crate::discovery::{FsDiscovery, SpecDiscovery};
use crate::host::{DeclarativeHost, ScriptHost};
use crate::registry::TestRegistry;
use crate::report::build_report;
use crate::runner::{self, ConsoleReporter};
use crate::store::{FsResultStore, ResultStore};

use super::{CliError, CliResult, ExitCode};

/// Drive `future` to completion on a single-threaded runtime.
fn block_on<F: Future>(future: F) -> CliResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| CliError::failure(format!("Error starting async runtime: {e}")))?;
    Ok(runtime.block_on(future))
}

/// `wpt run`: evaluate every discovered file, run, and persist.
///
/// A file that fails to evaluate is logged and skipped; the run continues but exits with failure.
pub fn run_suite(config: &HarnessConfig, runtime_version: Option<&str>) -> CliResult<ExitCode> {
    let ignore = config
        .load_ignore_list()
        .map_err(|e| CliError::failure(format!("Error: {e}")))?;
    let files = FsDiscovery::from_config(config, ignore)
        .discover()
        .map_err(|e| CliError::failure(format!("Error: {e}")))?;

    let host = DeclarativeHost::new();
    let runtime = match runtime_version {
        Some(version) => host.runtime_info().with_version(version),
        None => host.runtime_info(),
    };
    tracing::info!(version = %runtime.version, "using runtime");

    let mut registry = TestRegistry::new();
    let mut broken_files = 0usize;
    for file in &files {
        let mut registrar = registry.setup(file.prefix());
        if let Err(e) = host.evaluate(&file.source, &mut registrar) {
            broken_files += 1;
            tracing::error!(file = %file.path.display(), error = %e, "failed to evaluate test file");
        }
    }

    let (cases, catalog) = registry.into_parts();
    let result = block_on(runner::run(cases, &mut ConsoleReporter::new()))?;

    if config.persist {
        let store = FsResultStore::new(&config.result_dir, &config.catalog_path);
        store
            .persist_run(&runtime, &result, &catalog)
            .map_err(CliError::diagnostic)?;
    }

    if result.is_success() && broken_files == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// `wpt test <file>`: evaluate one file with an empty prefix and run it. Nothing is persisted.
pub fn test_file(path: &Path) -> CliResult<ExitCode> {
    let source = fs::read_to_string(path)
        .map_err(|e| CliError::failure(format!("Error reading {}: {e}", path.display())))?;

    let host = DeclarativeHost::new();
    let mut registry = TestRegistry::new();
    host.evaluate(&source, &mut registry.setup(""))
        .map_err(|e| CliError::failure(format!("Error evaluating {}: {e}", path.display())))?;

    let (cases, _) = registry.into_parts();
    let result = block_on(runner::run(cases, &mut ConsoleReporter::new()))?;
    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// `wpt build`: render the compatibility matrix.
pub fn build(config: &HarnessConfig) -> CliResult<ExitCode> {
    let store = FsResultStore::new(&config.result_dir, &config.catalog_path);
    let summary = build_report(&store, &config.report_path).map_err(CliError::diagnostic)?;
    println!(
        "wrote {} ({} versions, {} tests)",
        summary.path.display(),
        summary.versions,
        summary.tests
    );
    Ok(ExitCode::SUCCESS)
}
