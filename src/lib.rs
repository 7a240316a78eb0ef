#![forbid(unsafe_code)]
//! Web-platform conformance harness
//!
//! Evaluates test-definition files, runs their tests against the `wpt_asserts` assertion library, stores one
//! snapshot of outcomes per runtime version, and renders the snapshots as a cross-version compatibility matrix.
//!
//! ## Flow
//!
//! - [`discovery`] finds the files of each spec directory.
//! - A [`host::ScriptHost`] evaluates each file, registering tests through a [`registry::Registrar`].
//! - [`runner::run`] executes the registered tests one at a time.
//! - [`store`] persists the run's snapshot and the test catalog.
//! - [`report`] reads every snapshot back and renders the page.
//!
//! ## Panic Policy
//!
//! - **Production code**: errors are returned as `Result`; the `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` is acceptable in tests.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod host;
pub mod registry;
pub mod report;
pub mod runner;
pub mod store;

pub use config::HarnessConfig;
pub use registry::{Registrar, TestCase, TestFunction, TestRegistry, TesterCatalog};
pub use report::{Report, build_report};
pub use runner::{ConsoleReporter, RunReporter, run};
pub use store::{FsResultStore, ResultStore, RuntimeInfo, VersionSnapshot};
pub use wpt_core::{QualifiedName, RunResult, TestOutcome, Thrown, Value};
