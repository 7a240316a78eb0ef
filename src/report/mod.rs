//! Report builder
//!
//! Turns every persisted [`VersionSnapshot`] plus the current [`TesterCatalog`] into one static HTML page: a column
//! per version (newest first, each with its coverage percent) and a row per catalogued test, grouped into
//! category → subcategory → leaf tables.
//!
//! ## Modules
//!
//! - `version` - version id ordering
//! - `tree` - grouping of qualified names
//! - `html` - escaping, cells and the document itself
//!
//! Report generation is fail-fast: any malformed snapshot or catalog aborts it before anything is written.

pub mod html;
pub mod tree;
pub mod version;

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::registry::TesterCatalog;
use crate::store::{ResultStore, StoreError, VersionSnapshot};

pub use html::{Cell, anchor_id, escape, percent};
pub use tree::CategoryTree;
pub use version::{compare_versions, sort_newest_first};

#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error("two snapshots claim version `{version}`")]
    #[diagnostic(
        code(wpt::report::duplicate_version),
        help("each file in the result directory must hold a distinct version")
    )]
    DuplicateVersion { version: String },

    #[error("failed to write report to {}", path.display())]
    #[diagnostic(code(wpt::report::write))]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Snapshots in column order together with the grouped catalog.
#[derive(Debug, Clone)]
pub struct Report {
    versions: Vec<VersionSnapshot>,
    tree: CategoryTree,
    catalog_size: usize,
}

impl Report {
    /// ## Returns
    /// - The report, with `snapshots` sorted newest first.
    /// - [`ReportError::DuplicateVersion`] when two snapshots share a version id.
    pub fn new(mut snapshots: Vec<VersionSnapshot>, catalog: &TesterCatalog) -> Result<Self, ReportError> {
        let mut seen = HashSet::new();
        for snapshot in &snapshots {
            if !seen.insert(snapshot.version.as_str()) {
                return Err(ReportError::DuplicateVersion {
                    version: snapshot.version.clone(),
                });
            }
        }
        sort_newest_first(&mut snapshots, |s| s.version.as_str());
        Ok(Self {
            versions: snapshots,
            tree: CategoryTree::from_catalog(catalog),
            catalog_size: catalog.len(),
        })
    }

    /// Version ids in column order.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.versions.iter().map(|s| s.version.as_str())
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    /// Coverage percent per version, in column order.
    pub fn percents(&self) -> impl Iterator<Item = (&str, u64)> {
        self.versions
            .iter()
            .map(|s| (s.version.as_str(), percent(s, self.catalog_size)))
    }

    pub fn header_row(&self) -> String {
        html::header_row(&self.versions, self.catalog_size)
    }

    pub fn render(&self) -> String {
        html::render(&self.versions, &self.tree, self.catalog_size)
    }
}

/// Outcome of [`build_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub versions: usize,
    pub tests: usize,
    pub path: PathBuf,
}

/// Load everything from `store`, render, and write the page to `out`.
#[tracing::instrument(skip_all, fields(out = %out.display()))]
pub fn build_report(store: &dyn ResultStore, out: &Path) -> Result<ReportSummary, ReportError> {
    let catalog = store.load_catalog()?;
    let snapshots = store.load_snapshots()?;
    let report = Report::new(snapshots, &catalog)?;

    let html = report.render();
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::Write {
            path: out.to_path_buf(),
            source,
        })?;
    }
    fs::write(out, html).map_err(|source| ReportError::Write {
        path: out.to_path_buf(),
        source,
    })?;

    let summary = ReportSummary {
        versions: report.versions.len(),
        tests: catalog.len(),
        path: out.to_path_buf(),
    };
    tracing::info!(versions = summary.versions, tests = summary.tests, "report written");
    Ok(summary)
}
