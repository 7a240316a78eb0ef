//! Harness configuration
//!
//! Paths default to the layout of a harness checkout: spec directories under `spec/`, snapshots under `result/`,
//! the catalog and report at the root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors loading the ignore list.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read ignore list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ignore list {} must be a JSON array of directory names: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Directory whose subdirectories are spec directories
    pub spec_dir: PathBuf,
    /// Directory holding one `<version>.json` snapshot per runtime version
    pub result_dir: PathBuf,
    /// Catalog of qualified names to test source text
    pub catalog_path: PathBuf,
    /// Rendered compatibility matrix
    pub report_path: PathBuf,
    /// JSON array of spec directory names to skip
    pub ignore_path: PathBuf,
    /// Suffix a file must end with to be evaluated
    pub file_suffix: String,
    /// Persist the snapshot and catalog after a run
    pub persist: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            spec_dir: PathBuf::from("spec"),
            result_dir: PathBuf::from("result"),
            catalog_path: PathBuf::from("testers.json"),
            report_path: PathBuf::from("index.html"),
            ignore_path: PathBuf::from("ignore.json"),
            file_suffix: ".any.json".to_string(),
            persist: true,
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spec_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spec_dir = dir.into();
        self
    }

    pub fn with_result_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.result_dir = dir.into();
        self
    }

    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = path.into();
        self
    }

    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    pub fn with_ignore_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_path = path.into();
        self
    }

    pub fn with_file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    /// Enable or disable persistence of run results
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Load the ignore list from [`HarnessConfig::ignore_path`].
    ///
    /// A missing file means nothing is ignored.
    pub fn load_ignore_list(&self) -> Result<Vec<String>, ConfigError> {
        load_ignore_list(&self.ignore_path)
    }
}

fn load_ignore_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
