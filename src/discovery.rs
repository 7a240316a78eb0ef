//! Spec directory discovery.
//!
//! Spec directories are the direct subdirectories of the spec root, visited in name order. Each contributes its
//! files ending with the configured suffix, also in name order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use wpt_core::names::file_prefix;

use crate::config::HarnessConfig;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid UTF-8", path.display())]
    NotUtf8 { path: PathBuf },
}

/// One test-definition file ready for evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFile {
    /// Name of the spec directory the file belongs to
    pub spec: String,
    pub file_name: String,
    pub path: PathBuf,
    pub source: String,
}

impl SpecFile {
    /// Registration prefix for the file's tests: `"{spec}›{file_name}›"`.
    pub fn prefix(&self) -> String {
        file_prefix(&self.spec, &self.file_name)
    }
}

/// Enumerates test-definition files.
pub trait SpecDiscovery {
    fn discover(&self) -> Result<Vec<SpecFile>, DiscoveryError>;
}

/// Filesystem discovery below a spec root.
#[derive(Debug, Clone)]
pub struct FsDiscovery {
    root: PathBuf,
    ignore: Vec<String>,
    suffix: String,
}

impl FsDiscovery {
    pub fn new(root: impl Into<PathBuf>, ignore: Vec<String>, suffix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ignore,
            suffix: suffix.into(),
        }
    }

    pub fn from_config(config: &HarnessConfig, ignore: Vec<String>) -> Self {
        Self::new(&config.spec_dir, ignore, &config.file_suffix)
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> DiscoveryError + '_ {
    move |source| DiscoveryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Entries of `dir` as `(name, path, is_dir)`, sorted by name.
fn sorted_entries(dir: &Path) -> Result<Vec<(String, PathBuf, bool)>, DiscoveryError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let path = entry.path();
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            return Err(DiscoveryError::NotUtf8 { path });
        };
        let is_dir = entry.file_type().map_err(io_error(&path))?.is_dir();
        entries.push((name, path, is_dir));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

impl SpecDiscovery for FsDiscovery {
    fn discover(&self) -> Result<Vec<SpecFile>, DiscoveryError> {
        let mut files = Vec::new();
        for (spec, spec_path, is_dir) in sorted_entries(&self.root)? {
            if !is_dir {
                tracing::debug!(entry = %spec, "not a spec directory");
                continue;
            }
            if self.ignore.contains(&spec) {
                tracing::info!(spec = %spec, "skipping ignored spec directory");
                continue;
            }
            for (file_name, path, is_dir) in sorted_entries(&spec_path)? {
                if is_dir || !file_name.ends_with(&self.suffix) {
                    continue;
                }
                let source = fs::read_to_string(&path).map_err(|source| match source.kind() {
                    io::ErrorKind::InvalidData => DiscoveryError::NotUtf8 { path: path.clone() },
                    _ => DiscoveryError::Io {
                        path: path.clone(),
                        source,
                    },
                })?;
                files.push(SpecFile {
                    spec: spec.clone(),
                    file_name,
                    path,
                    source,
                });
            }
        }
        tracing::debug!(files = files.len(), "discovery complete");
        Ok(files)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn layout() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for (spec, file) in [
            ("url", "b.any.json"),
            ("url", "a.any.json"),
            ("url", "notes.txt"),
            ("encoding", "api.any.json"),
            ("streams", "x.any.json"),
        ] {
            fs::create_dir_all(root.join(spec)).unwrap();
            fs::write(root.join(spec).join(file), format!("{spec}/{file}")).unwrap();
        }
        fs::write(root.join("README.md"), "not a spec").unwrap();
        dir
    }

    #[test]
    fn test_sorted_filtered_and_ignored() {
        let dir = layout();
        let discovery = FsDiscovery::new(dir.path(), vec!["streams".into()], ".any.json");
        let files = discovery.discover().unwrap();
        let found: Vec<_> = files.iter().map(|f| (f.spec.as_str(), f.file_name.as_str())).collect();
        assert_eq!(
            found,
            vec![("encoding", "api.any.json"), ("url", "a.any.json"), ("url", "b.any.json")]
        );
        assert_eq!(files[1].source, "url/a.any.json");
    }

    #[test]
    fn test_prefix() {
        let dir = layout();
        let files = FsDiscovery::new(dir.path(), Vec::new(), ".any.json").discover().unwrap();
        assert_eq!(files[0].prefix(), "encoding›api.any.json›");
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsDiscovery::new(dir.path().join("missing"), Vec::new(), ".any.json")
            .discover()
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Io { .. }));
    }
}
