//! Durable run results.
//!
//! One [`VersionSnapshot`] per runtime version lives at `<result_dir>/<version>.json`; the [`TesterCatalog`] lives
//! in its own file. Both are written as two-space pretty JSON and overwritten in full, so the last writer for a
//! version wins.
//!
//! ## Snapshot format
//!
//! ```json
//! {
//!   "version": "1.2.0",
//!   "engineVersion": "8.4.300",
//!   "langVersion": "3.9.2",
//!   "result": { "_passed": 1, "_failed": 2, "a›b›ok": true, "a›b›bad": false, "a›b›threw": "boom" }
//! }
//! ```
//!
//! `Failed` is stored as `false` and loads back with an empty message.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wpt_core::{QualifiedName, RunResult, TestOutcome};

use crate::registry::TesterCatalog;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("failed to access {}", path.display())]
    #[diagnostic(code(wpt::store::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed result data in {}", path.display())]
    #[diagnostic(
        code(wpt::store::decode),
        help("regenerate the file with `wpt run` or remove it")
    )]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {what}")]
    #[diagnostic(code(wpt::store::encode))]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{version}` is not a usable version id")]
    #[diagnostic(
        code(wpt::store::invalid_version),
        help("version ids may only contain ASCII letters, digits, `.`, `-`, `+` and `_`")
    )]
    InvalidVersion { version: String },

    #[error("test name `{name}` collides with a snapshot count key")]
    #[diagnostic(
        code(wpt::store::reserved_name),
        help("`_passed` and `_failed` hold the counts; register the test under a spec/file prefix")
    )]
    ReservedName { name: String },
}

/// Persisted counts that disagree with the persisted outcomes.
#[derive(Debug, Error)]
#[error("recorded {recorded_passed} passed / {recorded_failed} failed, outcomes give {passed} / {failed}")]
pub struct CountMismatch {
    recorded_passed: usize,
    recorded_failed: usize,
    passed: usize,
    failed: usize,
}

// ============================================================================
// Snapshot model
// ============================================================================

/// Identity of the runtime a run was made with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeInfo {
    pub version: String,
    pub engine_version: String,
    pub lang_version: String,
}

impl RuntimeInfo {
    pub fn new(
        version: impl Into<String>,
        engine_version: impl Into<String>,
        lang_version: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            engine_version: engine_version.into(),
            lang_version: lang_version.into(),
        }
    }

    /// Same runtime, reported under another version id.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// The outcomes of one run, keyed by runtime version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SnapshotRecord", try_from = "SnapshotRecord")]
pub struct VersionSnapshot {
    pub version: String,
    pub engine_version: String,
    pub lang_version: String,
    pub result: RunResult,
}

impl VersionSnapshot {
    pub fn new(runtime: &RuntimeInfo, result: RunResult) -> Self {
        Self {
            version: runtime.version.clone(),
            engine_version: runtime.engine_version.clone(),
            lang_version: runtime.lang_version.clone(),
            result,
        }
    }

    /// Decode a snapshot from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Encode as two-space pretty JSON.
    ///
    /// Fails when an outcome is named after a count key, since the file would not decode.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        if let Some(name) = self.reserved_name() {
            return Err(serde::ser::Error::custom(format!(
                "test name `{name}` collides with a snapshot count key"
            )));
        }
        serde_json::to_string_pretty(self)
    }

    /// The first outcome whose name is a reserved count key, if any.
    pub fn reserved_name(&self) -> Option<&QualifiedName> {
        self.result
            .outcomes()
            .map(|(name, _)| name)
            .find(|name| is_reserved_name(name.as_str()))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRecord {
    version: String,
    engine_version: String,
    lang_version: String,
    result: ResultRecord,
}

#[derive(Serialize, Deserialize)]
struct ResultRecord {
    #[serde(rename = "_passed")]
    passed: usize,
    #[serde(rename = "_failed")]
    failed: usize,
    #[serde(flatten)]
    outcomes: IndexMap<String, OutcomeRecord>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OutcomeRecord {
    Status(bool),
    Error(String),
}

impl From<VersionSnapshot> for SnapshotRecord {
    fn from(snapshot: VersionSnapshot) -> Self {
        let outcomes = snapshot
            .result
            .outcomes()
            .map(|(name, outcome)| {
                let record = match outcome {
                    TestOutcome::Passed => OutcomeRecord::Status(true),
                    TestOutcome::Failed(_) => OutcomeRecord::Status(false),
                    TestOutcome::Errored(message) => OutcomeRecord::Error(message.clone()),
                };
                (name.to_string(), record)
            })
            .collect();
        Self {
            version: snapshot.version,
            engine_version: snapshot.engine_version,
            lang_version: snapshot.lang_version,
            result: ResultRecord {
                passed: snapshot.result.passed(),
                failed: snapshot.result.failed(),
                outcomes,
            },
        }
    }
}

impl TryFrom<SnapshotRecord> for VersionSnapshot {
    type Error = CountMismatch;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        let result: RunResult = record
            .result
            .outcomes
            .into_iter()
            .map(|(name, outcome)| {
                let outcome = match outcome {
                    OutcomeRecord::Status(true) => TestOutcome::Passed,
                    OutcomeRecord::Status(false) => TestOutcome::Failed(String::new()),
                    OutcomeRecord::Error(message) => TestOutcome::Errored(message),
                };
                (QualifiedName::from(name), outcome)
            })
            .collect();
        if result.passed() != record.result.passed || result.failed() != record.result.failed {
            return Err(CountMismatch {
                recorded_passed: record.result.passed,
                recorded_failed: record.result.failed,
                passed: result.passed(),
                failed: result.failed(),
            });
        }
        Ok(Self {
            version: record.version,
            engine_version: record.engine_version,
            lang_version: record.lang_version,
            result,
        })
    }
}

/// Keys of the `result` object that hold counts rather than outcomes.
pub const RESERVED_NAMES: [&str; 2] = ["_passed", "_failed"];

/// Whether a test named `name` would collide with a count key.
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Whether `version` can name a snapshot file.
pub fn is_valid_version_id(version: &str) -> bool {
    !version.is_empty()
        && !version.starts_with('.')
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_'))
}

// ============================================================================
// Store
// ============================================================================

/// Persistence of snapshots and the catalog.
pub trait ResultStore {
    /// Write `snapshot`, replacing any earlier snapshot of the same version.
    fn save_snapshot(&self, snapshot: &VersionSnapshot) -> Result<(), StoreError>;

    /// All persisted snapshots, in no particular version order.
    fn load_snapshots(&self) -> Result<Vec<VersionSnapshot>, StoreError>;

    fn save_catalog(&self, catalog: &TesterCatalog) -> Result<(), StoreError>;

    fn load_catalog(&self) -> Result<TesterCatalog, StoreError>;

    /// Persist the outcome of a finished run: its snapshot, then the catalog.
    fn persist_run(
        &self,
        runtime: &RuntimeInfo,
        result: &RunResult,
        catalog: &TesterCatalog,
    ) -> Result<(), StoreError> {
        self.save_snapshot(&VersionSnapshot::new(runtime, result.clone()))?;
        self.save_catalog(catalog)
    }
}

/// [`ResultStore`] over plain JSON files.
#[derive(Debug, Clone)]
pub struct FsResultStore {
    result_dir: PathBuf,
    catalog_path: PathBuf,
}

impl FsResultStore {
    pub fn new(result_dir: impl Into<PathBuf>, catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            result_dir: result_dir.into(),
            catalog_path: catalog_path.into(),
        }
    }

    pub fn snapshot_path(&self, version: &str) -> PathBuf {
        self.result_dir.join(format!("{version}.json"))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, StoreError> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    serde_json::from_str(&text).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

impl ResultStore for FsResultStore {
    fn save_snapshot(&self, snapshot: &VersionSnapshot) -> Result<(), StoreError> {
        if !is_valid_version_id(&snapshot.version) {
            return Err(StoreError::InvalidVersion {
                version: snapshot.version.clone(),
            });
        }
        if let Some(name) = snapshot.reserved_name() {
            return Err(StoreError::ReservedName { name: name.to_string() });
        }
        let json = snapshot.to_json().map_err(|source| StoreError::Encode {
            what: "snapshot",
            source,
        })?;
        fs::create_dir_all(&self.result_dir).map_err(io_error(&self.result_dir))?;
        let path = self.snapshot_path(&snapshot.version);
        fs::write(&path, json).map_err(io_error(&path))?;
        tracing::info!(path = %path.display(), version = %snapshot.version, "snapshot saved");
        Ok(())
    }

    fn load_snapshots(&self) -> Result<Vec<VersionSnapshot>, StoreError> {
        let entries = match fs::read_dir(&self.result_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(dir = %self.result_dir.display(), "result directory missing; no snapshots");
                return Ok(Vec::new());
            }
            Err(source) => return Err(io_error(&self.result_dir)(source)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_error(&self.result_dir))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        paths.iter().map(|path| read_json(path)).collect()
    }

    fn save_catalog(&self, catalog: &TesterCatalog) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(catalog).map_err(|source| StoreError::Encode {
            what: "catalog",
            source,
        })?;
        if let Some(parent) = self.catalog_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::write(&self.catalog_path, json).map_err(io_error(&self.catalog_path))?;
        tracing::info!(path = %self.catalog_path.display(), tests = catalog.len(), "catalog saved");
        Ok(())
    }

    fn load_catalog(&self) -> Result<TesterCatalog, StoreError> {
        read_json(&self.catalog_path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> VersionSnapshot {
        let result: RunResult = [
            ("a›b›ok".into(), TestOutcome::Passed),
            ("a›b›bad".into(), TestOutcome::Failed("x".into())),
            ("a›b›threw".into(), TestOutcome::Errored("boom".into())),
        ]
        .into_iter()
        .collect();
        VersionSnapshot::new(&RuntimeInfo::new("1.2.0", "8.4.300", "3.9.2"), result)
    }

    // ========================================
    // Wire format
    // ========================================

    #[test]
    fn test_wire_format() {
        let value: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "version": "1.2.0",
                "engineVersion": "8.4.300",
                "langVersion": "3.9.2",
                "result": {"_passed": 1, "_failed": 2, "a›b›ok": true, "a›b›bad": false, "a›b›threw": "boom"}
            })
        );
    }

    #[test]
    fn test_pretty_printed_with_two_spaces() {
        let json = sample().to_json().unwrap();
        assert!(json.starts_with("{\n  \"version\": \"1.2.0\""));
    }

    #[test]
    fn test_decode_keeps_order_and_drops_failure_message() {
        let decoded = VersionSnapshot::from_json(&sample().to_json().unwrap()).unwrap();
        let names: Vec<_> = decoded.result.outcomes().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a›b›ok", "a›b›bad", "a›b›threw"]);
        assert_eq!(decoded.result.get(&"a›b›bad".into()), Some(&TestOutcome::Failed(String::new())));
        assert_eq!(decoded.result.get(&"a›b›threw".into()), Some(&TestOutcome::Errored("boom".into())));
    }

    #[test]
    fn test_decode_rejects_inconsistent_counts() {
        let text = r#"{"version":"1","engineVersion":"","langVersion":"","result":{"_passed":5,"_failed":0,"t":true}}"#;
        let err = VersionSnapshot::from_json(text).unwrap_err();
        assert!(err.to_string().contains("recorded 5 passed"));
    }

    #[test]
    fn test_decode_rejects_non_status_outcome() {
        let text = r#"{"version":"1","engineVersion":"","langVersion":"","result":{"_passed":0,"_failed":0,"t":3}}"#;
        assert!(VersionSnapshot::from_json(text).is_err());
    }

    // ========================================
    // Version ids
    // ========================================

    #[test]
    fn test_version_id_validation() {
        assert!(is_valid_version_id("1.10.0"));
        assert!(is_valid_version_id("2.0.0-rc.1+build_7"));
        assert!(!is_valid_version_id(""));
        assert!(!is_valid_version_id("../escape"));
        assert!(!is_valid_version_id("a/b"));
    }

    // ========================================
    // File store
    // ========================================

    #[test]
    fn test_save_rejects_path_like_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsResultStore::new(dir.path().join("result"), dir.path().join("testers.json"));
        let mut snapshot = sample();
        snapshot.version = "../x".into();
        assert!(matches!(
            store.save_snapshot(&snapshot),
            Err(StoreError::InvalidVersion { .. })
        ));
    }

    #[test]
    fn test_reserved_outcome_name_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsResultStore::new(dir.path().join("result"), dir.path().join("testers.json"));
        let result: RunResult = [("_passed".into(), TestOutcome::Passed)].into_iter().collect();
        let snapshot = VersionSnapshot::new(&RuntimeInfo::new("1.0.0", "", ""), result);

        assert!(snapshot.to_json().is_err());
        assert!(matches!(
            store.save_snapshot(&snapshot),
            Err(StoreError::ReservedName { name }) if name == "_passed"
        ));
        assert!(!store.snapshot_path("1.0.0").exists());
        assert!(store.load_snapshots().unwrap().is_empty());
    }

    #[test]
    fn test_prefixed_count_like_names_round_trip() {
        let result: RunResult = [("a›b›_failed".into(), TestOutcome::Passed)].into_iter().collect();
        let snapshot = VersionSnapshot::new(&RuntimeInfo::new("1.0.0", "", ""), result);
        let decoded = VersionSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_missing_result_dir_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsResultStore::new(dir.path().join("nope"), dir.path().join("testers.json"));
        assert!(store.load_snapshots().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_snapshot_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1.0.0.json"), "{ not json").unwrap();
        let store = FsResultStore::new(dir.path(), dir.path().join("testers.json"));
        assert!(matches!(store.load_snapshots(), Err(StoreError::Decode { .. })));
    }

    #[test]
    fn test_missing_catalog_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsResultStore::new(dir.path(), dir.path().join("testers.json"));
        assert!(matches!(store.load_catalog(), Err(StoreError::Io { .. })));
    }
}
