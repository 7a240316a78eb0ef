//! Qualified test names.
//!
//! A qualified name joins `(spec directory, file name, test name)` with [`DELIMITER`]. The report groups tests by
//! splitting on the same character, so it must never be changed independently of persisted results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The reserved segment delimiter (`›`, U+203A).
pub const DELIMITER: char = '›';

/// A delimiter-joined test identifier, unique within one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Join a spec directory, a file name and a test name.
    pub fn join(spec: &str, file: &str, test: &str) -> Self {
        Self(format!("{spec}{DELIMITER}{file}{DELIMITER}{test}"))
    }

    /// Apply a registration prefix (see [`file_prefix`]) to a bare test name.
    pub fn prefixed(prefix: &str, test: &str) -> Self {
        Self(format!("{prefix}{test}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `(category, subcategory, leaf)`.
    ///
    /// ## Notes
    /// - Two segments get an empty subcategory: `a›c` → `("a", "", "c")`.
    /// - One segment is a leaf under an empty category and subcategory.
    /// - Past three segments the leaf keeps the rest, delimiters included.
    pub fn segments(&self) -> (&str, &str, &str) {
        let mut parts = self.0.splitn(3, DELIMITER);
        let first = parts.next().unwrap_or("");
        match (parts.next(), parts.next()) {
            (Some(second), Some(third)) => (first, second, third),
            (Some(second), None) => (first, "", second),
            _ => ("", "", first),
        }
    }
}

/// Registration prefix for one test file: `"{spec}›{file}›"`.
pub fn file_prefix(spec: &str, file: &str) -> String {
    format!("{spec}{DELIMITER}{file}{DELIMITER}")
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for QualifiedName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for QualifiedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
