//! DOMException vocabulary used by exception matching.
//!
//! Two fixed tables:
//! - [`LEGACY_NAMES`]: legacy constant spellings (`NOT_FOUND_ERR`) to exception names (`NotFoundError`).
//! - [`EXCEPTIONS`]: exception names to their numeric legacy code. Names introduced after legacy codes were frozen
//!   have code `0`.
//!
//! ## Notes
//! - Lookups are case-sensitive.
//! - These tables are part of the observable assertion semantics; do not extend them casually.

/// Metadata for one exception name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub name: &'static str,
    /// Legacy numeric code, `0` for new-style exceptions.
    pub code: u16,
    /// Legacy constant spelling, if the exception has one.
    pub legacy: Option<&'static str>,
}

/// Legacy constant spelling → exception name.
pub const LEGACY_NAMES: &[(&str, &str)] = &[
    ("INDEX_SIZE_ERR", "IndexSizeError"),
    ("HIERARCHY_REQUEST_ERR", "HierarchyRequestError"),
    ("WRONG_DOCUMENT_ERR", "WrongDocumentError"),
    ("INVALID_CHARACTER_ERR", "InvalidCharacterError"),
    ("NO_MODIFICATION_ALLOWED_ERR", "NoModificationAllowedError"),
    ("NOT_FOUND_ERR", "NotFoundError"),
    ("NOT_SUPPORTED_ERR", "NotSupportedError"),
    ("INUSE_ATTRIBUTE_ERR", "InUseAttributeError"),
    ("INVALID_STATE_ERR", "InvalidStateError"),
    ("SYNTAX_ERR", "SyntaxError"),
    ("INVALID_MODIFICATION_ERR", "InvalidModificationError"),
    ("NAMESPACE_ERR", "NamespaceError"),
    ("INVALID_ACCESS_ERR", "InvalidAccessError"),
    ("TYPE_MISMATCH_ERR", "TypeMismatchError"),
    ("SECURITY_ERR", "SecurityError"),
    ("NETWORK_ERR", "NetworkError"),
    ("ABORT_ERR", "AbortError"),
    ("URL_MISMATCH_ERR", "URLMismatchError"),
    ("QUOTA_EXCEEDED_ERR", "QuotaExceededError"),
    ("TIMEOUT_ERR", "TimeoutError"),
    ("INVALID_NODE_TYPE_ERR", "InvalidNodeTypeError"),
    ("DATA_CLONE_ERR", "DataCloneError"),
];

/// Exception name → legacy code.
pub const EXCEPTIONS: &[ExceptionInfo] = &[
    legacy("IndexSizeError", 1, "INDEX_SIZE_ERR"),
    legacy("HierarchyRequestError", 3, "HIERARCHY_REQUEST_ERR"),
    legacy("WrongDocumentError", 4, "WRONG_DOCUMENT_ERR"),
    legacy("InvalidCharacterError", 5, "INVALID_CHARACTER_ERR"),
    legacy("NoModificationAllowedError", 7, "NO_MODIFICATION_ALLOWED_ERR"),
    legacy("NotFoundError", 8, "NOT_FOUND_ERR"),
    legacy("NotSupportedError", 9, "NOT_SUPPORTED_ERR"),
    legacy("InUseAttributeError", 10, "INUSE_ATTRIBUTE_ERR"),
    legacy("InvalidStateError", 11, "INVALID_STATE_ERR"),
    legacy("SyntaxError", 12, "SYNTAX_ERR"),
    legacy("InvalidModificationError", 13, "INVALID_MODIFICATION_ERR"),
    legacy("NamespaceError", 14, "NAMESPACE_ERR"),
    legacy("InvalidAccessError", 15, "INVALID_ACCESS_ERR"),
    legacy("TypeMismatchError", 17, "TYPE_MISMATCH_ERR"),
    legacy("SecurityError", 18, "SECURITY_ERR"),
    legacy("NetworkError", 19, "NETWORK_ERR"),
    legacy("AbortError", 20, "ABORT_ERR"),
    legacy("URLMismatchError", 21, "URL_MISMATCH_ERR"),
    legacy("QuotaExceededError", 22, "QUOTA_EXCEEDED_ERR"),
    legacy("TimeoutError", 23, "TIMEOUT_ERR"),
    legacy("InvalidNodeTypeError", 24, "INVALID_NODE_TYPE_ERR"),
    legacy("DataCloneError", 25, "DATA_CLONE_ERR"),
    modern("EncodingError"),
    modern("NotReadableError"),
    modern("UnknownError"),
    modern("ConstraintError"),
    modern("DataError"),
    modern("TransactionInactiveError"),
    modern("ReadOnlyError"),
    modern("VersionError"),
    modern("OperationError"),
    modern("NotAllowedError"),
];

/// Map a legacy constant spelling to its exception name; other spellings pass through unchanged.
///
/// ## Examples
/// ```rust
/// use wpt_core::exceptions::legacy_to_name;
///
/// assert_eq!(legacy_to_name("NOT_FOUND_ERR"), "NotFoundError");
/// assert_eq!(legacy_to_name("DataError"), "DataError");
/// ```
pub fn legacy_to_name(code: &str) -> &str {
    LEGACY_NAMES
        .iter()
        .find(|(legacy, _)| *legacy == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// Look up an exception by name.
pub fn info_for(name: &str) -> Option<&'static ExceptionInfo> {
    EXCEPTIONS.iter().find(|e| e.name == name)
}

/// Resolve a code string (legacy constant or exception name) to its exception metadata.
///
/// ## Returns
/// - `None` if the code is not recognized; callers treat this as a malformed test.
pub fn resolve(code: &str) -> Option<&'static ExceptionInfo> {
    info_for(legacy_to_name(code))
}

const fn legacy(name: &'static str, code: u16, legacy: &'static str) -> ExceptionInfo {
    ExceptionInfo {
        name,
        code,
        legacy: Some(legacy),
    }
}

const fn modern(name: &'static str) -> ExceptionInfo {
    ExceptionInfo {
        name,
        code: 0,
        legacy: None,
    }
}
