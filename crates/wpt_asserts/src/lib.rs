//! Assertion primitives with web-platform-tests semantics.
//!
//! Every primitive has the shape `(actual, expected[, params...], description) -> AssertResult` and fails with an
//! [`AssertionFailure`](wpt_core::AssertionFailure) carrying a fixed message. Misuse of a helper (an unknown
//! exception code, a missing code) is reported as a [`TestBug`](wpt_core::TestBug) instead, so a malformed test is
//! never mistaken for a failure of the implementation under test.
//!
//! Test hosts receive all primitives bundled in the [`Assertions`] capability; Rust-defined suites can call the free
//! functions directly and propagate with `?` into a `Result<(), Thrown>` body.

#![deny(clippy::unwrap_used)]

pub mod capability;
pub mod equality;
pub mod numeric;
pub mod properties;
pub mod throws;

use wpt_core::AssertError;

pub use capability::{ASSERTIONS, AssertionInfo, Assertions};
pub use equality::{
    assert_array_equals, assert_equals, assert_false, assert_in_array, assert_not_equals, assert_object_equals,
    assert_true,
};
pub use numeric::{
    assert_approx_equals, assert_array_approx_equals, assert_between_exclusive, assert_between_inclusive,
    assert_greater_than, assert_greater_than_equal, assert_less_than, assert_less_than_equal,
};
pub use properties::{
    assert_class_string, assert_not_own_property, assert_own_property, assert_regexp_match, assert_unreached,
};
pub use throws::{assert_any, assert_throws};

/// Result of an assertion primitive.
pub type AssertResult = Result<(), AssertError>;

/// Fail with `message` unless `condition` holds.
///
/// The message is built lazily and prefixed with `"{description}: "` when a description is given.
pub(crate) fn check(condition: bool, description: Option<&str>, message: impl FnOnce() -> String) -> AssertResult {
    if condition {
        Ok(())
    } else {
        Err(failure(description, message()))
    }
}

pub(crate) fn failure(description: Option<&str>, message: String) -> AssertError {
    match description {
        Some(desc) if !desc.is_empty() => AssertError::failure(format!("{desc}: {message}")),
        _ => AssertError::failure(message),
    }
}
