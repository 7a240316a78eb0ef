//! What a test body can throw.
//!
//! Three kinds are kept apart all the way to the runner:
//! - [`AssertionFailure`]: an assertion did not hold (the runner records `Failed`).
//! - [`TestBug`]: an assertion helper was misused, e.g. an unknown exception code (recorded as `Errored`).
//! - any other thrown [`Value`] (recorded as `Errored`).

use thiserror::Error;

use crate::value::Value;

/// An assertion that did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AssertionFailure {
    pub message: String,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// A malformed test definition detected by an assertion helper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Test bug: {message}")]
pub struct TestBug {
    pub message: String,
}

impl TestBug {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Error returned by assertion primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssertError {
    #[error(transparent)]
    Failure(#[from] AssertionFailure),
    #[error(transparent)]
    TestBug(#[from] TestBug),
}

impl AssertError {
    pub fn failure(message: impl Into<String>) -> Self {
        AssertError::Failure(AssertionFailure::new(message))
    }

    pub fn test_bug(message: impl Into<String>) -> Self {
        AssertError::TestBug(TestBug::new(message))
    }
}

/// Anything a test body can throw.
#[derive(Debug, Clone, Error)]
pub enum Thrown {
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
    #[error(transparent)]
    TestBug(#[from] TestBug),
    #[error("{}", thrown_value_message(.0))]
    Value(Value),
}

impl Thrown {
    /// The message recorded for this throw.
    ///
    /// ## Notes
    /// - Error-like objects contribute their `message` property; other values their string conversion.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<AssertError> for Thrown {
    fn from(err: AssertError) -> Self {
        match err {
            AssertError::Failure(f) => Thrown::Assertion(f),
            AssertError::TestBug(b) => Thrown::TestBug(b),
        }
    }
}

impl From<Value> for Thrown {
    fn from(value: Value) -> Self {
        Thrown::Value(value)
    }
}

fn thrown_value_message(value: &Value) -> String {
    match value.get_own("message") {
        Some(Value::String(message)) => message,
        _ => value.to_string(),
    }
}
