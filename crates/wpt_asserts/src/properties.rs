//! Pattern, class-string and own-property assertions.

use regex::Regex;
use wpt_core::{AssertError, Value};

use crate::{AssertResult, check, failure};

/// Assert that the string conversion of `actual` matches the regular expression `pattern`.
///
/// An invalid pattern is a malformed test, reported as a test bug.
pub fn assert_regexp_match(actual: &Value, pattern: &str, description: Option<&str>) -> AssertResult {
    let re = Regex::new(pattern).map_err(|e| {
        AssertError::test_bug(format!("invalid regular expression /{pattern}/ passed to assert_regexp_match(): {e}"))
    })?;
    let subject = actual.to_string();
    check(re.is_match(&subject), description, || {
        format!("expected /{pattern}/ but got {actual}")
    })
}

/// Assert the `[object Class]` string of a value.
pub fn assert_class_string(object: &Value, class_string: &str, description: Option<&str>) -> AssertResult {
    let actual = object.class_string();
    let expected = format!("[object {class_string}]");
    check(actual == expected, description, || format!("expected {expected} but got {actual}"))
}

pub fn assert_own_property(object: &Value, property_name: &str, description: Option<&str>) -> AssertResult {
    check(object.has_own(property_name), description, || {
        format!("expected property {property_name} missing")
    })
}

pub fn assert_not_own_property(object: &Value, property_name: &str, description: Option<&str>) -> AssertResult {
    check(!object.has_own(property_name), description, || {
        format!("unexpected property {property_name} is found on object")
    })
}

/// Always fails; marks code that a test must never reach.
pub fn assert_unreached(description: Option<&str>) -> AssertResult {
    Err(failure(description, "Reached unreachable code".to_string()))
}
