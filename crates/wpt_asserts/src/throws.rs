//! Exception-matching assertions: `assert_throws` and `assert_any`.

use wpt_core::exceptions::{self, ExceptionInfo};
use wpt_core::{AssertError, Thrown, Value};

use crate::{AssertResult, check, failure};

/// Assert that `func` throws an exception matching `code`.
///
/// ## Parameters
/// - `code`: an object (its `name` is compared with the thrown value's `name`), or a string: a legacy constant such
///   as `"NOT_FOUND_ERR"` or an exception name such as `"NotFoundError"`.
/// - `func`: the code under test.
///
/// ## Returns
/// - `Ok(())` when the thrown value matches.
/// - An [`AssertionFailure`](wpt_core::AssertionFailure) thrown by `func` is propagated unchanged, as is a test bug.
/// - A test bug when `code` is null/undefined or names no known exception.
///
/// ## Notes
/// - For string codes, the thrown value's `code` must equal the resolved legacy code. Its `name` is also checked when
///   the legacy code is `0`, or when the thrown `name` is neither all-uppercase nor `"DOMException"` (a new-style
///   exception).
pub fn assert_throws<F>(code: &Value, func: F, description: Option<&str>) -> AssertResult
where
    F: FnOnce() -> Result<(), Thrown>,
{
    let thrown = match func() {
        Ok(()) => return Err(failure(description, "function did not throw".to_string())),
        Err(Thrown::Assertion(f)) => return Err(AssertError::Failure(f)),
        Err(Thrown::TestBug(b)) => return Err(AssertError::TestBug(b)),
        Err(Thrown::Value(v)) => v,
    };
    match_exception(code, &thrown, description)
}

/// Match an already-thrown value against `code`; the body of [`assert_throws`].
pub fn match_exception(code: &Value, thrown: &Value, description: Option<&str>) -> AssertResult {
    check(!matches!(thrown, Value::Null), description, || {
        "function threw null, not an object".to_string()
    })?;
    check(thrown.is_object(), description, || {
        format!("function threw {thrown} with type {}, not an object", thrown.type_of())
    })?;

    let info = match code {
        Value::Null | Value::Undefined => {
            return Err(AssertError::test_bug("need to pass exception to assert_throws()"));
        }
        Value::Map(_) | Value::Array(_) => {
            let expected_name = code.get("name");
            let matches = thrown
                .get_own("name")
                .is_some_and(|name| wpt_core::value::strict_equals(&name, &expected_name));
            return check(matches, description, || {
                format!(
                    "function threw {thrown} ({}) expected {code} ({expected_name})",
                    thrown.get("name")
                )
            });
        }
        Value::String(s) => exceptions::resolve(s),
        _ => None,
    };
    let Some(info) = info else {
        return Err(AssertError::test_bug(format!(
            "unrecognized DOMException code \"{code}\" passed to assert_throws()"
        )));
    };

    for (prop, required) in required_props(info, thrown) {
        let actual = thrown.get_own(prop);
        let ok = actual
            .as_ref()
            .is_some_and(|actual| wpt_core::value::strict_equals(actual, &required));
        check(ok, description, || {
            format!(
                "function threw {thrown} that is not a DOMException {code}: property {prop} is equal to {}, expected {required}",
                actual.unwrap_or_default()
            )
        })?;
    }
    Ok(())
}

fn required_props(info: &ExceptionInfo, thrown: &Value) -> Vec<(&'static str, Value)> {
    let mut props = vec![("code", Value::Number(f64::from(info.code)))];
    let new_style = match thrown.get_own("name") {
        Some(Value::String(name)) => name != name.to_uppercase() && name != "DOMException",
        _ => false,
    };
    if info.code == 0 || new_style {
        props.push(("name", Value::from(info.name)));
    }
    props
}

/// Assert that `assert_fn(actual, candidate)` holds for at least one candidate.
///
/// Every candidate is tried. When none succeeds, the collected messages are joined by a blank line into a single
/// assertion failure.
pub fn assert_any<F>(assert_fn: F, actual: &Value, candidates: &[Value]) -> AssertResult
where
    F: Fn(&Value, &Value) -> AssertResult,
{
    let mut errors = Vec::new();
    let mut passed = false;
    for candidate in candidates {
        match assert_fn(actual, candidate) {
            Ok(()) => passed = true,
            Err(e) => errors.push(e.to_string()),
        }
    }
    if passed {
        Ok(())
    } else {
        Err(AssertError::failure(errors.join("\n\n")))
    }
}
