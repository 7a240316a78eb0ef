//! Equality assertions: boolean checks, same-value equality, membership and structural equality.

use wpt_core::Value;
use wpt_core::value::{same_value, strict_equals};

use crate::{AssertResult, check, failure};

pub fn assert_true(actual: &Value, description: Option<&str>) -> AssertResult {
    check(matches!(actual, Value::Bool(true)), description, || {
        format!("expected true got {actual}")
    })
}

pub fn assert_false(actual: &Value, description: Option<&str>) -> AssertResult {
    check(matches!(actual, Value::Bool(false)), description, || {
        format!("expected false got {actual}")
    })
}

/// Assert that two values are the same value (primitives by value, objects by identity).
///
/// A type mismatch is reported with both type tags.
pub fn assert_equals(actual: &Value, expected: &Value, description: Option<&str>) -> AssertResult {
    if actual.type_of() != expected.type_of() {
        return Err(failure(
            description,
            format!(
                "expected ({}) {expected} but got ({}) {actual}",
                expected.type_of(),
                actual.type_of()
            ),
        ));
    }
    check(same_value(actual, expected), description, || {
        format!("expected {expected} but got {actual}")
    })
}

pub fn assert_not_equals(actual: &Value, expected: &Value, description: Option<&str>) -> AssertResult {
    check(!same_value(actual, expected), description, || {
        format!("got disallowed value {actual}")
    })
}

/// Assert that `actual` is strictly equal to some element of the `expected` array.
pub fn assert_in_array(actual: &Value, expected: &Value, description: Option<&str>) -> AssertResult {
    let Some(len) = expected.array_len() else {
        return Err(failure(description, format!("value is {expected}, expected array")));
    };
    let found = (0..len).any(|i| expected.has_index(i) && strict_equals(&expected.index(i), actual));
    check(found, description, || format!("value {actual} not in array {expected}"))
}

/// Assert recursive structural equality of two objects.
///
/// ## Notes
/// - Own enumerable keys must match in both directions.
/// - Nested objects are compared recursively; an object already on the current recursion path is not revisited,
///   which makes the comparison terminate on cyclic graphs.
/// - Leaves are compared with same-value.
pub fn assert_object_equals(actual: &Value, expected: &Value, description: Option<&str>) -> AssertResult {
    check(actual.is_object(), description, || format!("value is {actual}, expected object"))?;
    let mut stack = Vec::new();
    check_equal(actual, expected, &mut stack, description)
}

fn check_equal(
    actual: &Value,
    expected: &Value,
    stack: &mut Vec<*const ()>,
    description: Option<&str>,
) -> AssertResult {
    if let Some(id) = actual.identity() {
        stack.push(id);
    }

    for key in actual.own_keys() {
        check(expected.has_own(&key), description, || format!("unexpected property {key}"))?;
        let actual_prop = actual.get(&key);
        let expected_prop = expected.get(&key);

        if let Some(id) = actual_prop.identity() {
            if !stack.contains(&id) {
                check(expected_prop.is_object(), description, || {
                    format!("property {key} expected {expected_prop} got {actual_prop}")
                })?;
                check_equal(&actual_prop, &expected_prop, stack, description)?;
            }
        } else {
            check(same_value(&actual_prop, &expected_prop), description, || {
                format!("property {key} expected {expected_prop} got {actual_prop}")
            })?;
        }
    }

    for key in expected.own_keys() {
        check(actual.has_own(&key), description, || format!("expected property {key} missing"))?;
    }

    if actual.identity().is_some() {
        stack.pop();
    }
    Ok(())
}

/// Assert that two arrays have the same length, the same holes, and same-value elements.
pub fn assert_array_equals(actual: &Value, expected: &Value, description: Option<&str>) -> AssertResult {
    let Some(actual_len) = actual.array_len() else {
        return Err(failure(description, format!("value is {actual}, expected array")));
    };
    check(expected.array_len() == Some(actual_len), description, || {
        format!("lengths differ, expected {expected} got {actual}")
    })?;

    for i in 0..actual_len {
        check(actual.has_index(i) == expected.has_index(i), description, || {
            format!("property {i}, property expected to be {expected} but was {actual}")
        })?;
        let (a, e) = (actual.index(i), expected.index(i));
        check(same_value(&e, &a), description, || {
            format!("property {i}, expected {e} but got {a}")
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    // ========================================
    // assert_true / assert_false
    // ========================================

    #[test]
    fn test_assert_true_requires_boolean_true() {
        assert!(assert_true(&Value::Bool(true), None).is_ok());
        let err = assert_true(&num(1.0), None).unwrap_err();
        assert_eq!(err.to_string(), "expected true got 1");
    }

    #[test]
    fn test_assert_false() {
        assert!(assert_false(&Value::Bool(false), None).is_ok());
        assert_eq!(
            assert_false(&Value::Undefined, None).unwrap_err().to_string(),
            "expected false got undefined"
        );
    }

    // ========================================
    // assert_equals / assert_not_equals
    // ========================================

    #[test]
    fn test_assert_equals_type_mismatch_message() {
        let err = assert_equals(&Value::from("1"), &num(1.0), None).unwrap_err();
        assert_eq!(err.to_string(), "expected (number) 1 but got (string) 1");
    }

    #[test]
    fn test_assert_equals_signed_zero() {
        assert!(assert_equals(&num(-0.0), &num(-0.0), None).is_ok());
        let err = assert_equals(&num(0.0), &num(-0.0), None).unwrap_err();
        assert_eq!(err.to_string(), "expected 0 but got 0");
    }

    #[test]
    fn test_assert_equals_nan() {
        assert!(assert_equals(&num(f64::NAN), &num(f64::NAN), None).is_ok());
    }

    #[test]
    fn test_assert_equals_objects_by_identity() {
        let a = Value::array([num(1.0)]);
        assert!(assert_equals(&a, &a.clone(), None).is_ok());
        assert!(assert_equals(&a, &Value::array([num(1.0)]), None).is_err());
    }

    #[test]
    fn test_assert_not_equals() {
        assert!(assert_not_equals(&num(0.0), &num(-0.0), None).is_ok());
        let err = assert_not_equals(&Value::from("a"), &Value::from("a"), None).unwrap_err();
        assert_eq!(err.to_string(), "got disallowed value a");
    }

    // ========================================
    // assert_in_array
    // ========================================

    #[test]
    fn test_assert_in_array_uses_strict_equality() {
        let haystack = Value::array([num(1.0), Value::from("two"), num(f64::NAN)]);
        assert!(assert_in_array(&Value::from("two"), &haystack, None).is_ok());
        assert!(assert_in_array(&num(f64::NAN), &haystack, None).is_err());
        let err = assert_in_array(&num(3.0), &haystack, None).unwrap_err();
        assert_eq!(err.to_string(), "value 3 not in array 1,two,NaN");
    }

    // ========================================
    // assert_object_equals
    // ========================================

    #[test]
    fn test_object_equals_nested() {
        let a = Value::map([("x", num(1.0)), ("y", Value::map([("z", Value::from("q"))]))]);
        let b = Value::map([("x", num(1.0)), ("y", Value::map([("z", Value::from("q"))]))]);
        assert!(assert_object_equals(&a, &b, None).is_ok());
    }

    #[test]
    fn test_object_equals_unexpected_property() {
        let a = Value::map([("x", num(1.0)), ("extra", num(2.0))]);
        let b = Value::map([("x", num(1.0))]);
        let err = assert_object_equals(&a, &b, None).unwrap_err();
        assert_eq!(err.to_string(), "unexpected property extra");
    }

    #[test]
    fn test_object_equals_missing_property() {
        let a = Value::map([("x", num(1.0))]);
        let b = Value::map([("x", num(1.0)), ("y", num(2.0))]);
        let err = assert_object_equals(&a, &b, None).unwrap_err();
        assert_eq!(err.to_string(), "expected property y missing");
    }

    #[test]
    fn test_object_equals_leaf_uses_same_value() {
        let a = Value::map([("z", num(0.0))]);
        let b = Value::map([("z", num(-0.0))]);
        assert!(assert_object_equals(&a, &b, None).is_err());
        let a = Value::map([("n", num(f64::NAN))]);
        let b = Value::map([("n", num(f64::NAN))]);
        assert!(assert_object_equals(&a, &b, None).is_ok());
    }

    #[test]
    fn test_object_equals_cyclic_terminates() {
        let a = Value::map([("v", num(1.0))]);
        a.set("self", a.clone());
        let b = Value::map([("v", num(1.0))]);
        b.set("self", b.clone());
        assert!(assert_object_equals(&a, &b, None).is_ok());
    }

    #[test]
    fn test_object_equals_requires_object() {
        let err = assert_object_equals(&Value::Null, &Value::map::<&str>([]), None).unwrap_err();
        assert_eq!(err.to_string(), "value is null, expected object");
    }

    // ========================================
    // assert_array_equals
    // ========================================

    #[test]
    fn test_array_equals_ok() {
        let a = Value::array([num(1.0), Value::from("b")]);
        let b = Value::array([num(1.0), Value::from("b")]);
        assert!(assert_array_equals(&a, &b, None).is_ok());
    }

    #[test]
    fn test_array_equals_length_mismatch() {
        let a = Value::array([num(1.0)]);
        let b = Value::array([num(1.0), num(2.0)]);
        let err = assert_array_equals(&a, &b, None).unwrap_err();
        assert_eq!(err.to_string(), "lengths differ, expected 1,2 got 1");
    }

    #[test]
    fn test_array_equals_value_mismatch() {
        let a = Value::array([num(0.0)]);
        let b = Value::array([num(-0.0)]);
        let err = assert_array_equals(&a, &b, None).unwrap_err();
        assert_eq!(err.to_string(), "property 0, expected 0 but got 0");
    }

    #[test]
    fn test_array_equals_hole_mismatch() {
        let a = Value::sparse_array([None, Some(num(1.0))]);
        let b = Value::array([Value::Undefined, num(1.0)]);
        let err = assert_array_equals(&a, &b, None).unwrap_err();
        assert!(err.to_string().starts_with("property 0, property expected to be"));
    }

    #[test]
    fn test_array_equals_rejects_non_array() {
        let err = assert_array_equals(&num(1.0), &Value::array([]), None).unwrap_err();
        assert_eq!(err.to_string(), "value is 1, expected array");
    }
}
