//! Numeric comparison assertions.
//!
//! Every operand must be a number before any comparison is made; a non-number fails with
//! `expected a number but got a {type}`.

use wpt_core::Value;

use crate::{AssertResult, check, failure};

fn number(value: &Value, description: Option<&str>) -> Result<f64, wpt_core::AssertError> {
    value
        .as_number()
        .ok_or_else(|| failure(description, format!("expected a number but got a {}", value.type_of())))
}

fn numbers<const N: usize>(values: [&Value; N], description: Option<&str>) -> Result<[f64; N], wpt_core::AssertError> {
    let mut out = [0.0; N];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = number(value, description)?;
    }
    Ok(out)
}

/// Assert `|actual - expected| <= epsilon`.
pub fn assert_approx_equals(
    actual: &Value,
    expected: &Value,
    epsilon: &Value,
    description: Option<&str>,
) -> AssertResult {
    let [a, e, eps] = numbers([actual, expected, epsilon], description)?;
    check((a - e).abs() <= eps, description, || {
        format!("expected {expected} +/- {epsilon} but got {actual}")
    })
}

/// Assert element-wise approximate equality of two numeric arrays.
pub fn assert_array_approx_equals(
    actual: &Value,
    expected: &Value,
    epsilon: &Value,
    description: Option<&str>,
) -> AssertResult {
    let eps = number(epsilon, description)?;
    let Some(len) = actual.array_len() else {
        return Err(failure(description, format!("value is {actual}, expected array")));
    };
    check(expected.array_len() == Some(len), description, || {
        format!("lengths differ, expected {expected} got {actual}")
    })?;

    for i in 0..len {
        check(actual.has_index(i) == expected.has_index(i), description, || {
            format!("property {i}, property expected to be {expected} but was {actual}")
        })?;
        let (a, e) = (actual.index(i), expected.index(i));
        let (Some(a_num), Some(e_num)) = (a.as_number(), e.as_number()) else {
            let offender = if a.as_number().is_none() { &a } else { &e };
            return Err(failure(
                description,
                format!("property {i}, expected a number but got a {}", offender.type_of()),
            ));
        };
        check((a_num - e_num).abs() <= eps, description, || {
            format!("property {i}, expected {e} +/- {epsilon}, expected {expected} but got {actual}")
        })?;
    }
    Ok(())
}

pub fn assert_less_than(actual: &Value, expected: &Value, description: Option<&str>) -> AssertResult {
    let [a, e] = numbers([actual, expected], description)?;
    check(a < e, description, || {
        format!("expected a number less than {expected} but got {actual}")
    })
}

pub fn assert_greater_than(actual: &Value, expected: &Value, description: Option<&str>) -> AssertResult {
    let [a, e] = numbers([actual, expected], description)?;
    check(a > e, description, || {
        format!("expected a number greater than {expected} but got {actual}")
    })
}

pub fn assert_less_than_equal(actual: &Value, expected: &Value, description: Option<&str>) -> AssertResult {
    let [a, e] = numbers([actual, expected], description)?;
    check(a <= e, description, || {
        format!("expected a number less than or equal to {expected} but got {actual}")
    })
}

pub fn assert_greater_than_equal(actual: &Value, expected: &Value, description: Option<&str>) -> AssertResult {
    let [a, e] = numbers([actual, expected], description)?;
    check(a >= e, description, || {
        format!("expected a number greater than or equal to {expected} but got {actual}")
    })
}

/// Assert `lower < actual < upper`.
pub fn assert_between_exclusive(
    actual: &Value,
    lower: &Value,
    upper: &Value,
    description: Option<&str>,
) -> AssertResult {
    let [a, lo, hi] = numbers([actual, lower, upper], description)?;
    check(a > lo && a < hi, description, || {
        format!("expected a number greater than {lower} and less than {upper} but got {actual}")
    })
}

/// Assert `lower <= actual <= upper`.
pub fn assert_between_inclusive(
    actual: &Value,
    lower: &Value,
    upper: &Value,
    description: Option<&str>,
) -> AssertResult {
    let [a, lo, hi] = numbers([actual, lower, upper], description)?;
    check(a >= lo && a <= hi, description, || {
        format!(
            "expected a number greater than or equal to {lower} and less than or equal to {upper} but got {actual}"
        )
    })
}
