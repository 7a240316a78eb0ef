//! The assertion capability handed to test-definition hosts.
//!
//! Hosts that evaluate test definitions do not get a global namespace of assertion functions. They receive an
//! [`Assertions`] value and dispatch through it by name. [`ASSERTIONS`] is the registry of every primitive and the
//! number of positional arguments it takes before the optional trailing description.

use wpt_core::{AssertError, Thrown, Value};

use crate::{AssertResult, equality, numeric, properties, throws};

/// Registry metadata for one assertion primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssertionInfo {
    pub name: &'static str,
    /// Required positional arguments (excluding the description).
    pub arity: usize,
    /// Takes a callable and cannot be invoked with plain values.
    pub takes_callable: bool,
}

const fn plain(name: &'static str, arity: usize) -> AssertionInfo {
    AssertionInfo {
        name,
        arity,
        takes_callable: false,
    }
}

const fn callable(name: &'static str, arity: usize) -> AssertionInfo {
    AssertionInfo {
        name,
        arity,
        takes_callable: true,
    }
}

/// Every assertion primitive, in the order they are documented.
pub const ASSERTIONS: &[AssertionInfo] = &[
    plain("assert_true", 1),
    plain("assert_false", 1),
    plain("assert_equals", 2),
    plain("assert_not_equals", 2),
    plain("assert_in_array", 2),
    plain("assert_object_equals", 2),
    plain("assert_array_equals", 2),
    plain("assert_array_approx_equals", 3),
    plain("assert_approx_equals", 3),
    plain("assert_less_than", 2),
    plain("assert_greater_than", 2),
    plain("assert_between_exclusive", 3),
    plain("assert_less_than_equal", 2),
    plain("assert_greater_than_equal", 2),
    plain("assert_between_inclusive", 3),
    plain("assert_regexp_match", 2),
    plain("assert_class_string", 2),
    plain("assert_own_property", 2),
    plain("assert_not_own_property", 2),
    callable("assert_throws", 2),
    plain("assert_unreached", 0),
    callable("assert_any", 3),
];

/// Look up a primitive by name.
pub fn info_for(name: &str) -> Option<&'static AssertionInfo> {
    ASSERTIONS.iter().find(|a| a.name == name)
}

/// Capability bundling every assertion primitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Assertions;

impl Assertions {
    /// Dispatch names in registry order.
    pub const NAMES: [&'static str; ASSERTIONS.len()] = {
        let mut names = [""; ASSERTIONS.len()];
        let mut i = 0;
        while i < ASSERTIONS.len() {
            names[i] = ASSERTIONS[i].name;
            i += 1;
        }
        names
    };

    pub fn new() -> Self {
        Self
    }

    /// Names of all primitives this capability exposes.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        Self::NAMES.into_iter()
    }

    /// Invoke a value-only primitive by name.
    ///
    /// ## Parameters
    /// - `name`: primitive name, e.g. `"assert_equals"`.
    /// - `args`: the positional arguments, optionally followed by a string description.
    ///
    /// ## Returns
    /// - The primitive's result.
    /// - A test bug for an unknown name, too few arguments, a non-string where a string is required, or a primitive
    ///   that takes a callable (use [`Assertions::throws`] / [`Assertions::any`]).
    pub fn invoke(&self, name: &str, args: &[Value]) -> AssertResult {
        let Some(info) = info_for(name) else {
            return Err(AssertError::test_bug(format!("unknown assertion {name}")));
        };
        if info.takes_callable {
            return Err(AssertError::test_bug(format!("{name} takes a callable and cannot be invoked by value")));
        }
        if args.len() < info.arity {
            return Err(AssertError::test_bug(format!(
                "{name} expects {} argument(s), got {}",
                info.arity,
                args.len()
            )));
        }

        let description = match args.get(info.arity) {
            None | Some(Value::Undefined) => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(other) => {
                return Err(AssertError::test_bug(format!(
                    "{name} description must be a string, got {}",
                    other.type_of()
                )));
            }
        };
        let arg = |i: usize| &args[i];
        let text = |i: usize| -> Result<&str, AssertError> {
            args[i]
                .as_str()
                .ok_or_else(|| AssertError::test_bug(format!("{name} argument {} must be a string", i + 1)))
        };

        match name {
            "assert_true" => equality::assert_true(arg(0), description),
            "assert_false" => equality::assert_false(arg(0), description),
            "assert_equals" => equality::assert_equals(arg(0), arg(1), description),
            "assert_not_equals" => equality::assert_not_equals(arg(0), arg(1), description),
            "assert_in_array" => equality::assert_in_array(arg(0), arg(1), description),
            "assert_object_equals" => equality::assert_object_equals(arg(0), arg(1), description),
            "assert_array_equals" => equality::assert_array_equals(arg(0), arg(1), description),
            "assert_array_approx_equals" => {
                numeric::assert_array_approx_equals(arg(0), arg(1), arg(2), description)
            }
            "assert_approx_equals" => numeric::assert_approx_equals(arg(0), arg(1), arg(2), description),
            "assert_less_than" => numeric::assert_less_than(arg(0), arg(1), description),
            "assert_greater_than" => numeric::assert_greater_than(arg(0), arg(1), description),
            "assert_between_exclusive" => numeric::assert_between_exclusive(arg(0), arg(1), arg(2), description),
            "assert_less_than_equal" => numeric::assert_less_than_equal(arg(0), arg(1), description),
            "assert_greater_than_equal" => numeric::assert_greater_than_equal(arg(0), arg(1), description),
            "assert_between_inclusive" => numeric::assert_between_inclusive(arg(0), arg(1), arg(2), description),
            "assert_regexp_match" => properties::assert_regexp_match(arg(0), text(1)?, description),
            "assert_class_string" => properties::assert_class_string(arg(0), text(1)?, description),
            "assert_own_property" => properties::assert_own_property(arg(0), text(1)?, description),
            "assert_not_own_property" => properties::assert_not_own_property(arg(0), text(1)?, description),
            "assert_unreached" => properties::assert_unreached(description),
            _ => Err(AssertError::test_bug(format!("unknown assertion {name}"))),
        }
    }

    /// `assert_throws` through the capability.
    pub fn throws<F>(&self, code: &Value, func: F, description: Option<&str>) -> AssertResult
    where
        F: FnOnce() -> Result<(), Thrown>,
    {
        throws::assert_throws(code, func, description)
    }

    /// `assert_any` with the inner assertion named by `inner`.
    ///
    /// `extra` holds any arguments passed to `inner` after `(actual, candidate)`.
    pub fn any(&self, inner: &str, actual: &Value, candidates: &[Value], extra: &[Value]) -> AssertResult {
        throws::assert_any(
            |actual, candidate| {
                let mut args = Vec::with_capacity(2 + extra.len());
                args.push(actual.clone());
                args.push(candidate.clone());
                args.extend(extra.iter().cloned());
                self.invoke(inner, &args)
            },
            actual,
            candidates,
        )
    }
}
