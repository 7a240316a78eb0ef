//! Evaluation hosts.
//!
//! A [`ScriptHost`] turns the source text of one test file into registered test cases. The harness ships
//! [`DeclarativeHost`], which reads JSON test definitions:
//!
//! ```json
//! { "tests": [ { "name": "adds", "kind": "test",
//!                "steps": [ { "assert": "assert_equals", "args": [2, 2] },
//!                           { "assert": "assert_throws", "code": "NOT_FOUND_ERR",
//!                             "throws": { "name": "NotFoundError", "code": 8 } },
//!                           { "throw": { "name": "TypeError", "message": "boom" } } ] } ] }
//! ```
//!
//! ## Value encoding
//!
//! JSON maps onto [`Value`] directly, plus a few single-key objects for what JSON cannot express:
//! `{"$number": "NaN" | "Infinity" | "-Infinity" | "-0"}`, `{"$undefined": true}` and, inside arrays only,
//! `{"$hole": true}`.
//!
//! ## Steps
//!
//! - `{"assert": name, "args": [...], "description"?: text}` dispatches through [`Assertions::invoke`].
//! - `{"assert": "assert_throws", "code": c, "throws"?: v, "description"?: text}` runs a callable that throws `v`
//!   (or returns normally when `throws` is absent).
//! - `{"assert": "assert_any", "with": name, "actual": v, "candidates": [...], "args"?: [...]}`.
//! - `{"throw": v}` throws `v` as-is.
//!
//! `promise_test` and `async_test` bodies yield to the scheduler between steps.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value as Json;
use thiserror::Error;
use wpt_asserts::Assertions;
use wpt_asserts::capability::info_for;
use wpt_core::{Thrown, Value};

use crate::registry::{Registrar, RegistryError, TestBody, TestFunction};
use crate::store::RuntimeInfo;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("test file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("test #{index}: {message}")]
    InvalidTest { index: usize, message: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Evaluates test-definition source text.
pub trait ScriptHost {
    /// The runtime identity snapshots are recorded under.
    fn runtime_info(&self) -> RuntimeInfo;

    /// Register every test defined in `source` through `registrar`.
    ///
    /// ## Returns
    /// - The number of tests registered.
    fn evaluate(&self, source: &str, registrar: &mut Registrar<'_>) -> Result<usize, HostError>;
}

// ============================================================================
// Declarative host
// ============================================================================

/// [`ScriptHost`] for JSON test definitions.
#[derive(Debug, Clone)]
pub struct DeclarativeHost {
    runtime: RuntimeInfo,
}

impl Default for DeclarativeHost {
    fn default() -> Self {
        Self {
            runtime: RuntimeInfo::new(env!("CARGO_PKG_VERSION"), "declarative", "json"),
        }
    }
}

impl DeclarativeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runtime(mut self, runtime: RuntimeInfo) -> Self {
        self.runtime = runtime;
        self
    }
}

impl ScriptHost for DeclarativeHost {
    fn runtime_info(&self) -> RuntimeInfo {
        self.runtime.clone()
    }

    #[tracing::instrument(skip_all, fields(prefix = registrar.prefix()))]
    fn evaluate(&self, source: &str, registrar: &mut Registrar<'_>) -> Result<usize, HostError> {
        let file: TestFile = serde_json::from_str(source)?;

        // Compile every definition before registering any, so a malformed file registers nothing.
        let mut compiled = Vec::with_capacity(file.tests.len());
        for (index, raw) in file.tests.into_iter().enumerate() {
            let pretty = serde_json::to_string_pretty(&raw)?;
            let def: TestDef = serde_json::from_value(raw).map_err(|e| HostError::InvalidTest {
                index,
                message: e.to_string(),
            })?;
            let steps = def
                .steps
                .iter()
                .map(Step::compile)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|message| HostError::InvalidTest { index, message })?;
            compiled.push((def, pretty, steps));
        }

        // Resolve every final name up front; registration below cannot fail.
        let mut seen = HashSet::with_capacity(compiled.len());
        for (def, _, _) in &compiled {
            let qualified = registrar.qualify(&def.function, def.name.as_deref())?;
            if registrar.is_registered(&qualified) || !seen.insert(qualified.clone()) {
                return Err(RegistryError::Duplicate(qualified).into());
            }
        }

        let count = compiled.len();
        for (def, pretty, steps) in compiled {
            let yields = def.kind != TestKind::Test;
            let function = TestFunction::new(def.function, pretty, move || run_steps(steps, yields));
            let name = def.name.as_deref();
            match def.kind {
                TestKind::Test => registrar.test(function, name)?,
                TestKind::PromiseTest => registrar.promise_test(function, name)?,
                TestKind::AsyncTest => registrar.async_test(function, name)?,
            };
        }
        tracing::debug!(tests = count, "file evaluated");
        Ok(count)
    }
}

fn run_steps(steps: Vec<Step>, yields: bool) -> TestBody {
    Box::pin(async move {
        let asserts = Assertions::new();
        for (i, step) in steps.iter().enumerate() {
            if yields && i > 0 {
                tokio::task::yield_now().await;
            }
            step.execute(&asserts)?;
        }
        Ok(())
    })
}

#[derive(Deserialize)]
struct TestFile {
    tests: Vec<Json>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TestKind {
    #[default]
    Test,
    PromiseTest,
    AsyncTest,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TestDef {
    #[serde(default)]
    name: Option<String>,
    /// The test function's own name, used when `name` is absent.
    #[serde(default)]
    function: String,
    #[serde(default)]
    kind: TestKind,
    #[serde(default)]
    steps: Vec<Json>,
}

enum Step {
    Assert {
        name: String,
        args: Vec<Value>,
    },
    Throws {
        code: Value,
        throws: Option<Value>,
        description: Option<String>,
    },
    Any {
        with: String,
        actual: Value,
        candidates: Vec<Value>,
        extra: Vec<Value>,
    },
    Throw(Value),
}

impl Step {
    fn compile(json: &Json) -> Result<Step, String> {
        let obj = json.as_object().ok_or_else(|| format!("step must be an object, got {json}"))?;

        if let Some(thrown) = obj.get("throw") {
            return Ok(Step::Throw(to_value(thrown)?));
        }
        let name = obj
            .get("assert")
            .and_then(Json::as_str)
            .ok_or_else(|| "step needs an `assert` or a `throw` key".to_string())?;
        let description = match obj.get("description") {
            None => None,
            Some(Json::String(s)) => Some(s.clone()),
            Some(other) => return Err(format!("description must be a string, got {other}")),
        };
        let list = |key: &str| -> Result<Vec<Value>, String> {
            match obj.get(key) {
                None => Ok(Vec::new()),
                Some(Json::Array(items)) => items.iter().map(to_value).collect(),
                Some(other) => Err(format!("`{key}` must be an array, got {other}")),
            }
        };

        match name {
            "assert_throws" => Ok(Step::Throws {
                code: obj.get("code").map(to_value).transpose()?.unwrap_or_default(),
                throws: obj.get("throws").map(to_value).transpose()?,
                description,
            }),
            "assert_any" => {
                let with = obj
                    .get("with")
                    .and_then(Json::as_str)
                    .ok_or_else(|| "assert_any step needs a `with` assertion name".to_string())?;
                Ok(Step::Any {
                    with: with.to_string(),
                    actual: obj.get("actual").map(to_value).transpose()?.unwrap_or_default(),
                    candidates: list("candidates")?,
                    extra: list("args")?,
                })
            }
            _ => {
                let info = info_for(name).ok_or_else(|| format!("unknown assertion `{name}`"))?;
                let mut args = list("args")?;
                if args.len() > info.arity + 1 {
                    return Err(format!(
                        "`{name}` takes {} argument(s) and a description, got {} args",
                        info.arity,
                        args.len()
                    ));
                }
                if let Some(description) = description {
                    if args.len() > info.arity {
                        return Err(format!(
                            "`{name}` has a description both in `args` and in `description`"
                        ));
                    }
                    args.resize(info.arity, Value::Undefined);
                    args.push(Value::String(description));
                }
                Ok(Step::Assert {
                    name: name.to_string(),
                    args,
                })
            }
        }
    }

    fn execute(&self, asserts: &Assertions) -> Result<(), Thrown> {
        match self {
            Step::Assert { name, args } => asserts.invoke(name, args)?,
            Step::Throws {
                code,
                throws,
                description,
            } => {
                let thrown = throws.clone();
                asserts.throws(
                    code,
                    move || match thrown {
                        Some(value) => Err(Thrown::Value(value)),
                        None => Ok(()),
                    },
                    description.as_deref(),
                )?
            }
            Step::Any {
                with,
                actual,
                candidates,
                extra,
            } => asserts.any(with, actual, candidates, extra)?,
            Step::Throw(value) => return Err(Thrown::Value(value.clone())),
        }
        Ok(())
    }
}

/// Convert JSON into a [`Value`], honouring the `$number`, `$undefined` and `$hole` encodings.
pub fn to_value(json: &Json) -> Result<Value, String> {
    convert(json, false).map(|slot| slot.unwrap_or_default())
}

// `Ok(None)` is a hole, only produced when `in_array` is set.
fn convert(json: &Json, in_array: bool) -> Result<Option<Value>, String> {
    let value = match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(n.as_f64().ok_or_else(|| format!("unrepresentable number {n}"))?),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => {
            let slots = items
                .iter()
                .map(|item| convert(item, true))
                .collect::<Result<Vec<_>, _>>()?;
            Value::sparse_array(slots)
        }
        Json::Object(obj) => {
            if obj.len() == 1 {
                if let Some(special) = obj.get("$number") {
                    return special_number(special).map(Some);
                }
                if obj.contains_key("$undefined") {
                    return Ok(Some(Value::Undefined));
                }
                if obj.contains_key("$hole") {
                    return if in_array {
                        Ok(None)
                    } else {
                        Err("`$hole` is only valid as an array element".to_string())
                    };
                }
            }
            let entries = obj
                .iter()
                .map(|(k, v)| to_value(v).map(|v| (k.clone(), v)))
                .collect::<Result<Vec<_>, _>>()?;
            Value::map(entries)
        }
    };
    Ok(Some(value))
}

fn special_number(json: &Json) -> Result<Value, String> {
    let n = match json.as_str() {
        Some("NaN") => f64::NAN,
        Some("Infinity") => f64::INFINITY,
        Some("-Infinity") => f64::NEG_INFINITY,
        Some("-0") => -0.0,
        _ => return Err(format!("unknown `$number` encoding {json}")),
    };
    Ok(Value::Number(n))
}
