//! Sequential test execution.
//!
//! ## RunReporter Trait
//!
//! The runner reports progress through [`RunReporter`] and never prints on its own. [`ConsoleReporter`] produces
//! the familiar `test result: ok. 3 passed; 0 failed` output; [`SilentReporter`] discards everything.
//!
//! ## Scheduling
//!
//! Tests run one at a time in registration order. A body may suspend while awaiting an asynchronous sub-result,
//! but the next test does not start until the current one resolves. There is no timeout: a body that never
//! resolves stalls the run.

use std::io::{self, Write};

use wpt_core::{QualifiedName, RunResult, TestOutcome};

use crate::registry::TestCase;

// ============================================================================
// Run Reporter Trait
// ============================================================================

/// Receives run progress.
pub trait RunReporter {
    /// Called once before the first test with the number of tests to run
    fn on_run_start(&mut self, _test_count: usize) {}

    /// Called after each test resolves
    fn on_test_complete(&mut self, name: &QualifiedName, outcome: &TestOutcome);

    /// Called when all tests have resolved
    fn on_run_complete(&mut self, _result: &RunResult) {}
}

/// Reporter that discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl RunReporter for SilentReporter {
    fn on_test_complete(&mut self, _name: &QualifiedName, _outcome: &TestOutcome) {}
}

const GREEN_OK: &str = "\x1b[32mok\x1b[0m";
const RED_FAILED: &str = "\x1b[31mFAILED\x1b[0m";

/// Console reporter mirroring the Rust test runner's output.
///
/// Progress goes to `out`; failure messages go to `err`.
pub struct ConsoleReporter<O = io::Stdout, E = io::Stderr> {
    out: O,
    err: E,
    color: bool,
}

impl ConsoleReporter {
    /// Reporter on stdout/stderr with colors.
    pub fn new() -> Self {
        Self::with_writers(io::stdout(), io::stderr(), true)
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn with_writers(out: O, err: E, color: bool) -> Self {
        Self { out, err, color }
    }

    pub fn into_writers(self) -> (O, E) {
        (self.out, self.err)
    }

    fn status(&self, ok: bool) -> &'static str {
        match (ok, self.color) {
            (true, true) => GREEN_OK,
            (false, true) => RED_FAILED,
            (true, false) => "ok",
            (false, false) => "FAILED",
        }
    }
}

// Console output is best effort; a closed pipe must not abort the run.
impl<O: Write, E: Write> RunReporter for ConsoleReporter<O, E> {
    fn on_run_start(&mut self, test_count: usize) {
        let _ = writeln!(self.out, "running {test_count} tests");
    }

    fn on_test_complete(&mut self, name: &QualifiedName, outcome: &TestOutcome) {
        let status = self.status(outcome.is_passed());
        let _ = writeln!(self.out, "{name} ... {status}");
        if let Some(message) = outcome.message() {
            let _ = writeln!(self.err, "{message}");
        }
    }

    fn on_run_complete(&mut self, result: &RunResult) {
        let status = self.status(result.is_success());
        let _ = writeln!(
            self.out,
            "\ntest result: {status}. {} passed; {} failed\n",
            result.passed(),
            result.failed()
        );
        if !result.is_success() {
            let _ = writeln!(self.err, "There were {} test failures.", result.failed());
        }
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Run `tests` in order and collect their outcomes.
///
/// ## Notes
/// - A thrown assertion failure is `Failed`; a test bug or any other thrown value is `Errored`.
/// - A failing test never aborts the run.
/// - Tests are not isolated from each other.
#[tracing::instrument(skip_all, fields(test_count = tests.len()))]
pub async fn run(tests: Vec<TestCase>, reporter: &mut dyn RunReporter) -> RunResult {
    reporter.on_run_start(tests.len());

    let mut result = RunResult::new();
    for case in tests {
        let (name, body) = case.start();
        let outcome = TestOutcome::from_completion(body.await);
        tracing::debug!(test = %name, status = ?outcome.status(), "test resolved");
        reporter.on_test_complete(&name, &outcome);
        result.record(name, outcome);
    }

    tracing::info!(passed = result.passed(), failed = result.failed(), "run complete");
    reporter.on_run_complete(&result);
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::registry::TestBody;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wpt_core::{AssertionFailure, Thrown, Value};

    fn case(name: &str, completion: Result<(), Thrown>) -> TestCase {
        TestCase::new(name, move || -> TestBody { Box::pin(async move { completion }) })
    }

    #[derive(Default)]
    struct Recording {
        started: Option<usize>,
        completed: Vec<(String, TestOutcome)>,
        finished: bool,
    }

    impl RunReporter for Recording {
        fn on_run_start(&mut self, test_count: usize) {
            self.started = Some(test_count);
        }

        fn on_test_complete(&mut self, name: &QualifiedName, outcome: &TestOutcome) {
            self.completed.push((name.to_string(), outcome.clone()));
        }

        fn on_run_complete(&mut self, _result: &RunResult) {
            self.finished = true;
        }
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
            .block_on(future)
    }

    // ========================================
    // Classification
    // ========================================

    #[test]
    fn test_classifies_three_outcomes() {
        let tests = vec![
            case("A", Ok(())),
            case("B", Err(AssertionFailure::new("x").into())),
            case("C", Err(Value::error("Error", "y").into())),
        ];
        let result = block_on(run(tests, &mut SilentReporter));
        assert_eq!(result.passed(), 1);
        assert_eq!(result.failed(), 2);
        assert_eq!(result.get(&"A".into()), Some(&TestOutcome::Passed));
        assert_eq!(result.get(&"B".into()), Some(&TestOutcome::Failed("x".into())));
        assert_eq!(result.get(&"C".into()), Some(&TestOutcome::Errored("y".into())));
    }

    #[test]
    fn test_empty_run() {
        let result = block_on(run(Vec::new(), &mut SilentReporter));
        assert_eq!(result.total(), 0);
        assert!(result.is_success());
    }

    // ========================================
    // Ordering
    // ========================================

    #[test]
    fn test_runs_sequentially_across_suspension() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let slow_log = Rc::clone(&log);
        let fast_log = Rc::clone(&log);
        let tests = vec![
            TestCase::new("slow", move || -> TestBody {
                Box::pin(async move {
                    slow_log.borrow_mut().push("slow:start");
                    tokio::task::yield_now().await;
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    slow_log.borrow_mut().push("slow:end");
                    Ok(())
                })
            }),
            TestCase::new("fast", move || -> TestBody {
                Box::pin(async move {
                    fast_log.borrow_mut().push("fast");
                    Ok(())
                })
            }),
        ];
        block_on(run(tests, &mut SilentReporter));
        assert_eq!(*log.borrow(), vec!["slow:start", "slow:end", "fast"]);
    }

    #[test]
    fn test_shared_state_is_visible_to_later_tests() {
        let counter = Rc::new(RefCell::new(0));
        let first = Rc::clone(&counter);
        let second = Rc::clone(&counter);
        let tests = vec![
            TestCase::new("inc", move || -> TestBody {
                Box::pin(async move {
                    *first.borrow_mut() += 1;
                    Ok(())
                })
            }),
            TestCase::new("observe", move || -> TestBody {
                Box::pin(async move {
                    if *second.borrow() == 1 {
                        Ok(())
                    } else {
                        Err(AssertionFailure::new("state not shared").into())
                    }
                })
            }),
        ];
        let result = block_on(run(tests, &mut SilentReporter));
        assert!(result.is_success());
    }

    // ========================================
    // Reporting
    // ========================================

    #[test]
    fn test_reporter_sees_every_event() {
        let mut reporter = Recording::default();
        let tests = vec![case("a", Ok(())), case("b", Err(AssertionFailure::new("no").into()))];
        block_on(run(tests, &mut reporter));
        assert_eq!(reporter.started, Some(2));
        assert_eq!(reporter.completed.len(), 2);
        assert_eq!(reporter.completed[1], ("b".to_string(), TestOutcome::Failed("no".into())));
        assert!(reporter.finished);
    }

    #[test]
    fn test_console_reporter_summary() {
        let mut reporter = ConsoleReporter::with_writers(Vec::new(), Vec::new(), false);
        let tests = vec![case("a", Ok(())), case("b", Err(AssertionFailure::new("boom").into()))];
        block_on(run(tests, &mut reporter));
        let (out, err) = reporter.into_writers();
        let out = String::from_utf8(out).unwrap();
        let err = String::from_utf8(err).unwrap();
        assert!(out.starts_with("running 2 tests\n"));
        assert!(out.contains("a ... ok\n"));
        assert!(out.contains("b ... FAILED\n"));
        assert!(out.contains("test result: FAILED. 1 passed; 1 failed"));
        assert!(err.contains("boom"));
        assert!(err.contains("There were 1 test failures."));
    }

    #[test]
    fn test_console_reporter_success_summary() {
        let mut reporter = ConsoleReporter::with_writers(Vec::new(), Vec::new(), false);
        block_on(run(vec![case("a", Ok(()))], &mut reporter));
        let (out, err) = reporter.into_writers();
        assert!(String::from_utf8(out).unwrap().contains("test result: ok. 1 passed; 0 failed"));
        assert!(err.is_empty());
    }
}
