//! Per-test outcomes and the aggregate result of one run.

use indexmap::IndexMap;

use crate::names::QualifiedName;
use crate::thrown::Thrown;

/// How a single test case ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    /// An assertion did not hold.
    Failed(String),
    /// The body threw something other than an assertion failure.
    Errored(String),
}

/// Outcome without its failure message; this is what survives persistence for `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    Passed,
    Failed,
    Errored,
}

impl TestOutcome {
    /// Classify the completion of a test body.
    pub fn from_completion(completion: Result<(), Thrown>) -> Self {
        match completion {
            Ok(()) => TestOutcome::Passed,
            Err(Thrown::Assertion(failure)) => TestOutcome::Failed(failure.message),
            Err(other) => TestOutcome::Errored(other.message()),
        }
    }

    pub fn status(&self) -> OutcomeStatus {
        match self {
            TestOutcome::Passed => OutcomeStatus::Passed,
            TestOutcome::Failed(_) => OutcomeStatus::Failed,
            TestOutcome::Errored(_) => OutcomeStatus::Errored,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    /// The failure or error message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            TestOutcome::Passed => None,
            TestOutcome::Failed(m) | TestOutcome::Errored(m) => Some(m),
        }
    }
}

/// Aggregate result of one run.
///
/// ## Notes
/// - `passed + failed == outcomes.len()` always holds: outcomes are only added through [`RunResult::record`].
/// - `failed` counts both `Failed` and `Errored` outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    passed: usize,
    failed: usize,
    outcomes: IndexMap<QualifiedName, TestOutcome>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of `name`, replacing an earlier outcome for the same name.
    pub fn record(&mut self, name: QualifiedName, outcome: TestOutcome) {
        if let Some(previous) = self.outcomes.get(&name) {
            self.uncount(previous.is_passed());
        }
        if outcome.is_passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.insert(name, outcome);
    }

    fn uncount(&mut self, was_passed: bool) {
        if was_passed {
            self.passed -= 1;
        } else {
            self.failed -= 1;
        }
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn get(&self, name: &QualifiedName) -> Option<&TestOutcome> {
        self.outcomes.get(name)
    }

    /// Outcomes in execution order.
    pub fn outcomes(&self) -> impl Iterator<Item = (&QualifiedName, &TestOutcome)> {
        self.outcomes.iter()
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl FromIterator<(QualifiedName, TestOutcome)> for RunResult {
    fn from_iter<I: IntoIterator<Item = (QualifiedName, TestOutcome)>>(iter: I) -> Self {
        let mut result = RunResult::new();
        for (name, outcome) in iter {
            result.record(name, outcome);
        }
        result
    }
}
