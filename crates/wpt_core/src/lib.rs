//! Provide the shared vocabulary of the wpt harness.
//!
//! Both the assertion library (`wpt_asserts`) and the harness (`wpt_harness`) depend on this crate so that they
//! agree on one value model and one outcome taxonomy.
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no global state, no async.
//! - Current scope: the tagged value tree test bodies operate on, qualified test names, run outcomes, the three-way
//!   thrown-value taxonomy, and the legacy DOMException code tables used by exception matching.

pub mod exceptions;
pub mod names;
pub mod outcome;
pub mod thrown;
pub mod value;

pub use names::{DELIMITER, QualifiedName};
pub use outcome::{OutcomeStatus, RunResult, TestOutcome};
pub use thrown::{AssertError, AssertionFailure, TestBug, Thrown};
pub use value::Value;
