//! Per-case test state.
//!
//! A [`TestContext`] is created fresh for every test case and handed to each setup step, the test body and each
//! tear_down step. Test code reports conditions through two families of checks:
//!
//! - `assert_*` (hard): on failure the case is marked failed and the current execution unit is unwound immediately.
//!   Nothing after the failing assertion in that unit runs; the runner then proceeds to tear_down.
//! - `expect_*` (soft): on failure the case is marked failed and execution continues.
//!
//! Both families log a diagnostic with both operands on mismatch. Logging is observational only.
//!
//! The unwind is raised with [`std::panic::resume_unwind`] carrying a private marker payload, so it does not go
//! through the panic hook. Calling a hard assertion outside the runner unwinds the calling thread like any panic.

use std::any::Any;
use std::fmt::{self, Debug};
use std::panic::{self, Location};

/// Unwind payload raised by hard assertions.
#[derive(Debug)]
struct Abort;

/// Whether an unwind payload came from a hard assertion rather than an ordinary panic.
pub(crate) fn is_abort(payload: &(dyn Any + Send)) -> bool {
    payload.is::<Abort>()
}

/// How a failure was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A hard assertion; the unit was aborted.
    Assertion,
    /// A soft expectation; execution continued.
    Expectation,
    /// A panic contained at the unit boundary.
    Panic,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Assertion => "assertion",
            Severity::Expectation => "expectation",
            Severity::Panic => "panic",
        })
    }
}

/// Which part of a test case was executing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Creating the fixture instance with `Default`.
    Instantiate,
    /// A setup step declared by the named fixture.
    Setup(String),
    /// The test case body.
    Body,
    /// A tear_down step declared by the named fixture.
    TearDown(String),
    /// Dropping the fixture instance.
    Drop,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Instantiate => f.write_str("instantiate"),
            Phase::Setup(owner) => write!(f, "{owner}::setup"),
            Phase::Body => f.write_str("body"),
            Phase::TearDown(owner) => write!(f, "{owner}::tear_down"),
            Phase::Drop => f.write_str("drop"),
        }
    }
}

/// A single recorded failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub severity: Severity,
    pub phase: Phase,
    pub message: String,
    /// Call site of the failing check. `None` for contained panics.
    pub location: Option<&'static Location<'static>>,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(at) => write!(f, "{} failed in {} at {}: {}", self.severity, self.phase, at, self.message),
            None => write!(f, "{} in {}: {}", self.severity, self.phase, self.message),
        }
    }
}

/// Mutable state of one test case.
#[derive(Debug)]
pub struct TestContext {
    fixture: String,
    case: String,
    phase: Phase,
    failed: bool,
    failures: Vec<Failure>,
}

impl TestContext {
    pub fn new(fixture: impl Into<String>, case: impl Into<String>) -> Self {
        Self {
            fixture: fixture.into(),
            case: case.into(),
            phase: Phase::Body,
            failed: false,
            failures: Vec::new(),
        }
    }

    pub fn fixture(&self) -> &str {
        &self.fixture
    }

    pub fn case(&self) -> &str {
        &self.case
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Whether any check has failed so far.
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub(crate) fn enter(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn into_failures(self) -> Vec<Failure> {
        self.failures
    }

    // ========================================================================
    // Explicit failures
    // ========================================================================

    /// Mark the case failed and keep going.
    #[track_caller]
    pub fn fail(&mut self, message: impl Into<String>) {
        self.record(Severity::Expectation, message.into(), Some(Location::caller()));
    }

    /// Mark the case failed and abort the current unit.
    #[track_caller]
    pub fn abort(&mut self, message: impl Into<String>) -> ! {
        self.record(Severity::Assertion, message.into(), Some(Location::caller()));
        panic::resume_unwind(Box::new(Abort))
    }

    // ========================================================================
    // Hard assertions
    // ========================================================================

    /// Aborts unless `value` is true.
    #[track_caller]
    pub fn assert_true(&mut self, value: bool) {
        if let Err(message) = check_true(value) {
            self.abort(message);
        }
    }

    /// Aborts unless `value` is false.
    #[track_caller]
    pub fn assert_false(&mut self, value: bool) {
        if let Err(message) = check_false(value) {
            self.abort(message);
        }
    }

    /// Aborts unless the two values are deeply equal.
    #[track_caller]
    pub fn assert_equal<V: PartialEq + Debug>(&mut self, actual: V, expected: V) {
        if let Err(message) = check_equal(&actual, &expected) {
            self.abort(message);
        }
    }

    /// Aborts if `result` is an error; otherwise returns the success value.
    #[track_caller]
    pub fn assert_success<T, E: Debug>(&mut self, result: Result<T, E>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => self.abort(unexpected_error(&err)),
        }
    }

    /// Aborts unless `result` is an error; otherwise returns the error.
    #[track_caller]
    pub fn assert_failure<T: Debug, E>(&mut self, result: Result<T, E>) -> E {
        match result {
            Ok(value) => self.abort(missing_error(&value)),
            Err(err) => err,
        }
    }

    /// Aborts unless `result` is an error equal to `expected`.
    #[track_caller]
    pub fn assert_error<T: Debug, E: PartialEq + Debug>(&mut self, result: Result<T, E>, expected: E) {
        if let Err(message) = check_error(&result, &expected) {
            self.abort(message);
        }
    }

    // ========================================================================
    // Soft expectations
    // ========================================================================

    #[track_caller]
    pub fn expect_true(&mut self, value: bool) -> bool {
        self.soft(check_true(value))
    }

    #[track_caller]
    pub fn expect_false(&mut self, value: bool) -> bool {
        self.soft(check_false(value))
    }

    #[track_caller]
    pub fn expect_equal<V: PartialEq + Debug>(&mut self, actual: V, expected: V) -> bool {
        self.soft(check_equal(&actual, &expected))
    }

    #[track_caller]
    pub fn expect_success<T, E: Debug>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.fail(unexpected_error(&err));
                None
            }
        }
    }

    #[track_caller]
    pub fn expect_failure<T: Debug, E>(&mut self, result: Result<T, E>) -> Option<E> {
        match result {
            Ok(value) => {
                self.fail(missing_error(&value));
                None
            }
            Err(err) => Some(err),
        }
    }

    #[track_caller]
    pub fn expect_error<T: Debug, E: PartialEq + Debug>(&mut self, result: Result<T, E>, expected: E) -> bool {
        self.soft(check_error(&result, &expected))
    }

    // ========================================================================
    // Recording
    // ========================================================================

    #[track_caller]
    fn soft(&mut self, outcome: Result<(), String>) -> bool {
        match outcome {
            Ok(()) => true,
            Err(message) => {
                self.fail(message);
                false
            }
        }
    }

    pub(crate) fn record_panic(&mut self, message: String) {
        self.record(Severity::Panic, message, None);
    }

    fn record(&mut self, severity: Severity, message: String, location: Option<&'static Location<'static>>) {
        self.failed = true;
        let failure = Failure {
            severity,
            phase: self.phase.clone(),
            message,
            location,
        };
        tracing::error!(
            fixture = %self.fixture,
            case = %self.case,
            phase = %failure.phase,
            at = location.map(tracing::field::display),
            "{failure}"
        );
        self.failures.push(failure);
    }
}

// ============================================================================
// Checks
// ============================================================================

fn check_true(value: bool) -> Result<(), String> {
    if value { Ok(()) } else { Err("boolean is not true".to_string()) }
}

fn check_false(value: bool) -> Result<(), String> {
    if value { Err("boolean is not false".to_string()) } else { Ok(()) }
}

fn check_equal<V: PartialEq + Debug>(actual: &V, expected: &V) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("{actual:?} does not equal {expected:?}"))
    }
}

fn check_error<T: Debug, E: PartialEq + Debug>(result: &Result<T, E>, expected: &E) -> Result<(), String> {
    match result {
        Ok(value) => Err(format!("error did not occur (got Ok({value:?})); expected error {expected:?}")),
        Err(err) if err == expected => Ok(()),
        Err(err) => Err(format!("error {err:?} does not match expected error {expected:?}")),
    }
}

fn unexpected_error<E: Debug>(err: &E) -> String {
    format!("unexpected error occurred: {err:?}")
}

fn missing_error<T: Debug>(value: &T) -> String {
    format!("expected an error to have occurred, got Ok({value:?})")
}
