//! Execution engine.
//!
//! Runs every test case of every registered fixture, sequentially, in registration order and then declared case
//! order. For each case:
//!
//! 1. A fresh [`TestContext`] is created.
//! 2. A fresh fixture instance is created, then the setup chain and the test body run, all inside one execution unit
//!    (a scoped thread the runner joins). A hard assertion, or any other panic, unwinds that unit only: later setup
//!    steps and the body are skipped.
//! 3. If an instance exists, every tear_down step runs, in chain order, each in its own execution unit, regardless of
//!    how step 2 ended.
//! 4. The instance is dropped in a final execution unit.
//! 5. The case passes iff nothing marked the context failed.
//!
//! ## Reporter Trait
//!
//! Progress is reported through [`Reporter`]. [`LogReporter`] emits `* <fixture>` and `** <PASS|FAIL>: <case>`
//! lines through `tracing`.

use std::any::Any;
use std::fmt;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::RunConfig;
use crate::context::{self, Failure, Phase, TestContext};
use crate::fixture::{Fixture, FixtureDescriptor, TestCase};
use crate::logging;
use crate::registry::Registry;

// ============================================================================
// Outcomes
// ============================================================================

/// Process exit code summarising a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Pass,
    Fail,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CaseStatus::Pass => "PASS",
            CaseStatus::Fail => "FAIL",
        })
    }
}

/// Result of running a single test case
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub fixture: String,
    pub case: String,
    pub status: CaseStatus,
    pub failures: Vec<Failure>,
    pub duration: Duration,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Pass
    }
}

/// Summary of a test run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Outcomes in execution order.
    pub cases: Vec<CaseOutcome>,
    pub duration: Duration,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|case| case.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    /// True iff every case passed (vacuously true for an empty run).
    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(CaseOutcome::passed)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.all_passed() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
    }
}

// ============================================================================
// Reporting
// ============================================================================

/// Hooks for observing a run.
pub trait Reporter {
    /// Called before the first case of each fixture
    fn on_fixture_start(&mut self, _fixture: &str) {}

    /// Called when a case completes
    fn on_case_complete(&mut self, outcome: &CaseOutcome);

    /// Called when all cases have completed
    fn on_run_complete(&mut self, _report: &RunReport) {}
}

/// `* <fixture>`
pub fn fixture_line(fixture: &str) -> String {
    format!("* {fixture}")
}

/// `** <PASS|FAIL>: <case>`
pub fn case_line(outcome: &CaseOutcome) -> String {
    format!("** {}: {}", outcome.status, outcome.case)
}

/// Default reporter: human-readable lines through `tracing`.
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn on_fixture_start(&mut self, fixture: &str) {
        tracing::info!("{}", fixture_line(fixture));
    }

    fn on_case_complete(&mut self, outcome: &CaseOutcome) {
        tracing::info!("{}", case_line(outcome));
    }

    fn on_run_complete(&mut self, report: &RunReport) {
        tracing::info!(
            passed = report.passed(),
            failed = report.failed(),
            "{} passed, {} failed in {:.2}s",
            report.passed(),
            report.failed(),
            report.duration.as_secs_f64()
        );
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Owns a closed registry and runs it.
pub struct Runner {
    registry: Registry,
    config: RunConfig,
}

impl Runner {
    /// Create a runner configured from the environment.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            config: RunConfig::from_env(),
        }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run every case, reporting through [`LogReporter`].
    pub fn run(&self) -> RunReport {
        self.run_with(&mut LogReporter)
    }

    /// Run every case, reporting through `reporter`.
    pub fn run_with(&self, reporter: &mut dyn Reporter) -> RunReport {
        let start = Instant::now();
        let mut cases = Vec::new();

        for fixture in self.registry.fixtures() {
            reporter.on_fixture_start(fixture.name());
            for index in 0..fixture.case_count() {
                if let Some(outcome) = fixture.run_case(index, &self.config) {
                    reporter.on_case_complete(&outcome);
                    cases.push(outcome);
                }
            }
        }

        let report = RunReport {
            cases,
            duration: start.elapsed(),
        };
        reporter.on_run_complete(&report);
        report
    }

    /// Initialise logging, run every case and exit the process: 0 if every case passed, 1 otherwise.
    pub fn run_all(self) -> ! {
        logging::init(&self.config.default_log_filter);
        let report = self.run();
        process::exit(report.exit_code().0)
    }
}

// ============================================================================
// Execution units
// ============================================================================

/// How an execution unit ended.
#[derive(Debug, PartialEq, Eq)]
enum UnitExit {
    Completed,
    /// A hard assertion unwound the unit; the failure is already recorded.
    Aborted,
    Panicked(String),
}

/// Run `body` on a dedicated scoped thread and wait for it.
fn run_unit<'env, B>(config: &RunConfig, label: &str, body: B) -> UnitExit
where
    B: FnOnce() + Send + 'env,
{
    thread::scope(|scope| {
        let mut builder = thread::Builder::new().name(label.to_string());
        if let Some(size) = config.stack_size {
            builder = builder.stack_size(size);
        }
        match builder.spawn_scoped(scope, body) {
            Ok(handle) => match handle.join() {
                Ok(()) => UnitExit::Completed,
                Err(payload) if context::is_abort(payload.as_ref()) => UnitExit::Aborted,
                Err(payload) => UnitExit::Panicked(panic_message(payload.as_ref())),
            },
            Err(err) => UnitExit::Panicked(format!("failed to spawn execution unit: {err}")),
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn settle(t: &mut TestContext, exit: UnitExit) {
    match exit {
        UnitExit::Completed => {}
        UnitExit::Aborted => tracing::debug!(phase = %t.phase(), "execution unit aborted"),
        UnitExit::Panicked(message) => t.record_panic(message),
    }
}

/// Run one test case of `descriptor` against a fresh instance.
#[tracing::instrument(skip_all, fields(fixture = descriptor.name(), case = case.name()))]
pub(crate) fn execute_case<F: Fixture>(
    descriptor: &FixtureDescriptor<F>,
    case: &TestCase<F>,
    config: &RunConfig,
) -> CaseOutcome {
    let start = Instant::now();
    let label = format!("{}::{}", descriptor.name(), case.name());
    let mut t = TestContext::new(descriptor.name(), case.name());
    let mut slot: Option<F> = None;

    t.enter(Phase::Instantiate);
    let exit = run_unit(config, &label, || {
        let fixture = slot.insert(descriptor.instantiate());
        for step in descriptor.setup_chain() {
            t.enter(Phase::Setup(step.owner().to_string()));
            step.run(fixture, &mut t);
        }
        t.enter(Phase::Body);
        case.run(fixture, &mut t);
    });
    settle(&mut t, exit);

    // Without an instance there is nothing to tear down.
    if let Some(fixture) = slot.as_mut() {
        for step in descriptor.teardown_chain() {
            t.enter(Phase::TearDown(step.owner().to_string()));
            let exit = run_unit(config, &label, || step.run(fixture, &mut t));
            settle(&mut t, exit);
        }
    }

    t.enter(Phase::Drop);
    let exit = run_unit(config, &label, move || drop(slot));
    settle(&mut t, exit);

    let status = if t.failed() { CaseStatus::Fail } else { CaseStatus::Pass };
    tracing::debug!(status = %status, "case finished");
    CaseOutcome {
        fixture: descriptor.name().to_string(),
        case: case.name().to_string(),
        status,
        failures: t.into_failures(),
        duration: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(case: &str, status: CaseStatus) -> CaseOutcome {
        CaseOutcome {
            fixture: "Fixture".to_string(),
            case: case.to_string(),
            status,
            failures: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_report_counts_and_exit_code() {
        let report = RunReport {
            cases: vec![outcome("a", CaseStatus::Pass), outcome("b", CaseStatus::Fail)],
            duration: Duration::ZERO,
        };
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_passed());
        assert_eq!(report.exit_code(), ExitCode::FAILURE);
    }

    #[test]
    fn test_empty_report_succeeds() {
        let report = RunReport::default();
        assert!(report.all_passed());
        assert_eq!(report.exit_code(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_runner_keeps_registry_and_config() {
        let config = RunConfig::default().with_stack_size(512 * 1024);
        let runner = Runner::new(Registry::new()).with_config(config.clone());
        assert!(runner.registry().is_empty());
        assert_eq!(runner.config(), &config);
    }

    #[test]
    fn test_report_lines() {
        assert_eq!(fixture_line("SetFixture"), "* SetFixture");
        assert_eq!(case_line(&outcome("len", CaseStatus::Pass)), "** PASS: len");
        assert_eq!(case_line(&outcome("len", CaseStatus::Fail)), "** FAIL: len");
    }

    // ========================================
    // Execution units
    // ========================================

    #[test]
    fn test_unit_completes() {
        let mut touched = false;
        let exit = run_unit(&RunConfig::default(), "unit", || touched = true);
        assert_eq!(exit, UnitExit::Completed);
        assert!(touched);
    }

    #[test]
    fn test_unit_contains_hard_assertion() {
        let mut t = TestContext::new("Fixture", "case");
        let mut after = false;
        let exit = run_unit(&RunConfig::default(), "unit", || {
            t.assert_true(false);
            after = true;
        });
        assert_eq!(exit, UnitExit::Aborted);
        assert!(!after);
        assert!(t.failed());
    }

    #[test]
    fn test_unit_contains_panic() {
        let exit = run_unit(&RunConfig::default().with_stack_size(256 * 1024), "unit", || {
            let values: Vec<i32> = Vec::new();
            let _ = values[3];
        });
        match exit {
            UnitExit::Panicked(message) => assert!(message.contains("index out of bounds"), "{message}"),
            other => panic!("expected a contained panic, got {other:?}"),
        }
    }

    #[test]
    fn test_panic_message_formats() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&"owned".to_string()), "owned");
        assert_eq!(panic_message(&42_u8), "non-string panic payload");
    }
}
