//! Shared helpers for integration tests.
//!
//! Fixture instances are created fresh by the runner, so instrumented fixtures record into a `static` [`EventLog`].
//! Each test uses its own log so tests can run in parallel.

#![allow(dead_code)]

use std::sync::Mutex;

use windigo::runner::{case_line, fixture_line};
use windigo::{CaseOutcome, Reporter, RunReport};

/// Ordered record of executed actions.
pub struct EventLog(Mutex<Vec<String>>);

impl EventLog {
    pub const fn new() -> Self {
        Self(Mutex::new(Vec::new()))
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(event.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}

/// Collects the lines `LogReporter` would log.
#[derive(Default)]
pub struct RecordingReporter {
    pub lines: Vec<String>,
    pub completed: bool,
}

impl Reporter for RecordingReporter {
    fn on_fixture_start(&mut self, fixture: &str) {
        self.lines.push(fixture_line(fixture));
    }

    fn on_case_complete(&mut self, outcome: &CaseOutcome) {
        self.lines.push(case_line(outcome));
    }

    fn on_run_complete(&mut self, _report: &RunReport) {
        self.completed = true;
    }
}

/// Define a fixture with `setup`, `tear_down` and one test case, each recording `<Name>.<action>` into `$log`.
macro_rules! instrumented_fixture {
    ($name:ident, $log:path) => {
        #[derive(Debug, Default)]
        pub struct $name {
            pub ready: bool,
        }

        impl windigo::Fixture for $name {
            fn describe(builder: &mut windigo::FixtureBuilder<Self>) {
                builder
                    .method("setup", |f: &mut Self, _t: &mut windigo::TestContext| {
                        $log.push(concat!(stringify!($name), ".setup"));
                        f.ready = true;
                    })
                    .method("tear_down", |_f: &mut Self, _t: &mut windigo::TestContext| {
                        $log.push(concat!(stringify!($name), ".tear_down"));
                    })
                    .method("test_own", |_f: &mut Self, _t: &mut windigo::TestContext| {
                        $log.push(concat!(stringify!($name), ".test_own"));
                    });
            }
        }
    };
}
