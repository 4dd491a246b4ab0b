#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
//! Windigo: composable test fixtures.
//!
//! A fixture is a plain struct holding per-case state, plus `setup`, `tear_down` and `test_*` methods. Fixtures can
//! embed other fixtures; the embedded setup/tear_down steps run against the embedded field, ancestors first on the
//! way in and last on the way out. Every test case gets a brand-new instance.
//!
//! ```no_run
//! use std::collections::HashSet;
//!
//! use windigo::{Fixture, Registry, RegistrationError, Runner, TestContext, fixture_methods};
//!
//! #[derive(Default, Fixture)]
//! struct PopulatedSet {
//!     set: HashSet<u32>,
//! }
//!
//! #[fixture_methods]
//! impl PopulatedSet {
//!     fn setup(&mut self, t: &mut TestContext) {
//!         for i in 0..1000 {
//!             t.assert_true(self.set.insert(i));
//!         }
//!     }
//!
//!     fn test_contains_all(&self, t: &mut TestContext) {
//!         for i in 0..1000 {
//!             t.expect_true(self.set.contains(&i));
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), RegistrationError> {
//!     let mut registry = Registry::new();
//!     registry.register::<PopulatedSet>()?;
//!     Runner::new(registry).run_all()
//! }
//! ```
//!
//! ## Misconfiguration
//!
//! Only structs can be fixtures. Deriving `Fixture` on anything else is rejected at compile time:
//!
//! ```compile_fail
//! use windigo::{Fixture, TestContext, fixture_methods};
//!
//! #[derive(Default, Fixture)]
//! enum Shape {
//!     #[default]
//!     Circle,
//! }
//!
//! #[fixture_methods]
//! impl Shape {
//!     fn test_circle(&self, _t: &mut TestContext) {}
//! }
//! ```
//!
//! `#[fixture_methods]` only accepts inherent impl blocks:
//!
//! ```compile_fail
//! use windigo::{Fixture, TestContext, fixture_methods};
//!
//! trait Checks {
//!     fn test_ok(&self, t: &mut TestContext);
//! }
//!
//! #[derive(Default, Fixture)]
//! struct Plain;
//!
//! #[fixture_methods]
//! impl Checks for Plain {
//!     fn test_ok(&self, _t: &mut TestContext) {}
//! }
//! ```
//!
//! Other misconfiguration, such as two `setup` methods or an embedding cycle, is reported by
//! [`Registry::register`] as a [`RegistrationError`] before any case runs.
//!
//! ## Panic Policy
//!
//! - **Library code**: explicit `Result`s for registration; no `unwrap`/`expect`.
//! - **Hard assertions**: implemented as an unwind that the runner contains at the execution-unit boundary.
//! - **Test code**: `.unwrap()` is acceptable in tests.

pub mod config;
pub mod context;
pub mod errors;
pub mod fixture;
pub mod logging;
pub mod registry;
pub mod runner;

pub use config::RunConfig;
pub use context::{Failure, Phase, Severity, TestContext};
pub use errors::{RegistrationError, RegistrationResult};
pub use fixture::{Fixture, FixtureBuilder, FixtureDescriptor, FixtureMethods, MethodKind, Step, TestCase, classify};
pub use registry::{RegisteredFixture, Registry};
pub use runner::{CaseOutcome, CaseStatus, ExitCode, LogReporter, Reporter, RunReport, Runner};

// Structural method discovery
pub use windigo_derive::{Fixture, fixture_methods};
