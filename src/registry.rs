//! Fixture registry.
//!
//! An ordered, append-only list of fixture descriptors. It is filled during registration and then handed to a
//! [`Runner`](crate::runner::Runner), which only reads it.

use std::fmt;

use crate::config::RunConfig;
use crate::errors::RegistrationResult;
use crate::fixture::{Fixture, FixtureDescriptor};
use crate::runner::{self, CaseOutcome};

/// A registered descriptor with its fixture type erased.
pub trait RegisteredFixture {
    fn name(&self) -> &str;

    fn case_names(&self) -> Vec<&str>;

    fn case_count(&self) -> usize;

    /// Run the case at `index` with a fresh instance. `None` if out of range.
    fn run_case(&self, index: usize, config: &RunConfig) -> Option<CaseOutcome>;
}

impl<F: Fixture> RegisteredFixture for FixtureDescriptor<F> {
    fn name(&self) -> &str {
        FixtureDescriptor::name(self)
    }

    fn case_names(&self) -> Vec<&str> {
        self.test_cases().iter().map(|case| case.name()).collect()
    }

    fn case_count(&self) -> usize {
        self.test_cases().len()
    }

    fn run_case(&self, index: usize, config: &RunConfig) -> Option<CaseOutcome> {
        let case = self.test_cases().get(index)?;
        Some(runner::execute_case(self, case, config))
    }
}

/// Ordered list of registered fixtures.
#[derive(Default)]
pub struct Registry {
    fixtures: Vec<Box<dyn RegisteredFixture>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe `F` and append it.
    ///
    /// Registering the same type twice runs its cases twice.
    pub fn register<F: Fixture>(&mut self) -> RegistrationResult<&mut Self> {
        let descriptor = FixtureDescriptor::<F>::build()?;
        Ok(self.register_descriptor(descriptor))
    }

    /// Append an already built descriptor.
    pub fn register_descriptor<F: Fixture>(&mut self, descriptor: FixtureDescriptor<F>) -> &mut Self {
        tracing::debug!(
            fixture = descriptor.name(),
            cases = descriptor.test_cases().len(),
            setup_steps = descriptor.setup_chain().len(),
            teardown_steps = descriptor.teardown_chain().len(),
            "registered fixture"
        );
        self.fixtures.push(Box::new(descriptor));
        self
    }

    /// Registered fixtures in registration order.
    pub fn fixtures(&self) -> impl Iterator<Item = &dyn RegisteredFixture> {
        self.fixtures.iter().map(|fixture| fixture.as_ref())
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fixtures().map(|fixture| fixture.name())).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;
    use crate::fixture::FixtureBuilder;

    #[derive(Default)]
    struct Alpha;

    impl Fixture for Alpha {
        fn describe(builder: &mut FixtureBuilder<Self>) {
            builder
                .method("test_one", |_f: &mut Self, _t: &mut TestContext| {})
                .method("test_two", |_f: &mut Self, _t: &mut TestContext| {});
        }
    }

    #[derive(Default)]
    struct Beta;

    impl Fixture for Beta {
        fn describe(builder: &mut FixtureBuilder<Self>) {
            builder.method("test_three", |_f: &mut Self, _t: &mut TestContext| {});
        }
    }

    #[test]
    fn test_registration_preserves_order() {
        let mut registry = Registry::new();
        registry.register::<Beta>().unwrap().register::<Alpha>().unwrap();

        let names: Vec<_> = registry.fixtures().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
        assert_eq!(format!("{registry:?}"), r#"["Beta", "Alpha"]"#);
    }

    #[test]
    fn test_same_fixture_registers_twice() {
        let mut registry = Registry::new();
        registry.register::<Alpha>().unwrap();
        registry.register::<Alpha>().unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.fixtures().all(|f| f.case_names() == vec!["one", "two"]));
    }

    #[test]
    fn test_run_case_out_of_range() {
        let mut registry = Registry::new();
        registry.register::<Beta>().unwrap();
        let fixture = registry.fixtures().next().unwrap();
        assert_eq!(fixture.case_count(), 1);
        assert!(fixture.run_case(1, &RunConfig::default()).is_none());
        assert!(fixture.run_case(0, &RunConfig::default()).unwrap().passed());
    }
}
