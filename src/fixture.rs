//! Fixture descriptors and the builder that composes them.
//!
//! A fixture is a `Default` value bundling per-case state with its own `setup`, `tear_down` and `test_*` actions.
//! [`FixtureBuilder`] turns a fixture type into an immutable [`FixtureDescriptor`]:
//!
//! - Actions are classified by name: `setup`, `tear_down`, and any name starting with `test_` (the case name is the
//!   remainder). Other names are ignored.
//! - Embedded fixtures are described recursively and their setup/tear_down steps are rebound through a field
//!   projection, so they mutate the embedded field of the outer instance in place.
//!
//! For a fixture embedding `F1` then `F2` with its own setup and tear_down:
//!
//! ```text
//! setup_chain    = F1.setup_chain ++ F2.setup_chain ++ [own setup]
//! teardown_chain = [own tear_down] ++ F2.teardown_chain ++ F1.teardown_chain
//! ```
//!
//! Embedded fixtures contribute only setup/tear_down steps; their test cases are not promoted.

use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use crate::context::TestContext;
use crate::errors::{RegistrationError, RegistrationResult};

/// Name of a fixture's own setup action.
pub const SETUP: &str = "setup";
/// Name of a fixture's own tear_down action.
pub const TEAR_DOWN: &str = "tear_down";
/// Case-sensitive prefix marking a test case action.
pub const TEST_PREFIX: &str = "test_";

/// An action run against a fixture instance.
pub type Action<F> = Arc<dyn Fn(&mut F, &mut TestContext) + Send + Sync>;

/// A fixture type.
///
/// Usually derived with `#[derive(Fixture)]` together with `#[fixture_methods]`. A manual implementation registers
/// its actions and embedded fixtures on the builder:
///
/// ```ignore
/// impl Fixture for CounterFixture {
///     fn describe(builder: &mut FixtureBuilder<Self>) {
///         builder
///             .embed(|f: &mut Self| &mut f.base)
///             .method("setup", |f: &mut Self, t: &mut TestContext| f.count = 1)
///             .method("test_count", |f: &mut Self, t: &mut TestContext| {
///                 t.expect_equal(f.count, 1);
///             });
///     }
/// }
/// ```
pub trait Fixture: Default + Send + 'static {
    /// Register this fixture's actions and embedded fixtures.
    fn describe(builder: &mut FixtureBuilder<Self>);

    /// Name used in reports. Defaults to the unqualified type name.
    fn fixture_name() -> String {
        short_type_name(type_name::<Self>())
    }
}

/// Registers a fixture's own actions. Implemented by `#[fixture_methods]`.
pub trait FixtureMethods: Fixture {
    fn methods(builder: &mut FixtureBuilder<Self>);
}

/// What an action name means under the naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind<'a> {
    Setup,
    TearDown,
    /// A test case with the given (prefix-stripped) name.
    Test(&'a str),
    Other,
}

/// Classify an action name.
pub fn classify(name: &str) -> MethodKind<'_> {
    match name {
        SETUP => MethodKind::Setup,
        TEAR_DOWN => MethodKind::TearDown,
        _ => match name.strip_prefix(TEST_PREFIX) {
            Some(case) => MethodKind::Test(case),
            None => MethodKind::Other,
        },
    }
}

/// `my_crate::tests::SetFixture<u8>` -> `SetFixture`.
pub(crate) fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

// ============================================================================
// Descriptor pieces
// ============================================================================

/// One setup or tear_down step, bound to the outer fixture type.
pub struct Step<F> {
    owner: String,
    action: Action<F>,
}

impl<F> Step<F> {
    /// Name of the fixture that declared this step.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn run(&self, fixture: &mut F, t: &mut TestContext) {
        (self.action)(fixture, t)
    }
}

impl<P: 'static> Step<P> {
    /// Rebind this step to an outer fixture through a field projection.
    fn project<F, G>(self, projection: Arc<G>) -> Step<F>
    where
        F: 'static,
        G: Fn(&mut F) -> &mut P + Send + Sync + 'static,
    {
        let action = self.action;
        Step {
            owner: self.owner,
            action: Arc::new(move |fixture: &mut F, t: &mut TestContext| action(projection(fixture), t)),
        }
    }
}

impl<F> Clone for Step<F> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            action: Arc::clone(&self.action),
        }
    }
}

impl<F> fmt::Debug for Step<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("owner", &self.owner).finish_non_exhaustive()
    }
}

/// A named test case.
pub struct TestCase<F> {
    name: String,
    action: Action<F>,
}

impl<F> TestCase<F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self, fixture: &mut F, t: &mut TestContext) {
        (self.action)(fixture, t)
    }
}

impl<F> fmt::Debug for TestCase<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Compiled, immutable description of one fixture type.
pub struct FixtureDescriptor<F> {
    name: String,
    setup_chain: Vec<Step<F>>,
    teardown_chain: Vec<Step<F>>,
    test_cases: Vec<TestCase<F>>,
}

impl<F: Fixture> FixtureDescriptor<F> {
    /// Describe `F`, resolving embedded fixtures recursively.
    pub fn build() -> RegistrationResult<Self> {
        FixtureBuilder::<F>::describe(Vec::new())
    }

    /// A fresh, default-initialized instance.
    pub fn instantiate(&self) -> F {
        F::default()
    }
}

impl<F> FixtureDescriptor<F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Setup steps in execution order.
    pub fn setup_chain(&self) -> &[Step<F>] {
        &self.setup_chain
    }

    /// Tear_down steps in execution order.
    pub fn teardown_chain(&self) -> &[Step<F>] {
        &self.teardown_chain
    }

    pub fn test_cases(&self) -> &[TestCase<F>] {
        &self.test_cases
    }

    pub fn setup_owners(&self) -> Vec<&str> {
        self.setup_chain.iter().map(Step::owner).collect()
    }

    pub fn teardown_owners(&self) -> Vec<&str> {
        self.teardown_chain.iter().map(Step::owner).collect()
    }
}

impl<F> fmt::Debug for FixtureDescriptor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureDescriptor")
            .field("name", &self.name)
            .field("setup_chain", &self.setup_owners())
            .field("teardown_chain", &self.teardown_owners())
            .field("test_cases", &self.test_cases.iter().map(TestCase::name).collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects a fixture's actions and embedded fixtures while it is being described.
///
/// Errors are held until the description finishes, so `describe` implementations can chain calls freely. After the
/// first error all further registrations are ignored.
pub struct FixtureBuilder<F> {
    name: String,
    /// Fixture types currently being described, outermost first, ending with `F`.
    lineage: Vec<TypeId>,
    /// Setup steps of embedded fixtures, in declaration order.
    inherited_setup: Vec<Step<F>>,
    /// Tear_down chains of embedded fixtures, one per embedding, in declaration order.
    inherited_teardown: Vec<Vec<Step<F>>>,
    setup: Option<Step<F>>,
    tear_down: Option<Step<F>>,
    test_cases: Vec<TestCase<F>>,
    error: Option<RegistrationError>,
}

impl<F: Fixture> FixtureBuilder<F> {
    fn describe(mut lineage: Vec<TypeId>) -> RegistrationResult<FixtureDescriptor<F>> {
        lineage.push(TypeId::of::<F>());
        let mut builder = Self {
            name: F::fixture_name(),
            lineage,
            inherited_setup: Vec::new(),
            inherited_teardown: Vec::new(),
            setup: None,
            tear_down: None,
            test_cases: Vec::new(),
            error: None,
        };
        F::describe(&mut builder);
        builder.finish()
    }

    /// Register an action under `name`, classified by [`classify`].
    pub fn method<A>(&mut self, name: &str, action: A) -> &mut Self
    where
        A: Fn(&mut F, &mut TestContext) + Send + Sync + 'static,
    {
        if self.error.is_some() {
            return self;
        }
        let action: Action<F> = Arc::new(action);
        match classify(name) {
            MethodKind::Setup => {
                if self.setup.is_some() {
                    self.reject(RegistrationError::DuplicateSetup {
                        fixture: self.name.clone(),
                    });
                } else {
                    self.setup = Some(self.own_step(action));
                }
            }
            MethodKind::TearDown => {
                if self.tear_down.is_some() {
                    self.reject(RegistrationError::DuplicateTearDown {
                        fixture: self.name.clone(),
                    });
                } else {
                    self.tear_down = Some(self.own_step(action));
                }
            }
            MethodKind::Test("") => {
                self.reject(RegistrationError::UnnamedTestCase {
                    fixture: self.name.clone(),
                });
            }
            MethodKind::Test(case) => {
                if self.test_cases.iter().any(|existing| existing.name == case) {
                    self.reject(RegistrationError::DuplicateTestCase {
                        fixture: self.name.clone(),
                        case: case.to_string(),
                    });
                } else {
                    self.test_cases.push(TestCase {
                        name: case.to_string(),
                        action,
                    });
                }
            }
            MethodKind::Other => {
                tracing::debug!(fixture = %self.name, method = name, "ignoring method outside the naming convention");
            }
        }
        self
    }

    /// Embed fixture `P`, stored in the field reached through `projection`.
    ///
    /// `P`'s setup and tear_down steps run against that field of the outer instance. Embeddings compose in call
    /// order.
    pub fn embed<P, G>(&mut self, projection: G) -> &mut Self
    where
        P: Fixture,
        G: Fn(&mut F) -> &mut P + Send + Sync + 'static,
    {
        if self.error.is_some() {
            return self;
        }
        if self.lineage.contains(&TypeId::of::<P>()) {
            self.reject(RegistrationError::EmbeddingCycle {
                fixture: self.name.clone(),
                embedded: P::fixture_name(),
            });
            return self;
        }
        let embedded = match FixtureBuilder::<P>::describe(self.lineage.clone()) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                self.reject(err);
                return self;
            }
        };

        let projection = Arc::new(projection);
        self.inherited_setup.extend(
            embedded
                .setup_chain
                .into_iter()
                .map(|step| step.project(Arc::clone(&projection))),
        );
        self.inherited_teardown.push(
            embedded
                .teardown_chain
                .into_iter()
                .map(|step| step.project(Arc::clone(&projection)))
                .collect(),
        );
        self
    }

    fn own_step(&self, action: Action<F>) -> Step<F> {
        Step {
            owner: self.name.clone(),
            action,
        }
    }

    fn reject(&mut self, err: RegistrationError) {
        tracing::debug!(fixture = %self.name, error = %err, "fixture rejected");
        self.error.get_or_insert(err);
    }

    fn finish(self) -> RegistrationResult<FixtureDescriptor<F>> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut setup_chain = self.inherited_setup;
        setup_chain.extend(self.setup);

        let mut teardown_chain: Vec<Step<F>> = self.tear_down.into_iter().collect();
        for chain in self.inherited_teardown.into_iter().rev() {
            teardown_chain.extend(chain);
        }

        Ok(FixtureDescriptor {
            name: self.name,
            setup_chain,
            teardown_chain,
            test_cases: self.test_cases,
        })
    }
}
