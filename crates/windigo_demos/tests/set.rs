//! Fixture suite for `IntSet`, run by the windigo engine.

use windigo::{Fixture, RegistrationError, Registry, Runner, TestContext, fixture_methods};
use windigo_demos::IntSet;

#[derive(Default, Fixture)]
struct EmptySetFixture {
    set: IntSet,
}

#[fixture_methods]
impl EmptySetFixture {
    fn test_len_returns_zero(&self, t: &mut TestContext) {
        t.expect_equal(self.set.len(), 0);
    }

    fn test_insert_succeeds(&mut self, t: &mut TestContext) {
        for i in 0..100 {
            t.expect_true(self.set.insert(i));
        }
    }

    fn test_contains_nothing(&self, t: &mut TestContext) {
        for i in 0..100 {
            t.expect_false(self.set.contains(i));
        }
    }

    fn test_contains_inserted_elements(&mut self, t: &mut TestContext) {
        for i in 0..100 {
            t.expect_false(self.set.contains(i));
            t.expect_true(self.set.insert(i));
            t.expect_true(self.set.contains(i));
        }
    }
}

#[derive(Default, Fixture)]
struct PopulatedSetFixture {
    set: IntSet,
}

#[fixture_methods]
impl PopulatedSetFixture {
    fn setup(&mut self, t: &mut TestContext) {
        for i in 0..1000 {
            t.assert_true(self.set.insert(i));
        }
    }

    fn test_contains_all_elements(&self, t: &mut TestContext) {
        for i in 0..1000 {
            t.expect_true(self.set.contains(i));
        }
    }
}

/// A populated set plus an independent copy taken after the embedded setup ran.
#[derive(Default, Fixture)]
struct ClonedSetFixture {
    #[fixture(embed)]
    populated: PopulatedSetFixture,
    copy: IntSet,
}

#[fixture_methods]
impl ClonedSetFixture {
    fn setup(&mut self, t: &mut TestContext) {
        t.assert_equal(self.populated.set.len(), 1000);
        self.copy = self.populated.set.clone();
    }

    fn test_clone_is_equal(&self, t: &mut TestContext) {
        t.expect_equal(&self.copy, &self.populated.set);
    }

    fn test_clone_is_independent(&mut self, t: &mut TestContext) {
        t.assert_true(self.copy.insert(-1));
        t.expect_false(self.populated.set.contains(-1));
        t.expect_equal(self.copy.len(), self.populated.set.len() + 1);
    }
}

fn main() -> Result<(), RegistrationError> {
    let mut registry = Registry::new();
    registry
        .register::<EmptySetFixture>()?
        .register::<PopulatedSetFixture>()?
        .register::<ClonedSetFixture>()?;
    Runner::new(registry).run_all()
}
