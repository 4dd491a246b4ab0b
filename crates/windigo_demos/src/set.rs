//! A set of unique, unordered integers.

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntSet {
    values: HashSet<i64>,
}

impl IntSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Insert `value`. Returns true if it was not already present.
    pub fn insert(&mut self, value: i64) -> bool {
        self.values.insert(value)
    }

    pub fn contains(&self, value: i64) -> bool {
        self.values.contains(&value)
    }
}
