//! Employee salaries keyed by name.
//!
//! Names are assumed to be unique.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmployeeError {
    #[error("employee {name:?} already exists")]
    AlreadyExists { name: String },

    #[error("employee {name:?} doesn't exist")]
    NoSuchEmployee { name: String },
}

/// Names and salaries of employees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Employees {
    salaries: HashMap<String, i64>,
}

impl Employees {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new employee. Fails with `AlreadyExists` if the name is taken.
    pub fn add(&mut self, name: impl Into<String>, salary: i64) -> Result<(), EmployeeError> {
        let name = name.into();
        if self.salaries.contains_key(&name) {
            return Err(EmployeeError::AlreadyExists { name });
        }
        self.salaries.insert(name, salary);
        Ok(())
    }

    /// Update the salary of an existing employee. Fails with `NoSuchEmployee` if there is none.
    pub fn update(&mut self, name: &str, salary: i64) -> Result<(), EmployeeError> {
        match self.salaries.get_mut(name) {
            Some(current) => {
                *current = salary;
                Ok(())
            }
            None => Err(EmployeeError::NoSuchEmployee { name: name.to_string() }),
        }
    }

    /// All names in lexicographic order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.salaries.keys().cloned().collect();
        names.sort();
        names
    }

    /// A copy of every name and salary.
    pub fn salaries(&self) -> HashMap<String, i64> {
        self.salaries.clone()
    }

    pub fn len(&self) -> usize {
        self.salaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.salaries.is_empty()
    }
}
