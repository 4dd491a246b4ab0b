//! Small data-structure packages used as clients of the windigo fixture engine.
//!
//! - `employees`: a keyed collection of salaries
//! - `set`: a deduplicating integer container

pub mod employees;
pub mod set;

pub use employees::{EmployeeError, Employees};
pub use set::IntSet;
