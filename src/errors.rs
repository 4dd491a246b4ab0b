//! Registration errors.
//!
//! These describe a misconfigured fixture, not a failing test. They surface while a fixture is being described
//! (before any case runs) and are meant to be propagated out of `main` with `?`.

use thiserror::Error;

/// A fixture could not be turned into a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("fixture `{fixture}` declares more than one setup action")]
    DuplicateSetup { fixture: String },

    #[error("fixture `{fixture}` declares more than one tear_down action")]
    DuplicateTearDown { fixture: String },

    #[error("fixture `{fixture}` declares test case `{case}` more than once")]
    DuplicateTestCase { fixture: String, case: String },

    #[error("fixture `{fixture}` declares a test method with an empty case name")]
    UnnamedTestCase { fixture: String },

    #[error("fixture `{fixture}` embeds `{embedded}`, which is already being described")]
    EmbeddingCycle { fixture: String, embedded: String },
}

/// Result type for registration.
pub type RegistrationResult<T> = Result<T, RegistrationError>;
