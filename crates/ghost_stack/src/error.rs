//! Error types for composition.

use thiserror::Error;

/// Result type alias for composition operations.
pub type StackResult<T> = Result<T, StackError>;

/// Errors that can occur while ordering or composing units.
#[derive(Error, Debug)]
pub enum StackError {
    #[error("Dependency cycle: {chain}")]
    DependencyCycle { chain: String },

    #[error("Unit '{unit}' depends on unknown unit '{dependency}'")]
    UnknownUnit { unit: String, dependency: String },

    #[error("Unit registered twice: {0}")]
    DuplicateUnit(String),

    #[error("Unit '{unit}' has no data dependency on '{dependency}'")]
    MissingOutput { unit: String, dependency: String },

    #[error("Output of '{dependency}' is not a {expected}")]
    UnexpectedOutput {
        dependency: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Construct(#[from] ghost_constructs::ConstructError),
}
