//! Error types for resource resolution.

use thiserror::Error;

use crate::lookup::ResourceKind;

/// Result type alias for construct operations.
pub type ConstructResult<T> = Result<T, ConstructError>;

/// Errors that can occur while resolving or declaring resources.
#[derive(Error, Debug)]
pub enum ConstructError {
    #[error("Duplicate parameter path: {0}")]
    DuplicatePath(String),

    #[error("Duplicate logical id: {0}")]
    DuplicateLogicalId(String),

    #[error("Imported {kind} not found: {identifier}")]
    ImportLookupNotFound { kind: ResourceKind, identifier: String },

    #[error("Imported {kind} {identifier} is missing attribute '{attribute}'")]
    ImportLookupIncomplete {
        kind: ResourceKind,
        identifier: String,
        attribute: String,
    },

    #[error("Invalid prefix '{0}': only letters, digits, '.', '_' and '-' are allowed")]
    InvalidPrefix(String),

    #[error("Invalid setting: {0}")]
    Settings(#[from] ghost_conf::ConfError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
