//! Error types for settings loading.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfResult<T> = Result<T, ConfError>;

/// Errors that can occur while loading or interpreting settings.
#[derive(Error, Debug)]
pub enum ConfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid override in layer '{layer}': {message}")]
    InvalidOverride { layer: String, message: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
