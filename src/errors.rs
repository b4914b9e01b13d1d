use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during plugin operations.
#[derive(Error, Debug)]
pub enum PongoError {
    /// The requested plugin directory (or plugins root) does not exist.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Configuration is missing a value or has an unsupported format.
    #[error("config error: {message}")]
    Config { message: String },

    /// Validation could not be carried out for a plugin.
    #[error("harness error: {message}")]
    Harness { message: String },
}

/// Convenience alias for `Result<T, PongoError>`.
pub type Result<T> = std::result::Result<T, PongoError>;
