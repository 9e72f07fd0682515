//! Host module-manager error types.

use thiserror::Error;

/// Errors reported by a host module manager.
#[derive(Error, Debug)]
pub enum HostError {
    /// No loaded module with the given name.
    #[error("Module not found: {0}")]
    NotFound(String),

    /// Loading an artifact from disk failed.
    #[error("Failed to load module from '{path}': {message}")]
    LoadError { path: String, message: String },

    /// Enabling a loaded module failed.
    #[error("Failed to enable module '{module}': {message}")]
    EnableError { module: String, message: String },

    /// Disabling a running module failed.
    #[error("Failed to disable module '{module}': {message}")]
    DisableError { module: String, message: String },

    /// The module is not in the state the operation requires.
    #[error("Invalid module state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostError {
    /// Create a load error.
    pub fn load_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LoadError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an enable error.
    pub fn enable_error(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EnableError {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Create a disable error.
    pub fn disable_error(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DisableError {
            module: module.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
