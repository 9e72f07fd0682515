//! Error types for harbor-update.

use thiserror::Error;

/// Result type for update operations.
pub type UpdateResult<T> = std::result::Result<T, UpdateError>;

/// Errors that can occur during update operations.
///
/// A module missing from the registry catalog is not an error; the session
/// reports it as an outcome instead.
#[derive(Debug, Error)]
pub enum UpdateError {
    // Registry errors
    #[error("Registry unavailable: {message}")]
    RegistryUnavailable { message: String },

    #[error("Malformed registry response: {message}")]
    MalformedRegistryResponse { message: String },

    // Download errors
    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("Incomplete download: expected {expected} bytes, received {received}")]
    IncompleteDownload { expected: u64, received: u64 },

    #[error("SHA256 verification failed: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    // Swap errors
    #[error("Failed to disable module '{module}': {message}")]
    DisableFailed { module: String, message: String },

    #[error("Failed to replace artifact for module '{module}': {message}")]
    SwapFailed { module: String, message: String },

    #[error("Failed to activate updated module '{module}': {message}")]
    EnableFailed { module: String, message: String },

    #[error("Rollback failed for module '{module}': {message}")]
    RollbackFailed { module: String, message: String },

    // Host errors
    #[error("Host error: {0}")]
    Host(#[from] harbor_modules::HostError),

    // File system errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UpdateError {
    /// Create a registry-unavailable error.
    pub fn registry_unavailable(message: impl Into<String>) -> Self {
        Self::RegistryUnavailable {
            message: message.into(),
        }
    }

    /// Create a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRegistryResponse {
            message: message.into(),
        }
    }

    /// Create a download-failed error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Check if this error is a network error.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            Self::RegistryUnavailable { .. } | Self::DownloadFailed { .. }
        )
    }

    /// Check if this error is an artifact integrity failure.
    pub fn is_verification_error(&self) -> bool {
        matches!(
            self,
            Self::IncompleteDownload { .. } | Self::ChecksumMismatch { .. }
        )
    }

    /// Check if this error requires operator intervention.
    ///
    /// Only rollback failures qualify: the module may be left unloaded with
    /// no automatic way back.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RollbackFailed { .. })
    }
}
