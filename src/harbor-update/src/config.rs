//! Update configuration.
//!
//! Loaded once at host startup and treated as immutable session input; there
//! is no process-wide mutable configuration state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::DEFAULT_REGISTRY_URL;
use crate::http::{DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};

/// Configuration for an update session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Registry base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Module names excluded from update checks. Matched case-sensitively
    /// against the module's declared name.
    #[serde(default)]
    pub excluded_modules: Vec<String>,

    /// Path of the append-only audit log.
    #[serde(default = "default_audit_log_path")]
    pub audit_log_path: PathBuf,

    /// Timeout for registry metadata requests, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for artifact downloads, in seconds.
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// Maximum number of modules processed concurrently.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_base_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("update.log")
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_download_timeout() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT.as_secs()
}

fn default_max_concurrent() -> usize {
    4
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            excluded_modules: Vec::new(),
            audit_log_path: default_audit_log_path(),
            request_timeout_secs: default_request_timeout(),
            download_timeout_secs: default_download_timeout(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl UpdateConfig {
    /// Load configuration from a JSON file, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        if let Ok(content) = std::fs::read_to_string(path) {
            if let Ok(config) = serde_json::from_str(&content) {
                return config;
            }
            tracing::warn!(path = %path.display(), "ignoring unparseable update config");
        }

        Self::default()
    }

    /// Check if a module is excluded from update checks.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_modules.iter().any(|m| m == name)
    }
}
