//! Core module types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identity of a loaded module as declared by the module itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Module name, unique within the host.
    pub name: String,

    /// Installed version string. Registry-defined ordering; not guaranteed
    /// to be semver-comparable.
    pub version: String,

    /// On-disk location of the artifact this module was loaded from.
    pub artifact_path: PathBuf,
}

/// Runtime state of a module as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// Loaded and actively running.
    Enabled,
    /// Loaded but with its behavior stopped.
    Disabled,
}

impl std::fmt::Display for ModuleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// A cheap clonable handle to a loaded module.
#[derive(Debug, Clone)]
pub struct ModuleHandle {
    info: Arc<ModuleInfo>,
}

impl ModuleHandle {
    /// Create a handle for a module the host has loaded.
    pub fn new(info: ModuleInfo) -> Self {
        Self {
            info: Arc::new(info),
        }
    }

    /// Get the module's declared identity.
    pub fn info(&self) -> &ModuleInfo {
        &self.info
    }

    /// Get the module name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Get the installed version string.
    pub fn version(&self) -> &str {
        &self.info.version
    }

    /// Get the on-disk artifact path the module was loaded from.
    pub fn artifact_path(&self) -> &Path {
        &self.info.artifact_path
    }
}
