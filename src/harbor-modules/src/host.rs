//! The host module-manager capability trait.

use std::path::Path;

use crate::error::Result;
use crate::module::ModuleHandle;

/// Lifecycle operations the host process exposes over its loaded modules.
///
/// The host owns all module state; callers never touch artifact contents
/// directly. Implementations must be safe to call from concurrent tasks.
///
/// Contract notes:
/// - `disable` stops a module's active behavior and releases any locks the
///   host holds on the module's artifact file (open handles from a loader),
///   so the file can be replaced on disk afterwards.
/// - `load` reads an artifact from `path` and produces a fresh handle without
///   enabling it. If a module from the same path is already loaded, the host
///   replaces that instance.
#[async_trait::async_trait]
pub trait ModuleHost: Send + Sync {
    /// Enumerate currently loaded modules with their declared identity.
    async fn modules(&self) -> Result<Vec<ModuleHandle>>;

    /// Stop a module's active behavior, keeping it loaded.
    async fn disable(&self, module: &ModuleHandle) -> Result<()>;

    /// Resume a disabled module's behavior.
    async fn enable(&self, module: &ModuleHandle) -> Result<()>;

    /// Load a module from an artifact path without enabling it.
    async fn load(&self, path: &Path) -> Result<ModuleHandle>;
}
