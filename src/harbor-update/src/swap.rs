//! Hot-swap sequencing with rollback.
//!
//! A swap walks one module through disable → replace-file → load → enable.
//! The canonical artifact path is mutated by exactly one rename, and the
//! original bytes stay recoverable in a sibling backup until the new module
//! has actually enabled. Swaps against the same artifact path are serialized
//! through a per-path lock; concurrent attempts queue rather than interleave.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use harbor_modules::{ModuleHandle, ModuleHost};
use tokio::sync::Mutex;

use crate::download::StagedArtifact;
use crate::error::{UpdateError, UpdateResult};

/// Phases of a single swap, in order. Each phase is gated on the previous
/// one succeeding; failures before the file replacement leave the disk
/// untouched, failures after it roll back from the preserved backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPhase {
    /// Stopping the running module so its artifact file is released.
    Disabling,
    /// Moving the staged artifact next to the canonical path.
    Staging,
    /// The single atomic rename over the canonical path.
    Replacing,
    /// Loading a module from the updated artifact.
    Loading,
    /// Enabling the freshly loaded module.
    Enabling,
}

impl std::fmt::Display for SwapPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabling => write!(f, "disabling"),
            Self::Staging => write!(f, "staging"),
            Self::Replacing => write!(f, "replacing"),
            Self::Loading => write!(f, "loading"),
            Self::Enabling => write!(f, "enabling"),
        }
    }
}

/// Serializes and executes artifact swaps.
///
/// Clones share the same per-path lock table, so every session holding a
/// clone of one coordinator is serialized against the others.
#[derive(Clone, Default)]
pub struct SwapCoordinator {
    locks: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl SwapCoordinator {
    /// Create a coordinator with an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    fn path_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        self.locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Replace `module`'s artifact with `staged` and activate the result.
    ///
    /// On any failure the module system is left in a terminal state: either
    /// the old module still enabled with its old artifact, or (only if the
    /// rollback itself fails) a [`UpdateError::RollbackFailed`] describing
    /// what needs operator attention.
    pub async fn swap(
        &self,
        host: &dyn ModuleHost,
        module: &ModuleHandle,
        staged: StagedArtifact,
    ) -> UpdateResult<()> {
        let canonical = module.artifact_path().to_path_buf();
        let lock = self.path_lock(&canonical);
        let _guard = lock.lock().await;

        let name = module.name().to_string();
        let mut phase = SwapPhase::Disabling;
        tracing::debug!(module = %name, %phase, "starting swap");

        // Disable before touching the file so the loader releases its handle.
        // The staged artifact is still armed here and cleans itself up.
        if let Err(e) = host.disable(module).await {
            self.reenable(host, module).await;
            return Err(UpdateError::DisableFailed {
                module: name,
                message: e.to_string(),
            });
        }

        phase = SwapPhase::Staging;
        tracing::debug!(module = %name, %phase, "staging replacement artifact");

        // Stage the replacement next to the canonical file so the final
        // rename stays on one filesystem.
        let staged_path = staged.into_path();
        let incoming = sibling(&canonical, "incoming");
        if let Err(e) = move_file(&staged_path, &incoming).await {
            let _ = tokio::fs::remove_file(&staged_path).await;
            let _ = tokio::fs::remove_file(&incoming).await;
            self.reenable(host, module).await;
            return Err(UpdateError::SwapFailed {
                module: name,
                message: format!("staging replacement: {e}"),
            });
        }

        // Keep the original bytes recoverable until the new module enables.
        let backup = sibling(&canonical, "orig");
        if let Err(e) = tokio::fs::copy(&canonical, &backup).await {
            let _ = tokio::fs::remove_file(&incoming).await;
            self.reenable(host, module).await;
            return Err(UpdateError::SwapFailed {
                module: name,
                message: format!("preserving original artifact: {e}"),
            });
        }

        phase = SwapPhase::Replacing;
        tracing::debug!(module = %name, %phase, "replacing artifact");

        // The single observable mutation of the canonical path.
        if let Err(e) = tokio::fs::rename(&incoming, &canonical).await {
            let _ = tokio::fs::remove_file(&incoming).await;
            let _ = tokio::fs::remove_file(&backup).await;
            self.reenable(host, module).await;
            return Err(UpdateError::SwapFailed {
                module: name,
                message: format!("replacing artifact: {e}"),
            });
        }

        match activate(host, &name, &canonical, &mut phase).await {
            Ok(()) => {
                let _ = tokio::fs::remove_file(&backup).await;
                tracing::debug!(module = %name, "swap complete");
                Ok(())
            }
            Err(activate_err) => {
                tracing::warn!(
                    module = %name,
                    %phase,
                    error = %activate_err,
                    "updated module failed to activate, rolling back"
                );
                rollback(host, &name, &canonical, &backup).await?;
                Err(activate_err)
            }
        }
    }

    async fn reenable(&self, host: &dyn ModuleHost, module: &ModuleHandle) {
        if let Err(e) = host.enable(module).await {
            tracing::warn!(
                module = %module.name(),
                error = %e,
                "could not re-enable module after aborted swap"
            );
        }
    }
}

/// Load and enable a module from `path`.
async fn activate(
    host: &dyn ModuleHost,
    name: &str,
    path: &Path,
    phase: &mut SwapPhase,
) -> UpdateResult<()> {
    *phase = SwapPhase::Loading;
    tracing::debug!(module = %name, %phase, "loading updated artifact");
    let loaded = host.load(path).await.map_err(|e| UpdateError::EnableFailed {
        module: name.to_string(),
        message: e.to_string(),
    })?;

    *phase = SwapPhase::Enabling;
    tracing::debug!(module = %name, %phase, "enabling updated module");
    host.enable(&loaded)
        .await
        .map_err(|e| UpdateError::EnableFailed {
            module: name.to_string(),
            message: e.to_string(),
        })
}

/// Restore the preserved original artifact and bring the old module back.
async fn rollback(
    host: &dyn ModuleHost,
    name: &str,
    canonical: &Path,
    backup: &Path,
) -> UpdateResult<()> {
    if let Err(e) = tokio::fs::rename(backup, canonical).await {
        return Err(UpdateError::RollbackFailed {
            module: name.to_string(),
            message: format!("restoring original artifact: {e}"),
        });
    }

    let mut phase = SwapPhase::Loading;
    activate(host, name, canonical, &mut phase)
        .await
        .map_err(|e| UpdateError::RollbackFailed {
            module: name.to_string(),
            message: format!("re-activating original module: {e}"),
        })
}

/// Build a sibling path by appending a dotted suffix to the file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    match path.file_name() {
        Some(name) => {
            let mut file = name.to_os_string();
            file.push(format!(".{suffix}"));
            path.with_file_name(file)
        }
        None => path.with_file_name(format!("artifact.{suffix}")),
    }
}

/// Move a file, falling back to copy+remove for cross-device moves.
async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to).await?;
    tokio::fs::remove_file(from).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_phase_display() {
        assert_eq!(SwapPhase::Disabling.to_string(), "disabling");
        assert_eq!(SwapPhase::Enabling.to_string(), "enabling");
    }

    #[test]
    fn test_sibling_appends_suffix() {
        let path = Path::new("/opt/harbor/modules/chat-bridge.hmod");
        assert_eq!(
            sibling(path, "incoming"),
            Path::new("/opt/harbor/modules/chat-bridge.hmod.incoming")
        );
        assert_eq!(
            sibling(path, "orig"),
            Path::new("/opt/harbor/modules/chat-bridge.hmod.orig")
        );
    }

    #[tokio::test]
    async fn test_move_file_same_directory() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.bin");
        let to = dir.path().join("b.bin");
        std::fs::write(&from, b"payload").unwrap();

        move_file(&from, &to).await.unwrap();
        assert!(!from.exists());
        assert_eq!(std::fs::read(&to).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_path_lock_is_shared_per_path() {
        let coordinator = SwapCoordinator::new();
        let path = Path::new("/opt/harbor/modules/chat-bridge.hmod");

        let first = coordinator.path_lock(path);
        let second = coordinator.path_lock(path);
        assert!(Arc::ptr_eq(&first, &second));

        let other = coordinator.path_lock(Path::new("/opt/harbor/modules/other.hmod"));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[tokio::test]
    async fn test_clones_share_lock_table() {
        let coordinator = SwapCoordinator::new();
        let clone = coordinator.clone();
        let path = Path::new("/opt/harbor/modules/chat-bridge.hmod");

        let first = coordinator.path_lock(path);
        let second = clone.path_lock(path);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
