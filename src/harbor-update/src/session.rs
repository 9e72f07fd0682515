//! Update session - drives one full update pass over the host's modules.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use harbor_modules::{ModuleHandle, ModuleHost};
use tokio_util::sync::CancellationToken;

use crate::api::{RegistryClient, RegistryEntry};
use crate::audit::AuditLog;
use crate::config::UpdateConfig;
use crate::download::Fetcher;
use crate::error::{UpdateError, UpdateResult};
use crate::swap::SwapCoordinator;
use crate::version::{OpaqueComparator, VersionComparator};

/// Terminal status of one module's update attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Installed version matches the registry.
    UpToDate,
    /// Excluded by configuration; registry state not consulted.
    Excluded,
    /// The registry does not track this module.
    NotFoundInRegistry,
    /// Resolving or transferring the artifact failed.
    DownloadFailed,
    /// The artifact arrived but failed integrity verification.
    VerificationFailed,
    /// The disable/replace/activate sequence failed; the original module
    /// remains in place.
    SwapFailed,
    /// The swap failed and the rollback failed too; operator intervention
    /// is needed.
    RollbackFailed,
    /// The module was replaced and the new version is enabled.
    Updated { from: String, to: String },
}

impl UpdateStatus {
    /// Whether this status represents a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::DownloadFailed | Self::VerificationFailed | Self::SwapFailed | Self::RollbackFailed
        )
    }
}

impl std::fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpToDate => write!(f, "up-to-date"),
            Self::Excluded => write!(f, "excluded"),
            Self::NotFoundInRegistry => write!(f, "not-found-in-registry"),
            Self::DownloadFailed => write!(f, "download-failed"),
            Self::VerificationFailed => write!(f, "verification-failed"),
            Self::SwapFailed => write!(f, "swap-failed"),
            Self::RollbackFailed => write!(f, "rollback-failed"),
            Self::Updated { from, to } => write!(f, "updated ({from} -> {to})"),
        }
    }
}

/// Outcome of one module's update attempt.
#[derive(Debug, Clone)]
pub struct ModuleOutcome {
    /// Module name.
    pub module: String,
    /// Terminal status.
    pub status: UpdateStatus,
}

/// Drives one update pass: catalog fetch, per-module decision, download,
/// swap, audit.
///
/// Modules are processed by a bounded worker pool; failures are isolated so
/// one module can never keep the rest from being processed. All inputs are
/// fixed at construction.
pub struct UpdateSession {
    config: UpdateConfig,
    host: Arc<dyn ModuleHost>,
    client: RegistryClient,
    comparator: Arc<dyn VersionComparator>,
    swaps: SwapCoordinator,
    audit: AuditLog,
    cancel: CancellationToken,
}

impl UpdateSession {
    /// Create a session over `host` with the given configuration.
    pub fn new(config: UpdateConfig, host: Arc<dyn ModuleHost>) -> Self {
        let client = RegistryClient::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        );
        let audit = AuditLog::new(config.audit_log_path.clone());

        Self {
            config,
            host,
            client,
            comparator: Arc::new(OpaqueComparator),
            swaps: SwapCoordinator::new(),
            audit,
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the version comparison policy.
    pub fn with_comparator(mut self, comparator: Arc<dyn VersionComparator>) -> Self {
        self.comparator = comparator;
        self
    }

    /// Share a swap coordinator with other sessions.
    ///
    /// Sessions holding clones of one coordinator serialize their swaps per
    /// artifact path against each other.
    pub fn with_swap_coordinator(mut self, swaps: SwapCoordinator) -> Self {
        self.swaps = swaps;
        self
    }

    /// Token that stops the session issuing new module updates when
    /// cancelled. In-flight work still runs to a safe terminal state.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one update pass over all loaded modules.
    ///
    /// Returns `Err` only when the catalog itself cannot be fetched; every
    /// per-module condition is reported as that module's outcome.
    pub async fn run(&self) -> UpdateResult<Vec<ModuleOutcome>> {
        tracing::info!(registry = %self.client.base_url(), "checking for module updates");

        let catalog = self.client.fetch_catalog().await?;
        let modules = self.host.modules().await?;

        let outcomes: Vec<ModuleOutcome> = futures::stream::iter(
            modules
                .into_iter()
                .map(|module| self.process_module(module, &catalog)),
        )
        .buffer_unordered(self.config.max_concurrent.max(1))
        .filter_map(|outcome| async move { outcome })
        .collect()
        .await;

        let updated = outcomes
            .iter()
            .filter(|o| matches!(o.status, UpdateStatus::Updated { .. }))
            .count();
        let failed = outcomes.iter().filter(|o| o.status.is_failure()).count();
        tracing::info!(
            checked = outcomes.len(),
            updated,
            failed,
            "update session finished"
        );

        Ok(outcomes)
    }

    /// Process one module to a terminal outcome.
    ///
    /// Returns `None` when the session was cancelled before this module
    /// started.
    async fn process_module(
        &self,
        module: ModuleHandle,
        catalog: &HashMap<String, RegistryEntry>,
    ) -> Option<ModuleOutcome> {
        if self.cancel.is_cancelled() {
            tracing::info!(module = %module.name(), "session cancelled, not starting update");
            return None;
        }

        let name = module.name().to_string();

        if self.config.is_excluded(&name) {
            tracing::info!(module = %name, "excluded from update checks");
            return Some(ModuleOutcome {
                module: name,
                status: UpdateStatus::Excluded,
            });
        }

        let Some(entry) = catalog.get(&name) else {
            tracing::warn!(module = %name, "not found in registry");
            return Some(ModuleOutcome {
                module: name,
                status: UpdateStatus::NotFoundInRegistry,
            });
        };

        let installed = module.version().to_string();
        if !self.comparator.needs_update(&installed, &entry.version) {
            tracing::info!(module = %name, version = %installed, "up to date");
            return Some(ModuleOutcome {
                module: name,
                status: UpdateStatus::UpToDate,
            });
        }

        tracing::info!(
            module = %name,
            from = %installed,
            to = %entry.version,
            "updating module"
        );
        let status = self.apply_update(&module, entry, &installed).await;
        Some(ModuleOutcome {
            module: name,
            status,
        })
    }

    /// Download, verify and swap one module known to be outdated.
    async fn apply_update(
        &self,
        module: &ModuleHandle,
        entry: &RegistryEntry,
        installed: &str,
    ) -> UpdateStatus {
        let name = module.name();

        let descriptor = match self.client.fetch_descriptor(entry).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::warn!(module = %name, error = %e, "failed to resolve update detail");
                return UpdateStatus::DownloadFailed;
            }
        };

        let fetcher =
            match Fetcher::new(Duration::from_secs(self.config.download_timeout_secs)) {
                Ok(fetcher) => fetcher,
                Err(e) => {
                    tracing::warn!(module = %name, error = %e, "failed to create staging area");
                    return UpdateStatus::DownloadFailed;
                }
            };

        let staged = match fetcher.fetch(&descriptor).await {
            Ok(staged) => staged,
            Err(e) if e.is_verification_error() => {
                tracing::warn!(module = %name, error = %e, "downloaded artifact failed verification");
                return UpdateStatus::VerificationFailed;
            }
            Err(e) => {
                tracing::warn!(module = %name, error = %e, "failed to download update");
                return UpdateStatus::DownloadFailed;
            }
        };

        match self.swaps.swap(self.host.as_ref(), module, staged).await {
            Ok(()) => {
                if let Err(e) = self
                    .audit
                    .record_update(name, installed, &entry.version)
                    .await
                {
                    tracing::warn!(module = %name, error = %e, "failed to append audit record");
                }
                tracing::info!(module = %name, version = %entry.version, "module updated");
                UpdateStatus::Updated {
                    from: installed.to_string(),
                    to: entry.version.clone(),
                }
            }
            Err(e @ UpdateError::RollbackFailed { .. }) => {
                tracing::error!(
                    module = %name,
                    error = %e,
                    "rollback failed, module may require manual recovery"
                );
                UpdateStatus::RollbackFailed
            }
            Err(e) => {
                tracing::warn!(module = %name, error = %e, "failed to swap module");
                UpdateStatus::SwapFailed
            }
        }
    }
}
