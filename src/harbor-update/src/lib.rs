//! Harbor Update - module auto-update orchestrator for the Harbor host.
//!
//! Checks a remote registry for newer versions of the host's loaded modules,
//! downloads replacement artifacts into a staging area, and hot-swaps them
//! into the running process with rollback on partial failure. The host's own
//! module lifecycle primitives are consumed through the
//! [`harbor_modules::ModuleHost`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use harbor_update::{UpdateConfig, UpdateSession};
//!
//! let config = UpdateConfig::load(std::path::Path::new("update.json"));
//! let session = UpdateSession::new(config, host);
//!
//! for outcome in session.run().await? {
//!     println!("{}: {}", outcome.module, outcome.status);
//! }
//! ```

mod api;
mod audit;
mod config;
mod download;
mod error;
mod http;
mod session;
mod swap;
mod verify;
mod version;

pub use api::{ArtifactDescriptor, RegistryClient, RegistryEntry};
pub use audit::AuditLog;
pub use config::UpdateConfig;
pub use download::{Fetcher, StagedArtifact};
pub use error::{UpdateError, UpdateResult};
pub use http::USER_AGENT;
pub use session::{ModuleOutcome, UpdateSession, UpdateStatus};
pub use swap::{SwapCoordinator, SwapPhase};
pub use verify::verify_sha256;
pub use version::{OpaqueComparator, RelaxedSemverComparator, VersionComparator};

/// Default registry base URL.
pub const DEFAULT_REGISTRY_URL: &str = "https://modules.harbor.dev/v2";
