//! # Harbor Module Interface
//!
//! The contract between the Harbor host process and the components that
//! manage its dynamically loaded modules. The host owns module lifecycle
//! (load, enable, disable) and exposes it through the [`ModuleHost`] trait;
//! consumers such as the auto-updater drive that lifecycle without ever
//! inspecting module binaries themselves.
//!
//! ## Example
//!
//! ```rust,ignore
//! use harbor_modules::ModuleHost;
//!
//! async fn print_modules(host: &dyn ModuleHost) -> harbor_modules::Result<()> {
//!     for module in host.modules().await? {
//!         println!("{} v{}", module.name(), module.version());
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod host;
pub mod module;

pub use error::{HostError, Result};
pub use host::ModuleHost;
pub use module::{ModuleHandle, ModuleInfo, ModuleState};
