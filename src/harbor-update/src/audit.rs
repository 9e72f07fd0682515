//! Append-only audit log of applied updates.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

/// Append-only text sink recording one line per successful update.
///
/// The append is intentionally decoupled from the swap: a crash between swap
/// and append loses at most the log line, never the update itself. The line
/// is only ever written after a swap has fully succeeded.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Create an audit log writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the record for one applied update.
    pub async fn record_update(&self, name: &str, old: &str, new: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let line = format!("{name} updated from version {old} to {new}\n");
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
