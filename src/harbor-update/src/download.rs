//! Artifact download and staging.
//!
//! Downloads stream into a private staging directory and are only handed
//! downstream once complete. Every failure path removes the partial file;
//! a [`StagedArtifact`] that is dropped without being consumed cleans up
//! after itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

use crate::api::ArtifactDescriptor;
use crate::error::{UpdateError, UpdateResult};
use crate::http;
use crate::verify::verify_sha256;

/// A fully received artifact in the staging area.
///
/// Owned exclusively by the fetcher until handed to the swap coordinator.
/// Consumed with [`StagedArtifact::into_path`]; otherwise the staged file is
/// removed on drop.
#[derive(Debug)]
pub struct StagedArtifact {
    path: PathBuf,
    bytes_received: u64,
    consumed: bool,
}

impl StagedArtifact {
    /// Create a staged artifact record for an already-written file.
    pub fn new(path: PathBuf, bytes_received: u64) -> Self {
        Self {
            path,
            bytes_received,
            consumed: false,
        }
    }

    /// Path of the staged file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes actually received from the server.
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Take ownership of the staged file, disarming the drop cleanup.
    pub fn into_path(mut self) -> PathBuf {
        self.consumed = true;
        self.path.clone()
    }
}

impl Drop for StagedArtifact {
    fn drop(&mut self) {
        if !self.consumed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Downloads artifacts into a staging directory.
///
/// The staging directory is removed when the fetcher is dropped.
pub struct Fetcher {
    client: Client,
    staging: TempDir,
}

impl Fetcher {
    /// Create a fetcher with a fresh staging directory.
    pub fn new(timeout: Duration) -> UpdateResult<Self> {
        Ok(Self {
            client: http::create_client(timeout),
            staging: tempfile::tempdir()?,
        })
    }

    /// Get the staging directory path.
    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    /// Download the artifact described by `descriptor` into the staging area.
    ///
    /// The response body is copied raw, in bounded chunks. If an expected
    /// length is known (descriptor first, then the response `Content-Length`),
    /// the received byte count must match it exactly; otherwise completeness
    /// is inferred from a clean end of stream. No partial file survives any
    /// failure.
    pub async fn fetch(&self, descriptor: &ArtifactDescriptor) -> UpdateResult<StagedArtifact> {
        let filename = descriptor
            .url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("artifact.bin");
        let dest = self.staging.path().join(filename);

        match self.fetch_into(descriptor, &dest).await {
            Ok(received) => Ok(StagedArtifact::new(dest, received)),
            Err(e) => {
                let _ = tokio::fs::remove_file(&dest).await;
                Err(e)
            }
        }
    }

    async fn fetch_into(&self, descriptor: &ArtifactDescriptor, dest: &Path) -> UpdateResult<u64> {
        let response = self
            .client
            .get(&descriptor.url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| UpdateError::download_failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UpdateError::download_failed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let expected = descriptor.size.or_else(|| response.content_length());

        // Disk errors (including a full disk) count as download failures
        // just like transport errors.
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| UpdateError::download_failed(e.to_string()))?;
        let mut stream = response.bytes_stream();
        let mut received: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| UpdateError::download_failed(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| UpdateError::download_failed(e.to_string()))?;
            received += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| UpdateError::download_failed(e.to_string()))?;
        drop(file);

        if let Some(expected) = expected {
            if received != expected {
                return Err(UpdateError::IncompleteDownload { expected, received });
            }
        }

        if let Some(sha256) = &descriptor.sha256 {
            verify_sha256(dest, sha256).await?;
        }

        Ok(received)
    }
}
