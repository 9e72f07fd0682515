//! Registry API client.
//!
//! The registry publishes a bulk catalog of module versions plus a per-module
//! resource record carrying concrete file detail. The catalog does not carry
//! download URLs, so resolving an update takes two requests: one catalog fetch
//! per session and one resource fetch per module that needs updating.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{UpdateError, UpdateResult};
use crate::http;

/// Number of catalog entries requested in the bulk listing.
const CATALOG_PAGE_SIZE: u32 = 10_000;

/// One module's entry in the registry catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    /// Module name as published.
    pub name: String,
    /// Latest published version string.
    pub version: String,
    /// Resource reference; the numeric resource id is its final path segment.
    #[serde(default)]
    pub external_url: Option<String>,
}

/// Resolved download detail for one module version.
#[derive(Debug, Clone)]
pub struct ArtifactDescriptor {
    /// Direct download URL.
    pub url: String,
    /// Expected byte length, when the registry publishes one.
    pub size: Option<u64>,
    /// Expected SHA256 checksum, when the registry publishes one.
    pub sha256: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    data: Vec<RegistryEntry>,
}

#[derive(Debug, Deserialize)]
struct ResourceResponse {
    files: Vec<ResourceFile>,
}

#[derive(Debug, Deserialize)]
struct ResourceFile {
    url: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    sha256: Option<String>,
}

/// Client for the module registry.
#[derive(Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    /// Create a client against a registry base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http::create_client(timeout),
            base_url: base_url.into(),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full catalog, keyed by exact module name.
    ///
    /// One request per update session. A module absent from the returned map
    /// is simply not tracked by the registry.
    pub async fn fetch_catalog(&self) -> UpdateResult<HashMap<String, RegistryEntry>> {
        let url = format!(
            "{}/resources?size={}&fields=name,version,externalUrl",
            self.base_url, CATALOG_PAGE_SIZE
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpdateError::registry_unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UpdateError::registry_unavailable(format!(
                "catalog request returned HTTP {}",
                response.status()
            )));
        }

        let catalog: CatalogResponse = response
            .json()
            .await
            .map_err(|e| UpdateError::malformed(e.to_string()))?;

        Ok(catalog
            .data
            .into_iter()
            .map(|entry| (entry.name.clone(), entry))
            .collect())
    }

    /// Resolve the concrete download detail for a catalog entry.
    ///
    /// One request per module needing an update; the bulk listing does not
    /// carry file detail.
    pub async fn fetch_descriptor(&self, entry: &RegistryEntry) -> UpdateResult<ArtifactDescriptor> {
        let id = resource_id(entry)?;
        let url = format!("{}/resources/{}", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpdateError::registry_unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UpdateError::registry_unavailable(format!(
                "resource request for '{}' returned HTTP {}",
                entry.name,
                response.status()
            )));
        }

        let resource: ResourceResponse = response
            .json()
            .await
            .map_err(|e| UpdateError::malformed(e.to_string()))?;

        let file = resource.files.into_iter().next().ok_or_else(|| {
            UpdateError::malformed(format!("resource for '{}' lists no files", entry.name))
        })?;

        Ok(ArtifactDescriptor {
            url: file.url,
            size: file.size,
            sha256: file.sha256,
        })
    }
}

/// Extract the numeric resource id from an entry's external URL.
fn resource_id(entry: &RegistryEntry) -> UpdateResult<u64> {
    let external_url = entry.external_url.as_deref().ok_or_else(|| {
        UpdateError::malformed(format!("entry '{}' has no external URL", entry.name))
    })?;

    external_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| {
            UpdateError::malformed(format!(
                "entry '{}' has a non-numeric resource id in '{}'",
                entry.name, external_url
            ))
        })
}
