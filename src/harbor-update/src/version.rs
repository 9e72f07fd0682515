//! Version comparison policies.
//!
//! Registry version strings carry no guaranteed structure, so the default
//! policy treats them as opaque tokens: anything other than an exact match is
//! offered as an update. Hosts that publish well-formed versions can swap in
//! [`RelaxedSemverComparator`] without touching call sites.

/// Decides whether an installed module is outdated relative to the registry.
///
/// Pure; implementations must not perform I/O.
pub trait VersionComparator: Send + Sync {
    /// Returns true when `installed` should be replaced by `latest`.
    fn needs_update(&self, installed: &str, latest: &str) -> bool;
}

/// Default policy: versions are opaque tokens.
///
/// Not equal means an update is offered. An empty string on either side
/// counts as needing an update, since equivalence cannot be proven.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueComparator;

impl VersionComparator for OpaqueComparator {
    fn needs_update(&self, installed: &str, latest: &str) -> bool {
        if installed.is_empty() || latest.is_empty() {
            return true;
        }
        installed != latest
    }
}

/// Ordering-aware policy for hosts whose registry publishes
/// major.minor.patch versions.
///
/// Parsing is lenient: a leading `v` is stripped, missing components default
/// to zero, and prerelease tags compare lexicographically. An update is
/// offered only when the installed version orders strictly before the latest,
/// so a locally newer build is never "downgraded".
#[derive(Debug, Clone, Copy, Default)]
pub struct RelaxedSemverComparator;

impl VersionComparator for RelaxedSemverComparator {
    fn needs_update(&self, installed: &str, latest: &str) -> bool {
        if installed.is_empty() || latest.is_empty() {
            return true;
        }
        parse_version(installed) < parse_version(latest)
    }
}

/// Parse a version string into comparable parts.
fn parse_version(version: &str) -> (u32, u32, u32, String) {
    let version = version.strip_prefix('v').unwrap_or(version);

    let (version_part, prerelease) = version
        .split_once('-')
        .map(|(v, p)| (v, p.to_string()))
        .unwrap_or((version, String::new()));

    let parts: Vec<u32> = version_part
        .split('.')
        .take(3)
        .filter_map(|s| s.parse().ok())
        .collect();

    let major = parts.first().copied().unwrap_or(0);
    let minor = parts.get(1).copied().unwrap_or(0);
    let patch = parts.get(2).copied().unwrap_or(0);

    (major, minor, patch, prerelease)
}
