//! Shared HTTP client configuration.
//!
//! Every request carries a non-empty `User-Agent`; some registries reject
//! clients that send a default or empty one. Timeouts are always bounded.

use reqwest::Client;
use std::time::Duration;

/// User-Agent string for all registry and download requests.
pub const USER_AGENT: &str = concat!("harbor-update/", env!("CARGO_PKG_VERSION"));

/// Default timeout for registry metadata requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for artifact downloads.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Creates an HTTP client builder with standard configuration.
///
/// Includes a read timeout so a stalled body stream cannot hang past the
/// configured bound even when the connection stays open.
pub fn client_builder(timeout: Duration) -> reqwest::ClientBuilder {
    let read_timeout = timeout.min(Duration::from_secs(60));

    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .read_timeout(read_timeout)
        .tcp_nodelay(true)
}

/// Creates an HTTP client, falling back to the library default if the
/// configured builder cannot be constructed.
pub fn create_client(timeout: Duration) -> Client {
    client_builder(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}
