use std::time::Duration;

use crate::error::{NotifyError, NotifyResult};

/// Connection pool settings shared by every handler client
const POOL_MAX_IDLE_PER_HOST: usize = 4;
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Builds the HTTP client a handler keeps for its lifetime
///
/// Each handler owns its client because certificate verification and the
/// socket timeouts come from that handler's URL (`verify=`, `cto=`, `rto=`).
///
/// # Features
/// - **User-Agent**: the application id from [`crate::config::Asset`]
/// - **Compression**: gzip, deflate, brotli and zstd
/// - **Timeouts**: `connect_timeout` for the TCP/TLS handshake and
///   `read_timeout` for each read; there is no overall request deadline
/// - **Security**: Rustls for TLS (no OpenSSL dependency)
///
/// # Example
/// ```ignore
/// use std::time::Duration;
/// use herald::external::client::build_client;
///
/// let client = build_client("Herald", true, Duration::from_secs(4), Duration::from_secs(4))?;
/// let response = client.post("https://example.com/hook").body("hi").send().await?;
/// ```
pub fn build_client(
    user_agent: &str,
    verify_certificate: bool,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> NotifyResult<reqwest::Client> {
    reqwest::Client::builder()
        // Timeouts
        .connect_timeout(connect_timeout)
        .read_timeout(read_timeout)
        // Connection pooling
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        // Enable compression (gzip, deflate, brotli, zstd)
        .gzip(true)
        .deflate(true)
        .brotli(true)
        .zstd(true)
        // Security
        .danger_accept_invalid_certs(!verify_certificate)
        .user_agent(user_agent)
        .build()
        .map_err(|e| NotifyError::Internal {
            source: anyhow::Error::from(e).context("Failed to build HTTP client"),
        })
}
