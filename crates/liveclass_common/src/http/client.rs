// --- File: crates/liveclass_common/src/http/client.rs ---
use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// Idle connections are kept this long so consecutive batches reuse them.
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Creates a new HTTP client with custom configuration.
///
/// The returned client owns a connection pool; clone it (cheap, `Arc`
/// internally) rather than building a new one per request so that HTTP/2
/// connections are multiplexed across sends.
///
/// # Arguments
///
/// * `timeout_secs` - The per-request timeout in seconds
/// * `follow_redirects` - Whether the client should follow redirects
pub fn create_client(timeout_secs: u64, follow_redirects: bool) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS))
        .redirect(if follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        })
        .build()
}
