// --- File: crates/elements_common/src/http/client.rs ---
//! Outbound HTTP client for vendor integrations.

use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

/// Used when the configured timeout is zero.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const MAX_REDIRECTS: usize = 5;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("elements-demo/", env!("CARGO_PKG_VERSION"));

/// Builds a client whose requests give up after `timeout_secs`.
pub fn create_client(timeout_secs: u64, follow_redirects: bool) -> Result<Client, reqwest::Error> {
    let timeout = match timeout_secs {
        0 => DEFAULT_TIMEOUT_SECS,
        secs => secs,
    };
    let redirects = if follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    Client::builder()
        .timeout(Duration::from_secs(timeout))
        .connect_timeout(Duration::from_secs(timeout.min(CONNECT_TIMEOUT_SECS)))
        .user_agent(USER_AGENT)
        .redirect(redirects)
        .build()
}
