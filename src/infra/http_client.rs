//! HTTP client factory with consistent timeout configuration.
//!
//! Outbound calls must use `try_build_client_with_timeout()` rather than
//! constructing `reqwest::Client` directly, so that no gateway call can hang
//! a request.

use reqwest::Client;
use std::time::Duration;

/// Connect timeout (TCP handshake + TLS), capped by the request timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build an HTTP client with an explicit total request timeout.
pub fn try_build_client_with_timeout(request_timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(request_timeout))
        .timeout(request_timeout)
        .build()
}
