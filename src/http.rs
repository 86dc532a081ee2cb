//! Shared HTTP agent construction for the backend and the notifier.

use std::sync::Arc;
use std::time::Duration;

use native_tls::TlsConnector;
use ureq::{Agent, AgentBuilder};

/// Default timeout applied when establishing connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default timeout applied to a whole request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a pooled agent using the platform TLS stack.
pub(crate) fn build_agent(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<Agent, native_tls::Error> {
    let connector = TlsConnector::new()?;
    Ok(AgentBuilder::new()
        .tls_connector(Arc::new(connector))
        .timeout_connect(connect_timeout)
        .timeout(request_timeout)
        .build())
}

/// Read a response body, tolerating I/O failures with an empty string.
pub(crate) fn body_text(response: ureq::Response) -> String {
    response.into_string().unwrap_or_default()
}
