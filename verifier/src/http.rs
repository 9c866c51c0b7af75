//! HTTP transport for link probes and artefact downloads.
//!
//! Provides a trait-based abstraction over the two request shapes the
//! verifier issues (HEAD and GET) so that probing and fetching can be tested
//! without network access.

use std::time::Duration;

/// A fully-read response to a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

/// Failure below the HTTP layer: DNS, connection, TLS, or timeout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request to {url} failed: {reason}")]
pub struct TransportError {
    /// The URL that was requested.
    pub url: String,
    /// A human-readable description of the failure.
    pub reason: String,
}

impl TransportError {
    /// Build a transport error for `url`.
    #[must_use]
    pub fn new(url: &str, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Issues bounded HEAD and GET requests.
///
/// Implementations never treat a non-200 status as an error; callers
/// classify statuses themselves. Requests are never retried.
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient {
    /// Issue a HEAD request and return the status code.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if no response was received in time.
    fn head(&self, url: &str) -> Result<u16, TransportError>;

    /// Issue a GET request and read the whole body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if no response was received in time or
    /// the body could not be read.
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// HTTP client backed by a `ureq` agent with a global request timeout.
#[derive(Debug, Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Build a client whose requests are bounded by `timeout`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use sixer::http::UreqClient;
    ///
    /// let client = UreqClient::new(Duration::from_secs(5));
    /// // Use client.head(url) or client.get(url) in production
    /// # let _ = client;
    /// ```
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl HttpClient for UreqClient {
    fn head(&self, url: &str) -> Result<u16, TransportError> {
        let response = self
            .agent
            .head(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        Ok(response.status().as_u16())
    }

    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let status = response.status().as_u16();
        let mut body = Vec::new();
        std::io::copy(&mut response.into_body().as_reader(), &mut body)
            .map_err(|e| TransportError::new(url, e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

/// Map a ureq error to a [`TransportError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> TransportError {
    TransportError::new(url, err.to_string())
}
