//! HTTP transport for the server interface.

use std::future::Future;
use std::time::Duration;

use verifone::{ParameterSet, VerifoneError};

/// Default request timeout. The provider documents no timeout semantics,
/// so the client bounds the wait instead of blocking indefinitely.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One form-encoded POST, one raw response body. No retries; duplicate
/// submission on caller-side retry is the caller's risk.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        endpoint: &str,
        form: &ParameterSet,
    ) -> impl Future<Output = Result<String, VerifoneError>> + Send;
}

/// [`Transport`] over a pooled `reqwest::Client`.
///
/// Safe to share across concurrent calls; the pool is the only shared
/// resource and `reqwest::Client` handles that internally.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, VerifoneError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Build a transport with a caller-chosen total request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, VerifoneError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VerifoneError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, endpoint: &str, form: &ParameterSet) -> Result<String, VerifoneError> {
        let response = self
            .http
            .post(endpoint)
            .form(form)
            .send()
            .await
            .map_err(|e| VerifoneError::Network(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VerifoneError::Network(format!("failed to read response body: {e}")))?;

        tracing::debug!(endpoint, status = status.as_u16(), "provider responded");

        if !status.is_success() {
            return Err(VerifoneError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
