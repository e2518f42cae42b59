use thiserror::Error;

/// Errors returned by Verifone protocol operations.
///
/// Provider-level business failures (declined payment, unknown transaction,
/// expired agreement, ...) are *not* errors: the provider reports them as
/// ordinary response fields and callers read them off the
/// [`Response`](crate::Response).
#[derive(Debug, Error)]
pub enum VerifoneError {
    #[error("malformed field code: {0}")]
    MalformedFieldCode(String),

    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("signature error: {0}")]
    Signature(String),

    #[error("response signature verification failed: {0}")]
    SignatureVerification(String),

    #[error("config error: {0}")]
    Config(String),
}
