use thiserror::Error;

/// Errors surfaced by the remote item gateway.
///
/// The gateway never recovers from these, it only forwards them. The
/// mutation coordinator treats every kind uniformly: roll back the
/// speculative edit, mark the cache stale, re-raise.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Connectivity or protocol failure below the API surface.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the payload shape or range.
    #[error("validation rejected: {0}")]
    Validation(String),

    /// The addressed item does not exist remotely.
    #[error("item not found: {0}")]
    NotFound(String),

    /// Any other non-success status; the body is kept for diagnostics.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl GatewayError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 | 422 => GatewayError::Validation(truncated),
            404 => GatewayError::NotFound(truncated),
            code => GatewayError::Status {
                status: code,
                body: truncated,
            },
        }
    }
}
