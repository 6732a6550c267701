//! Port traits and the backend error taxonomy.
//!
//! The generation backend is an external collaborator: opaque beyond its
//! request/response contract. The orchestrator never assumes the backend
//! remembers earlier turns; it carries the session transcript and restates
//! trailing context in every continuation prompt.

use async_trait::async_trait;

use super::models::generation::Exchange;

/// Error type for generation backend calls
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Invalid request parameters or malformed request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication failed due to invalid or missing API key
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limit exceeded, retry after waiting
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Backend server encountered an internal error
    #[error("Backend server error: {0}")]
    ServerError(String),

    /// Backend is overloaded, retry later
    #[error("Backend overloaded")]
    Overloaded,

    /// Network error occurred during request
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response arrived but carried no usable text
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Unknown error occurred
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl BackendError {
    /// Returns true if this error is transient (rate limit, server error,
    /// overload, network) rather than a caller mistake.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BackendError::RateLimitExceeded
                | BackendError::ServerError(_)
                | BackendError::Overloaded
                | BackendError::Network(_)
        )
    }

    /// Create error from HTTP status code and response body.
    ///
    /// - 400: invalid request
    /// - 401, 403: authentication failed
    /// - 429: rate limit exceeded
    /// - 529: overloaded
    /// - other 5xx: server error
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            400 => BackendError::InvalidRequest(body),
            401 | 403 => BackendError::AuthenticationFailed(body),
            429 => BackendError::RateLimitExceeded,
            529 => BackendError::Overloaded,
            s if (500..600).contains(&s) => BackendError::ServerError(body),
            _ => BackendError::Unknown(format!("HTTP {status}: {body}")),
        }
    }
}

/// One synchronous backend round-trip, fully specified by the caller.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,

    /// Optional system prompt
    pub system: Option<String>,

    /// Prior prompt/response pairs of this session, oldest first
    pub history: Vec<Exchange>,

    /// The prompt for this turn
    pub prompt: String,

    /// Sampling temperature; None leaves the backend default
    pub temperature: Option<f32>,

    /// Token cap for the response
    pub max_tokens: u32,
}

/// Port for the external text-generation backend.
///
/// Implementations must not retry internally: the orchestrator owns the
/// retry discipline (exactly one base-prompt retry per failure).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Send one prompt and return the raw response text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, BackendError>;
}

/// Observer for per-round progress notifications.
///
/// Observational only: implementations never affect engine behavior.
pub trait ProgressObserver: Send + Sync {
    /// Called once per continuation round, before the backend call.
    fn on_continuation(&self, attempt: u32, max_attempts: u32);
}

/// Observer that discards all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_continuation(&self, _attempt: u32, _max_attempts: u32) {}
}
