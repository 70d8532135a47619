//! Error taxonomy for backend API calls

use reqwest::StatusCode;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure with no usable response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend rejected the session (401). The stored token has
    /// already been cleared by the time the caller sees this.
    #[error("authentication failed: {detail}")]
    Auth { detail: String },

    /// The addressed task no longer exists on the server (404).
    #[error("not found: {detail}")]
    NotFound { detail: String },

    /// The request was rejected as invalid, by the backend (other 4xx)
    /// or before leaving the client.
    #[error("invalid request: {detail}")]
    Validation { detail: String },

    /// The backend itself failed (5xx).
    #[error("server error {status}: {detail}")]
    Server { status: StatusCode, detail: String },

    /// The token store could not be read or written.
    #[error("session storage: {0}")]
    Session(#[from] taskdeck_session::SessionError),
}
