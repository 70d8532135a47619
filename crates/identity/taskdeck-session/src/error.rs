//! Session error types

use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    /// No token is stored; the session is unauthenticated.
    #[error("no session token stored")]
    NoToken,

    /// The stored token exists but its claims segment cannot be read.
    #[error("stored token could not be decoded: {0}")]
    Decode(#[from] DecodeError),

    /// The persisted token file exists but does not hold a token document.
    #[error("token file is corrupt: {0}")]
    CorruptTokenFile(serde_json::Error),

    #[error("token storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Why a token's claims segment failed to decode.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("token has no payload segment")]
    MissingPayload,

    #[error("payload segment is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload segment is not a JSON claims object: {0}")]
    Json(#[from] serde_json::Error),
}
