//! API error types.
//!
//! Every `VedaApi` call fails with one of these. Controllers surface them
//! uniformly, so the only thing most callers need is the `Display` output;
//! `kind()` is there for the few places that care which class of failure
//! occurred.

use thiserror::Error;

/// Errors that can occur when talking to the VedaScore server.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The server rejected the session (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The resource or endpoint does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The server reported an application error.
    #[error("{message} (HTTP {status})")]
    Server { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The request never reached the server or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The response arrived but did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request failed before a response was received.
    Transport,
    /// The server answered with a non-success status.
    Application,
    /// The server answered successfully with an unusable body.
    Malformed,
}

impl ApiError {
    /// Which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Timeout(_) | ApiError::Network(_) => ErrorKind::Transport,
            ApiError::Unauthorized(_) | ApiError::NotFound(_) | ApiError::Server { .. } => {
                ErrorKind::Application
            }
            ApiError::Decode(_) => ErrorKind::Malformed,
        }
    }

    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::NotFound(_) => Some(404),
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an error from a non-success status and the server's message.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound(message),
            _ => ApiError::Server { status, message },
        }
    }
}
