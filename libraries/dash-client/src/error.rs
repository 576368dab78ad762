//! Error types for the dashboard client.

use dash_core::ValidationError;
use thiserror::Error;

/// Errors that can occur when talking to the dashboard API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API answered with a non-2xx status.
    ///
    /// `message` is the body's `message` (or `error`) field, or a generic
    /// fallback naming the status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Protected call attempted without a token in the session
    #[error("You must log in first")]
    AuthRequired,

    /// Login succeeded but the response carried no token
    #[error("Token not found in response")]
    MissingToken,

    /// Base URL missing or malformed
    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Input rejected before sending
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ClientError {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 401 or 403 from the API
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::ServerUnreachable(e.to_string())
        } else {
            Self::Request(e)
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
