//! Closed error taxonomy for calls against the face-recognition service.

use crate::codec::CodecError;
use thiserror::Error;

/// Body reported for a non-2xx response that carried no body at all.
pub const UNKNOWN_ERROR_BODY: &str = "Unknown error";

#[derive(Error, Debug)]
pub enum ApiError {
    /// No bearer token is held; the request was never sent.
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Authentication failed")]
    AuthFailed,
    #[error("User already exists")]
    Conflict,
    #[error("Missing required fields")]
    BadRequest,
    #[error("Server error: {body}")]
    Server { code: u16, body: String },
    /// Network failure, timeout, or an unparseable response body.
    #[error("{cause}")]
    Transport { cause: String },
    /// Arguments rejected before any request was built.
    #[error("{0}")]
    InvalidInput(String),
    #[error("image encoding failed: {0}")]
    Image(#[from] CodecError),
}

impl ApiError {
    /// Map a non-2xx HTTP status and its raw body to an error.
    ///
    /// 400, 401 and 409 map to fixed variants regardless of body; every
    /// other code keeps the raw body for display.
    pub fn from_status(code: u16, body: &str) -> Self {
        match code {
            401 => ApiError::AuthFailed,
            409 => ApiError::Conflict,
            400 => ApiError::BadRequest,
            _ => ApiError::Server {
                code,
                body: if body.is_empty() {
                    UNKNOWN_ERROR_BODY.to_string()
                } else {
                    body.to_string()
                },
            },
        }
    }

    pub fn transport(cause: impl std::fmt::Display) -> Self {
        ApiError::Transport {
            cause: cause.to_string(),
        }
    }

    /// True for failures that happened below the HTTP status layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}
