//! Error Types

use thiserror::Error;

/// Failure of one remote request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {message}")]
    RequestFailed { status: Option<u16>, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status: None,
            message: message.into(),
        }
    }
}

/// Errors raised by the widget lifecycle and configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoSelectError {
    #[error("IO Select: Method {0} does not exist")]
    InvalidMethodCall(String),

    #[error("IO Select requires {0}")]
    MissingCollaborator(&'static str),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("instance is already initialized")]
    AlreadyInitialized,
}
