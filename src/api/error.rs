use thiserror::Error;

/// Errors produced at the API boundary.
///
/// Three families: transport-level failures (`Network`, `Status`,
/// `Malformed`), local validation raised before any request is issued
/// (`EmptyPrompt`, `EmptyContent`, `ContentTooLong`), and application-level
/// rejections that arrive inside a structurally successful response
/// (`Rejected`). `NotFound` is kept separate so a delete of an id the
/// server no longer has is not mistaken for a transport failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("tweet not found on the server")]
    NotFound,

    #[error("unexpected response from server: {0}")]
    Malformed(String),

    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("tweet content cannot be empty")]
    EmptyContent,

    #[error("tweet content is {len} characters, the limit is {limit}", limit = crate::api::POST_CHAR_LIMIT)]
    ContentTooLong { len: usize },

    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// Map a non-success HTTP status into a typed error.
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// Map a reqwest transport error (connect, timeout, body read).
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network(format!("request timed out: {}", err))
        } else if err.is_connect() {
            ApiError::Network(format!("connection failed: {}", err))
        } else if err.is_decode() {
            ApiError::Malformed(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }

    /// True when the error was raised locally, without a network round-trip.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ApiError::EmptyPrompt | ApiError::EmptyContent | ApiError::ContentTooLong { .. }
        )
    }

    /// Short line suitable for an inline status strip.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) | ApiError::Status { .. } | ApiError::Malformed(_) => {
                "Request failed. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}
