//! Error types for handler invocation.

use thiserror::Error;

/// A failure raised by the user handler.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// The handler itself failed.
    #[error("{0}")]
    Failed(String),

    /// The handler produced a value that cannot be shaped into a response.
    #[error("{0}")]
    MalformedResult(String),
}

impl HandlerError {
    /// Create a new HandlerError.
    pub fn new(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }

    /// Error message.
    pub fn message(&self) -> &str {
        match self {
            HandlerError::Failed(message) | HandlerError::MalformedResult(message) => message,
        }
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        HandlerError::new(err.to_string())
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::new(err.to_string())
    }
}

/// Any failure on the request -> handler -> response path.
///
/// None of these are recovered inside the pipeline; the server turns them
/// into a bare `500 Internal Server Error`.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("handler failed: {0}")]
    Handler(HandlerError),

    #[error("malformed handler result: {0}")]
    MalformedResult(String),

    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to read request body: {0}")]
    Body(#[from] hyper::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<HandlerError> for InvocationError {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::MalformedResult(message) => InvocationError::MalformedResult(message),
            failed => InvocationError::Handler(failed),
        }
    }
}

impl From<InvocationError> for HandlerError {
    fn from(err: InvocationError) -> Self {
        match err {
            InvocationError::MalformedResult(message) => HandlerError::MalformedResult(message),
            other => HandlerError::Failed(other.to_string()),
        }
    }
}

impl InvocationError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        InvocationError::MalformedResult(message.into())
    }
}
