use std::time::Duration;

use reqwest::StatusCode;

/// Message used for every non-success status. The server's body is not
/// echoed back to the consumer.
pub const RESPONSE_NOT_OK: &str = "Network response was not ok";

/// Failure reported by a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),
    /// The transport gave up because its cancellation handle was signalled,
    /// or because something outside the fetcher aborted it.
    #[error("Request aborted")]
    Aborted,
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

/// Error surfaced to the consumer through the `error` field of a snapshot.
///
/// Cancellation has no variant here: a superseded request never produces an
/// error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{}", RESPONSE_NOT_OK)]
    HttpStatus(StatusCode),
    #[error("Failed to decode response body: {0}")]
    Decode(String),
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
