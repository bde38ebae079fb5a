//! Errors returned by the admin operations.

use grafana_http::HttpError;
use thiserror::Error;

/// Failure of one admin call.
///
/// Each variant marks the stage that failed; the underlying error is carried
/// unchanged as the source.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AdminError {
    /// The input could not be encoded as JSON; nothing was sent.
    #[error("failed to encode request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Network failure, timeout, cancellation or non-2xx reply.
    #[error(transparent)]
    Transport(#[from] HttpError),

    /// The reply body did not match the expected shape.
    #[error("failed to decode response body: {0}")]
    Deserialize(#[source] serde_json::Error),
}

impl AdminError {
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// HTTP status of a non-2xx reply, if that is what failed.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Transport(err) => err.status(),
            Self::Serialize(_) | Self::Deserialize(_) => None,
        }
    }
}
