use thiserror::Error;

use crate::polyline::DecodeError;

pub type Result<T, E = LocatorError> = std::result::Result<T, E>;

/// Errors surfaced by the location, search and routing collaborators.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    /// Missing credential or the backend rejected it (401/403).
    #[error("not authenticated")]
    Unauthenticated,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("no route found")]
    NoRouteFound,

    #[error("route geometry could not be decoded: {0}")]
    Decode(#[from] DecodeError),

    /// Non-success status from the pharmacy backend.
    #[error("backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Backend { status: u16, message: Option<String> },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),
}

impl LocatorError {
    /// Failures that mean "no usable route": the router found none, or its
    /// geometry was unreadable. Both are handled the same way.
    pub fn is_route_failure(&self) -> bool {
        matches!(self, Self::NoRouteFound | Self::Decode(_))
    }
}

impl From<reqwest::Error> for LocatorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}
