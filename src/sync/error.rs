//! Error types for fetches against the telemetry backend.

use std::fmt;

use thiserror::Error;

use crate::data::TimeRange;

/// What a fetch was trying to load. Embedded in every error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The fleet snapshot.
    Dashboard,
    /// Latest metrics for one host.
    Latest { hostname: String },
    /// Metrics history for one host over a range.
    History { hostname: String, range: TimeRange },
}

impl Target {
    /// Endpoint path relative to the API base, for diagnostics.
    pub fn endpoint(&self) -> String {
        match self {
            Target::Dashboard => "/dashboard/".to_string(),
            Target::Latest { hostname } => format!("/latest/?hostname={}", hostname),
            Target::History { hostname, range } => {
                format!("/hosts/{}/history/?hours={}", hostname, range.hours())
            }
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Dashboard => write!(f, "dashboard data ({})", self.endpoint()),
            Target::Latest { hostname } => {
                write!(f, "metrics for {} ({})", hostname, self.endpoint())
            }
            Target::History { hostname, .. } => {
                write!(f, "metrics history for {} ({})", hostname, self.endpoint())
            }
        }
    }
}

/// A failed fetch: transport error, non-2xx status, or malformed payload.
///
/// Failures are scoped to the poller that issued the request; they never
/// terminate the application.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("Failed to fetch {target}: server returned HTTP {status}")]
    Status { target: Target, status: u16 },

    /// No response within the transport timeout.
    #[error("Failed to fetch {target}: request timed out")]
    Timeout { target: Target },

    /// Could not reach the server.
    #[error("Failed to fetch {target}: connection failed: {message}")]
    Connection { target: Target, message: String },

    /// Any other transport-level failure.
    #[error("Failed to fetch {target}: {message}")]
    Transport { target: Target, message: String },

    /// The body was not the expected JSON.
    #[error("Failed to fetch {target}: malformed response: {message}")]
    Decode { target: Target, message: String },
}

impl FetchError {
    /// The request target this error belongs to.
    pub fn target(&self) -> &Target {
        match self {
            FetchError::Status { target, .. }
            | FetchError::Timeout { target }
            | FetchError::Connection { target, .. }
            | FetchError::Transport { target, .. }
            | FetchError::Decode { target, .. } => target,
        }
    }

    /// Classify a reqwest error for the given target.
    pub fn from_reqwest(target: Target, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { target }
        } else if err.is_connect() {
            FetchError::Connection {
                target,
                message: err.to_string(),
            }
        } else if err.is_decode() {
            FetchError::Decode {
                target,
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                target,
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport {
                target,
                message: err.to_string(),
            }
        }
    }
}
