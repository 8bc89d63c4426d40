//! Error kinds for fetching, ranking and exporting.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result alias for fallible fetch and export operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A filter value AniList would not accept.
    ///
    /// Raised before any request for unknown enum values, and for HTTP 400
    /// answers (AniList rejecting the query variables).
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Connection failure, timeout or server-side (5xx) error.
    #[error("Network error: {0}")]
    Network(String),

    /// AniList answered 429; `retry_after` carries its `Retry-After` hint.
    #[error("Rate limited by AniList{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// The response did not parse into media records.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The CSV file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(d) => format!(" (retry after {}s)", d.as_secs()),
        None => String::new(),
    }
}

impl Error {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::RateLimited { .. })
    }

    /// Short name of the error kind, for reports
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidFilter(_) => "InvalidFilter",
            Error::Network(_) => "NetworkError",
            Error::RateLimited { .. } => "RateLimited",
            Error::MalformedResponse(_) => "MalformedResponse",
            Error::Write { .. } => "WriteError",
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: impl Into<std::io::Error>) -> Self {
        Error::Write {
            path: path.into(),
            source: source.into(),
        }
    }
}
