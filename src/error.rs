//! Error types.
//!
//! Two families live here. [`Error`] surfaces infrastructure failures:
//! binding a port, accepting a connection, building the outbound client.
//! [`CountryError`] is the outcome of one country query and is always turned
//! into an HTTP response by the handler, never into a crash.

use http::StatusCode;
use thiserror::Error;

/// The error type returned by the server and bootstrap operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Why a country query failed.
#[derive(Debug, Error)]
pub enum CountryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// The upstream could not be reached or answered with a non-success status.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream responded with {status}")]
    Status { status: StatusCode },

    #[error("upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() { Self::Timeout(e) } else { Self::Transport(e) }
    }
}

/// The upstream payload could not be turned into country records.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("payload is not a country list: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("data could not be fetched or was empty")]
    Empty,
}

/// A caller-supplied query parameter violates its precondition.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ValidationError {
    #[error("maxPopulation must be a non-negative integer, got {0}")]
    NegativePopulation(i64),

    #[error("invalid sort parameter `{0}`: use 'ascend' or 'descend'")]
    InvalidSort(String),

    #[error("take must be a non-negative integer, got {0}")]
    NegativeTake(i64),

    #[error("{param} must be an integer, got `{value}`")]
    NotAnInteger { param: &'static str, value: String },
}
