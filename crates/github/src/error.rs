//! Error types for fetching and GitHub API operations.
//!
//! This module defines the errors that can occur while talking to the remote
//! feeds, decoding their payloads and persisting the local stores.

/// Errors that can occur while fetching feeds or calling the GitHub API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// A request could not be completed (connection, timeout, TLS...).
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// The requested URL.
        url: String,
        /// What went wrong.
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The requested URL.
        url: String,
    },

    /// A response body was not the expected JSON.
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// An RSS feed could not be parsed.
    #[error("invalid RSS feed: {0}")]
    Feed(#[from] rss::Error),

    /// The feed API reported an error in its body.
    #[error("API error {error}: {message}")]
    Api {
        /// Error code reported by the API.
        error: String,
        /// Error message reported by the API.
        message: String,
    },

    /// A README used an encoding other than base64.
    #[error("unsupported README encoding: {0}")]
    UnsupportedEncoding(String),

    /// A base64 README could not be decoded.
    #[error("invalid base64 README content: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A bounded retry policy ran out of attempts.
    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The last error seen.
        last: Box<Error>,
    },

    /// A local store could not be read or written.
    #[error(transparent)]
    Config(#[from] ghwatch_config::ConfigError),
}

impl Error {
    /// Returns whether retrying the same request may succeed.
    ///
    /// Transport failures, non-success statuses, undecodable bodies and
    /// API-level errors are transient; local and decoding errors are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Json(_) | Self::Api { .. }
        )
    }
}

/// A specialized Result type for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;
