//! Error types for configuration operations.
//!
//! This module defines the error types that can occur while loading, parsing,
//! validating and persisting the ghwatch JSON stores.

use std::path::PathBuf;

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a store file.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a store file.
    #[error("failed to write {path}: {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a store file.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The file that could not be parsed.
        path: PathBuf,
        /// The underlying JSON5 error.
        #[source]
        source: serde_json5::Error,
    },

    /// Failed to serialize a store to JSON.
    #[error("failed to serialize: {0}")]
    SerializeJson(#[from] serde_json::Error),

    /// A repository or description filter is not a valid regular expression.
    #[error("invalid filter pattern /{pattern}/: {source}")]
    InvalidFilter {
        /// The pattern as written in the config.
        pattern: String,
        /// The regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// Failed to determine the home directory.
    #[error("could not determine home directory")]
    NoHomeDirectory,

    /// Failed to execute `gh auth token` command.
    #[error("failed to get GitHub token from gh CLI: {0}")]
    GhAuthFailed(#[source] std::io::Error),

    /// The `gh auth token` command returned an error.
    #[error("gh auth token failed with exit code {code:?}: {stderr}")]
    GhAuthError {
        /// The exit code, if available.
        code: Option<i32>,
        /// The stderr output.
        stderr: String,
    },
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_names_the_pattern() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ConfigError::InvalidFilter {
            pattern: "(".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("invalid filter pattern /(/"));
    }

    #[test]
    fn read_file_includes_path() {
        let err = ConfigError::ReadFile {
            path: PathBuf::from("/tmp/x.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to read /tmp/x.json: denied");
    }
}
