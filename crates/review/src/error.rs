//! Error types for the review loop.

use std::io;

use crate::terminal::TerminalError;

/// Errors from running the pager or the URL opener.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The command could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// The shell command.
        command: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// Talking to the running command failed.
    #[error("I/O error with `{command}`: {source}")]
    Io {
        /// The shell command.
        command: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The command exited unsuccessfully.
    #[error("`{command}` exited with {}", describe_exit(*.code))]
    Status {
        /// The shell command.
        command: String,
        /// Exit code, `None` when killed by a signal.
        code: Option<i32>,
    },

    /// The platform opener failed.
    #[error("failed to open {url}: {source}")]
    Open {
        /// The URL.
        url: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

/// Formats an exit code for the [`LaunchError::Status`] message.
fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Errors that can occur while reviewing.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// Reading a key failed.
    #[error(transparent)]
    Terminal(#[from] TerminalError),

    /// Writing to the output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    /// A remote request failed.
    #[error(transparent)]
    Fetch(#[from] ghwatch_github::Error),

    /// An external command failed.
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// A specialized Result type for review operations.
pub type Result<T> = std::result::Result<T, ReviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_status_display() {
        let err = LaunchError::Status {
            command: "less".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "`less` exited with status 2");

        let err = LaunchError::Status {
            command: "less".to_string(),
            code: None,
        };
        assert_eq!(err.to_string(), "`less` exited with a signal");
    }
}
