//! External commands: the README pager and the URL opener.
//!
//! Commands are run through `sh -c`, so configured values may contain
//! arguments and pipes (e.g. `glow -` or `pandoc -f gfm | less -R`).

use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::LaunchError;

/// Placeholder replaced with the URL in `cmd_url`.
pub const URL_PLACEHOLDER: &str = "{}";

/// Runs pagers and opens URLs.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Pipes `content` into `command` and waits for it to exit.
    async fn page(&self, command: &str, content: &[u8]) -> Result<(), LaunchError>;

    /// Opens `url` with `command` (`{}` standing for the URL), or with the
    /// platform opener when `command` is `None`. Does not wait.
    async fn open(&self, command: Option<&str>, url: &str) -> Result<(), LaunchError>;
}

/// [`Launcher`] spawning real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

#[async_trait]
impl Launcher for SystemLauncher {
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    async fn page(&self, command: &str, content: &[u8]) -> Result<(), LaunchError> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A pager quitting early closes the pipe; that is not an error.
            if let Err(e) = stdin.write_all(content).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(LaunchError::Io {
                        command: command.to_string(),
                        source: e,
                    });
                }
            }
        }

        let status = child.wait().await.map_err(|source| LaunchError::Io {
            command: command.to_string(),
            source,
        })?;
        if !status.success() {
            return Err(LaunchError::Status {
                command: command.to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn open(&self, command: Option<&str>, url: &str) -> Result<(), LaunchError> {
        match command {
            Some(command) => {
                let command = command.replace(URL_PLACEHOLDER, url);
                debug!(%command, "spawning opener");
                Command::new("sh")
                    .arg("-c")
                    .arg(&command)
                    .stdin(Stdio::null())
                    .spawn()
                    .map_err(|source| LaunchError::Spawn { command, source })?;
                Ok(())
            }
            None => open::that_detached(url).map_err(|source| LaunchError::Open {
                url: url.to_string(),
                source,
            }),
        }
    }
}

/// A launch seen by [`RecordingLauncher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    /// A pager run.
    Page {
        /// The pager command.
        command: String,
        /// What was piped into it.
        content: Vec<u8>,
    },
    /// A URL open.
    Open {
        /// The opener command, if configured.
        command: Option<String>,
        /// The URL.
        url: String,
    },
}

/// [`Launcher`] that only records what it was asked to do.
///
/// Clones share the same record.
#[derive(Debug, Default, Clone)]
pub struct RecordingLauncher {
    launches: Arc<Mutex<Vec<Launch>>>,
}

impl RecordingLauncher {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every launch so far.
    #[must_use]
    pub fn launches(&self) -> Vec<Launch> {
        self.launches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, launch: Launch) {
        self.launches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(launch);
    }
}

#[async_trait]
impl Launcher for RecordingLauncher {
    async fn page(&self, command: &str, content: &[u8]) -> Result<(), LaunchError> {
        self.record(Launch::Page {
            command: command.to_string(),
            content: content.to_vec(),
        });
        Ok(())
    }

    async fn open(&self, command: Option<&str>, url: &str) -> Result<(), LaunchError> {
        self.record(Launch::Open {
            command: command.map(str::to_string),
            url: url.to_string(),
        });
        Ok(())
    }
}
