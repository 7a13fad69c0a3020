//! Raw-mode key reading.
//!
//! The review loop reads one key at a time without waiting for Enter. Raw
//! mode is only held while a key is being read; [`RawModeGuard`] restores the
//! terminal when it goes out of scope, and [`install_panic_hook`] covers the
//! panic path.

use std::io;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::warn;

/// Error type for terminal operations.
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    /// Failed to enter raw mode.
    #[error("failed to enter raw mode: {0}")]
    Setup(#[source] io::Error),

    /// Failed to read a key.
    #[error("failed to read key: {0}")]
    Read(#[source] io::Error),

    /// No more keys are available.
    #[error("key input closed")]
    Closed,
}

/// Holds the terminal in raw mode until dropped.
///
/// # Examples
///
/// ```no_run
/// use ghwatch_review::terminal::RawModeGuard;
///
/// # fn example() -> Result<(), ghwatch_review::terminal::TerminalError> {
/// {
///     let _guard = RawModeGuard::enter()?;
///     // keys arrive unbuffered here
/// }
/// // cooked mode again
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    /// Enables raw mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be switched.
    pub fn enter() -> Result<Self, TerminalError> {
        enable_raw_mode().map_err(TerminalError::Setup)?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "failed to restore terminal");
        }
    }
}

/// Reads a single key press in raw mode.
///
/// Key release and repeat events, mouse events and resizes are ignored.
///
/// # Errors
///
/// Returns an error if raw mode cannot be entered or reading fails.
pub fn read_key() -> Result<KeyEvent, TerminalError> {
    let _guard = RawModeGuard::enter()?;
    loop {
        if let Event::Key(key) = event::read().map_err(TerminalError::Read)? {
            if key.kind == KeyEventKind::Press {
                return Ok(key);
            }
        }
    }
}

/// Installs a panic hook that leaves raw mode before panicking.
///
/// The previous hook still runs afterwards. Call this once at startup, before
/// any key is read.
///
/// # Examples
///
/// ```no_run
/// use ghwatch_review::terminal;
///
/// fn main() {
///     terminal::install_panic_hook();
///     // review loop...
/// }
/// ```
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restoration
        let _ = disable_raw_mode();
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(TerminalError::Closed.to_string(), "key input closed");
        let err = TerminalError::Read(io::Error::other("gone"));
        assert_eq!(err.to_string(), "failed to read key: gone");
    }
}
