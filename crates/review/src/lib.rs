//! Interactive review for ghwatch.
//!
//! This crate walks the pending repositories one at a time and lets the user
//! triage each with a single key press.
//!
//! # Overview
//!
//! The crate is organized into the following modules:
//!
//! - [`review`]: The [`Reviewer`] loop
//! - [`display`]: Text rendering of a repository and the prompt
//! - [`event`]: Key mappings and [`KeySource`]s
//! - [`launcher`]: README pager and URL opener
//! - [`terminal`]: Raw-mode key reading and panic handling
//! - [`error`]: Error types for review operations
//!
//! # Example
//!
//! ```no_run
//! use ghwatch_config::Config;
//! use ghwatch_github::{Cache, GitHubClient, Watchlist};
//! use ghwatch_review::{Reviewer, SystemLauncher, TerminalKeys, terminal};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     terminal::install_panic_hook();
//!
//!     let config = Config::load()?;
//!     let client = GitHubClient::from_settings(config.settings(), None)?;
//!     let mut watchlist = Watchlist::load(config.settings().snooze_seconds, client.now())?;
//!     let mut cache = Cache::load(client)?;
//!
//!     Reviewer::new(
//!         &config,
//!         &mut cache,
//!         &mut watchlist,
//!         TerminalKeys,
//!         SystemLauncher,
//!         std::io::stdout(),
//!     )
//!     .run()
//!     .await?;
//!
//!     watchlist.save()?;
//!     cache.save()?;
//!     Ok(())
//! }
//! ```

pub mod display;
pub mod error;
pub mod event;
pub mod launcher;
pub mod review;
pub mod terminal;

// Re-export primary types at crate root for convenience
pub use error::{LaunchError, Result, ReviewError};
pub use event::{Action, KeySource, ScriptedKeys, TerminalKeys, key_to_action};
pub use launcher::{Launch, Launcher, RecordingLauncher, SystemLauncher};
pub use review::{ReviewOutcome, Reviewer};
pub use terminal::TerminalError;
