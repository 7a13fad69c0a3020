//! Configuration management for the ghwatch application.
//!
//! This crate loads the user settings, compiles the repository filters and
//! provides the JSON-backed store every other piece of local state uses.
//!
//! # Overview
//!
//! - [`config`]: [`Settings`] (the file shape) and [`Config`] (settings plus compiled filters)
//! - [`filter`]: Regex filters on repository names and descriptions
//! - [`source`]: Fetch source definitions (`search`, `trend`, `r/coolgithubprojects`)
//! - [`retry`]: Retry policy for requests that must eventually succeed
//! - [`auth`]: GitHub token resolution
//! - [`persistence`]: [`Persisted`] stores and file locations
//! - [`error`]: Error types for configuration operations
//!
//! # Settings file
//!
//! `~/.config/ghwatch/config.json` (JSON5 syntax accepted):
//!
//! ```json5
//! {
//!   accept_languages: ["Rust", "Go"],
//!   filters_repo: ["^awesome-", "dotfiles"],
//!   filters_description: ["(?i)tutorial"],
//!   snooze_seconds: 604800,
//!   cmd_readme: "less",
//!   cmd_readme_md: "glow -",
//!   cmd_url: "firefox {}",
//!   retry: { delay_secs: 30 },
//!   fetches: [
//!     { key: "cghp", type: "r/coolgithubprojects", interval: 3600 },
//!   ],
//! }
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use ghwatch_config::Config;
//!
//! # fn example() -> ghwatch_config::Result<()> {
//! let config = Config::load()?;
//! println!("snoozing for {} seconds", config.settings().snooze_seconds);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod persistence;
pub mod retry;
pub mod source;

// Re-export primary types at crate root for convenience
pub use config::{ALL_LANGUAGES, Config, Settings};
pub use error::{ConfigError, Result};
pub use filter::{FilterField, RepoFilter};
pub use persistence::Persisted;
pub use retry::RetryPolicy;
pub use source::{FetchSource, SourceKind, TrendLanguages};
