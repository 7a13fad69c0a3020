//! Shared protocol types for the ghwatch application.
//!
//! This crate defines the types every other ghwatch crate agrees on: the
//! normalized repository record produced by all feeds, language name
//! normalisation, and the clock used for timestamps and blocking waits.
//!
//! # Overview
//!
//! - [`repo`]: The [`RepoRecord`] shape and the star/fork count sentinels
//! - [`language`]: Language name normalisation for the trend feed and flairs
//! - [`clock`]: The [`Clock`] seam with a system and a manual implementation
//!
//! # Examples
//!
//! ```
//! use ghwatch_protocol::{RepoRecord, UNKNOWN_TREND_COUNT};
//!
//! let record =
//!     RepoRecord::from_trend("rust-lang/rust", "Rust", "https://github.com/rust-lang/rust", "");
//! assert_eq!(record.user, "rust-lang");
//! assert_eq!(record.stargazers_count, UNKNOWN_TREND_COUNT);
//! assert_eq!(record.stars(), None);
//! ```

pub mod clock;
pub mod language;
pub mod repo;

// Re-export primary types at crate root for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use language::{flair_language, title_case, trend_feed_segment};
pub use repo::{RepoRecord, UNKNOWN_SOCIAL_COUNT, UNKNOWN_TREND_COUNT};
