//! Feed-specific fetch routines.
//!
//! Each routine turns one feed's payload into [`RepoRecord`](ghwatch_protocol::RepoRecord)s
//! and hands them to [`Cache::add_candidate`](crate::Cache::add_candidate).

pub(crate) mod search;
pub(crate) mod social;
pub(crate) mod trend;

pub use search::SEARCH_REPOSITORIES_URL;
pub use social::COOL_GITHUB_PROJECTS_URL;
pub use trend::trend_feed_url;
