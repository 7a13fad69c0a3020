//! Feed fetching for ghwatch.
//!
//! This crate talks to the remote feeds and keeps the two local stores that
//! depend on them: the [`Watchlist`] of rejected repositories and the
//! [`Cache`] of repositories waiting for review.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - [`Transport`]: The HTTP seam, with [`ReqwestTransport`] and [`MockTransport`]
//! - [`GitHubClient`]: Requests with rate-limit waits and retries
//! - [`RateLimitClass`] and [`RateLimitState`]: Per-bucket GitHub API limits
//! - [`Watchlist`]: Snoozed (expiring) and zapped (permanent) repositories
//! - [`Cache`]: Pending repositories, fetch cursors, license check and README lookup
//! - [`Error`]: Error types for fetch operations
//!
//! # Sources
//!
//! | Type | Endpoint | Language allow-list |
//! |------|----------|---------------------|
//! | `search` | `https://api.github.com/search/repositories` | yes |
//! | `trend` | `http://github-trends.ryotarai.info/rss/...` | no |
//! | `r/coolgithubprojects` | `https://www.reddit.com/r/coolgithubprojects/new/.json` | yes |
//!
//! # Authentication
//!
//! A GitHub token raises the API limits and is required by code search. It
//! is only ever sent to `api.github.com` and is held in a
//! [`secrecy::SecretString`].
//!
//! # Examples
//!
//! ```no_run
//! use ghwatch_config::{Config, auth::resolve_token};
//! use ghwatch_github::{Cache, GitHubClient, Watchlist};
//!
//! # async fn example() -> ghwatch_github::Result<()> {
//! let config = Config::load()?;
//! let token = resolve_token(config.settings().github_token.as_deref()).await;
//! let client = GitHubClient::from_settings(config.settings(), token)?;
//!
//! let watchlist = Watchlist::load(config.settings().snooze_seconds, client.now())?;
//! let mut cache = Cache::load(client)?;
//! cache.fetch_due_sources(&config, &watchlist).await;
//!
//! for name in cache.pending_names() {
//!     let licensed = cache.check_license(&name, &config.settings().retry).await?;
//!     println!("{name}: licensed={licensed}");
//! }
//! cache.save()?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod license;
pub mod mock;
pub mod ratelimit;
pub mod readme;
pub mod sources;
pub mod transport;
pub mod watchlist;

pub use cache::{Cache, CacheData, FetchSummary, LanguageCheck};
pub use client::GitHubClient;
pub use error::{Error, Result};
pub use license::{LICENSE_QUERY, SEARCH_CODE_URL, license_request};
pub use mock::{MockTransport, RecordedRequest};
pub use ratelimit::{RateLimitClass, RateLimitState};
pub use readme::{README_ACCEPT, Readme, readme_url};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use watchlist::{Watchlist, WatchlistData};
