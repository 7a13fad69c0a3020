//! Pending repositories, fetch cursors and rate-limit state.
//!
//! The cache is the hub of a run: fetchers add repositories to it, the review
//! loop drains it, and every GitHub API request goes through
//! [`Cache::github_request`] so the rate-limit state it carries is persisted
//! together with the pending list.
//!
//! # File Structure
//!
//! ```text
//! ~/.cache/ghwatch/cache.json
//! {
//!   "repos": {"owner/repo": { ...RepoRecord... }},
//!   "fetches": {"source-key": 1700000000},
//!   "rate_limits": {"search": {"remain": 9, "reset": 1700000060}}
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use ghwatch_config::persistence::cache_path;
use ghwatch_config::{Config, FetchSource, Persisted, SourceKind};
use ghwatch_protocol::RepoRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::client::GitHubClient;
use crate::error::Result;
use crate::ratelimit::{RateLimitClass, RateLimitState};
use crate::sources;
use crate::transport::{HttpRequest, HttpResponse};
use crate::watchlist::Watchlist;

/// On-disk shape of the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheData {
    /// Repositories waiting for review, by `full_name`.
    pub repos: BTreeMap<String, RepoRecord>,
    /// Source key to the epoch second of its last successful fetch.
    pub fetches: BTreeMap<String, i64>,
    /// Rate-limit state per class (`search`, `general`).
    pub rate_limits: BTreeMap<String, RateLimitState>,
}

/// Whether a fetched record passes the language allow-list check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCheck {
    /// Apply `accept_languages`.
    Apply,
    /// Accept any language.
    Skip,
}

/// Result of one [`Cache::fetch_due_sources`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Sources fetched successfully.
    pub fetched: usize,
    /// Sources not yet due.
    pub not_due: usize,
    /// Sources that failed or have an unknown type.
    pub failed: usize,
    /// Repositories added to the pending list.
    pub added: usize,
}

/// The pending-review cache.
///
/// # Examples
///
/// ```no_run
/// use ghwatch_config::Config;
/// use ghwatch_github::{Cache, GitHubClient, Watchlist};
///
/// # async fn example() -> ghwatch_github::Result<()> {
/// let config = Config::load()?;
/// let client = GitHubClient::from_settings(config.settings(), None)?;
/// let watchlist = Watchlist::load(config.settings().snooze_seconds, client.now())?;
/// let mut cache = Cache::load(client)?;
///
/// let summary = cache.fetch_due_sources(&config, &watchlist).await;
/// println!("{} new repositories", summary.added);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Cache {
    record: Persisted<CacheData>,
    client: GitHubClient,
}

impl Cache {
    /// Loads the cache from `~/.cache/ghwatch/cache.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(client: GitHubClient) -> Result<Self> {
        Self::load_from(cache_path()?, client)
    }

    /// Loads the cache from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_from(path: impl AsRef<Path>, client: GitHubClient) -> Result<Self> {
        let record: Persisted<CacheData> = Persisted::load(path.as_ref())?;
        debug!(pending = record.get().repos.len(), "cache loaded");
        Ok(Self { record, client })
    }

    /// Returns the HTTP client.
    #[must_use]
    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    /// Current time in epoch seconds.
    #[must_use]
    pub fn now(&self) -> i64 {
        self.client.now()
    }

    /// Returns the raw data.
    #[must_use]
    pub fn data(&self) -> &CacheData {
        self.record.get()
    }

    /// Returns pending `full_name`s in lexicographic order.
    #[must_use]
    pub fn pending_names(&self) -> Vec<String> {
        self.record.get().repos.keys().cloned().collect()
    }

    /// Returns the number of pending repositories.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.record.get().repos.len()
    }

    /// Returns a pending repository.
    #[must_use]
    pub fn pending(&self, full_name: &str) -> Option<&RepoRecord> {
        self.record.get().repos.get(full_name)
    }

    /// Returns whether `full_name` is pending.
    #[must_use]
    pub fn is_pending(&self, full_name: &str) -> bool {
        self.record.get().repos.contains_key(full_name)
    }

    /// Removes a pending repository.
    pub fn remove(&mut self, full_name: &str) -> Option<RepoRecord> {
        if !self.is_pending(full_name) {
            return None;
        }
        self.record.update(|data| data.repos.remove(full_name))
    }

    /// Records the license pre-check result of a pending repository.
    pub fn set_license(&mut self, full_name: &str, licensed: bool) {
        if !self.is_pending(full_name) {
            return;
        }
        self.record.update(|data| {
            if let Some(record) = data.repos.get_mut(full_name) {
                record.license = Some(licensed);
            }
        });
    }

    /// Returns when the source `key` was last fetched.
    #[must_use]
    pub fn last_fetch(&self, key: &str) -> Option<i64> {
        self.record.get().fetches.get(key).copied()
    }

    /// Forgets every fetch time so all sources are due.
    pub fn clear_fetch_cursors(&mut self) {
        if self.record.get().fetches.is_empty() {
            return;
        }
        self.record.update(|data| data.fetches.clear());
    }

    /// Returns the stored rate-limit state of `class`.
    #[must_use]
    pub fn rate_limit(&self, class: RateLimitClass) -> RateLimitState {
        self.record
            .get()
            .rate_limits
            .get(class.as_str())
            .copied()
            .unwrap_or_default()
    }

    /// Sends a GitHub API request under the rate limit of its class.
    ///
    /// The updated rate-limit state is stored in the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or, with `raise_for_status`, if
    /// the status is not 2xx.
    pub async fn github_request(
        &mut self,
        request: &HttpRequest,
        raise_for_status: bool,
    ) -> Result<HttpResponse> {
        let class = RateLimitClass::of(&request.url);
        let mut state = self.rate_limit(class);
        let before = state;

        let result = self
            .client
            .send_rate_limited(&mut state, request, raise_for_status)
            .await;

        if state != before {
            self.record.update(|data| {
                data.rate_limits.insert(class.as_str().to_string(), state);
            });
        }
        result
    }

    /// Adds a fetched repository unless it is filtered out, already pending,
    /// snoozed or zapped, or (with [`LanguageCheck::Apply`]) in a language
    /// that is not accepted. Returns whether it was added.
    pub fn add_candidate(
        &mut self,
        record: RepoRecord,
        config: &Config,
        watchlist: &Watchlist,
        language: LanguageCheck,
    ) -> bool {
        if config.filter().matches(&record) {
            return false;
        }
        if self.is_pending(&record.full_name) || watchlist.is_known(&record.full_name) {
            return false;
        }
        if language == LanguageCheck::Apply
            && !config.settings().accepts_language(record.language.as_deref())
        {
            debug!(
                full_name = %record.full_name,
                language = ?record.language,
                "language not accepted, skipped"
            );
            return false;
        }

        debug!(full_name = %record.full_name, "adding to cache");
        self.record.update(|data| {
            data.repos.insert(record.full_name.clone(), record);
        });
        true
    }

    /// Fetches every configured source whose interval has elapsed.
    ///
    /// A failing source is logged and skipped; its cursor is left untouched
    /// so it is retried on the next run, and repositories it added before
    /// failing stay pending.
    #[instrument(skip_all, fields(sources = config.settings().fetches.len()))]
    pub async fn fetch_due_sources(
        &mut self,
        config: &Config,
        watchlist: &Watchlist,
    ) -> FetchSummary {
        let mut summary = FetchSummary::default();

        for source in &config.settings().fetches {
            let now = self.now();
            if !self.is_due(source, now) {
                debug!(key = %source.key, "not due yet");
                summary.not_due += 1;
                continue;
            }

            let before = self.pending_count();
            let result = match &source.kind {
                SourceKind::Search { q, sort, per_page } => {
                    sources::search::fetch(self, config, watchlist, q, sort, *per_page).await
                }
                SourceKind::Trend { languages, period } => {
                    sources::trend::fetch(self, config, watchlist, languages, period).await
                }
                SourceKind::CoolGithubProjects => {
                    sources::social::fetch(self, config, watchlist).await
                }
                SourceKind::Unknown => {
                    error!(key = %source.key, "unknown fetch source type, skipped");
                    summary.failed += 1;
                    continue;
                }
            };
            summary.added += self.pending_count().saturating_sub(before);

            match result {
                Ok(()) => {
                    let finished = self.now();
                    self.record.update(|data| {
                        data.fetches.insert(source.key.clone(), finished);
                    });
                    summary.fetched += 1;
                }
                Err(e) => {
                    error!(
                        key = %source.key,
                        kind = source.kind.type_name(),
                        error = %e,
                        "fetch failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        info!(
            fetched = summary.fetched,
            failed = summary.failed,
            added = summary.added,
            "fetch finished"
        );
        summary
    }

    fn is_due(&self, source: &FetchSource, now: i64) -> bool {
        let interval = i64::try_from(source.interval).unwrap_or(i64::MAX);
        self.last_fetch(&source.key)
            .is_none_or(|last| last.saturating_add(interval) <= now)
    }

    /// Writes the cache if it changed; returns whether it did.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&mut self) -> Result<bool> {
        Ok(self.record.save()?)
    }
}
