//! Zapped and snoozed repositories.
//!
//! A zapped repository is rejected for good. A snoozed one is hidden until
//! `snooze_seconds` have passed since it was snoozed; expired entries are
//! removed when the watchlist is loaded, after which fetchers may add the
//! repository again.
//!
//! ```text
//! ~/.local/share/ghwatch/watchlist.json
//! {"snooze": {"owner/repo": 1700000000}, "zap": ["owner/other"]}
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use ghwatch_config::Persisted;
use ghwatch_config::persistence::watchlist_path;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::Result;

/// On-disk shape of the watchlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchlistData {
    /// `full_name` to the epoch second it was snoozed.
    pub snooze: BTreeMap<String, i64>,
    /// Permanently rejected `full_name`s, in zap order.
    pub zap: Vec<String>,
}

/// Persistent snooze and zap lists.
///
/// # Examples
///
/// ```no_run
/// use ghwatch_github::Watchlist;
///
/// # fn example() -> ghwatch_github::Result<()> {
/// let mut watchlist = Watchlist::load(7 * 86_400, 1_700_000_000)?;
/// watchlist.snooze("owner/repo", 1_700_000_000);
/// assert!(watchlist.is_known("owner/repo"));
/// watchlist.save()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Watchlist {
    record: Persisted<WatchlistData>,
    snooze_seconds: i64,
}

impl Watchlist {
    /// Loads the watchlist from `~/.local/share/ghwatch/watchlist.json` and
    /// drops expired snoozes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(snooze_seconds: i64, now: i64) -> Result<Self> {
        Self::load_from(watchlist_path()?, snooze_seconds, now)
    }

    /// Loads the watchlist from a specific file and drops expired snoozes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_from(
        path: impl AsRef<std::path::Path>,
        snooze_seconds: i64,
        now: i64,
    ) -> Result<Self> {
        let record = Persisted::load(path.as_ref())?;
        Ok(Self::with_record(record, snooze_seconds, now))
    }

    /// Wraps in-memory data backed by `path`, dropping expired snoozes.
    #[must_use]
    pub fn from_data(
        path: impl Into<PathBuf>,
        data: WatchlistData,
        snooze_seconds: i64,
        now: i64,
    ) -> Self {
        Self::with_record(Persisted::new(path, data), snooze_seconds, now)
    }

    fn with_record(record: Persisted<WatchlistData>, snooze_seconds: i64, now: i64) -> Self {
        let mut watchlist = Self {
            record,
            snooze_seconds,
        };
        let expired = watchlist.expire(now);
        if expired > 0 {
            info!(count = expired, "snoozed repositories expired");
        }
        watchlist
    }

    /// Removes snoozes at least `snooze_seconds` old; returns how many.
    ///
    /// The store only becomes dirty when something was removed.
    pub fn expire(&mut self, now: i64) -> usize {
        let expired: Vec<String> = self
            .record
            .get()
            .snooze
            .iter()
            .filter(|(_, snoozed_at)| now - **snoozed_at >= self.snooze_seconds)
            .map(|(name, _)| name.clone())
            .collect();

        if !expired.is_empty() {
            self.record.update(|data| {
                for name in &expired {
                    data.snooze.remove(name);
                }
            });
        }
        expired.len()
    }

    /// Snoozes `full_name` from `now`, replacing any earlier snooze.
    pub fn snooze(&mut self, full_name: &str, now: i64) {
        debug!(full_name, "snoozed");
        self.record.update(|data| {
            data.snooze.insert(full_name.to_string(), now);
        });
    }

    /// Zaps `full_name`.
    ///
    /// Names are appended as is; zapping twice keeps both entries.
    pub fn zap(&mut self, full_name: &str) {
        if self.is_zapped(full_name) {
            debug!(full_name, "already zapped");
        }
        self.record
            .update(|data| data.zap.push(full_name.to_string()));
    }

    /// Returns whether `full_name` is snoozed or zapped.
    #[must_use]
    pub fn is_known(&self, full_name: &str) -> bool {
        self.is_snoozed(full_name) || self.is_zapped(full_name)
    }

    /// Returns whether `full_name` is currently snoozed.
    #[must_use]
    pub fn is_snoozed(&self, full_name: &str) -> bool {
        self.record.get().snooze.contains_key(full_name)
    }

    /// Returns whether `full_name` was zapped.
    #[must_use]
    pub fn is_zapped(&self, full_name: &str) -> bool {
        self.record.get().zap.iter().any(|n| n == full_name)
    }

    /// Returns when `full_name` was snoozed.
    #[must_use]
    pub fn snoozed_at(&self, full_name: &str) -> Option<i64> {
        self.record.get().snooze.get(full_name).copied()
    }

    /// Returns the raw data.
    #[must_use]
    pub fn data(&self) -> &WatchlistData {
        self.record.get()
    }

    /// Writes the watchlist if it changed; returns whether it did.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&mut self) -> Result<bool> {
        Ok(self.record.save()?)
    }
}
