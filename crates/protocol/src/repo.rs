//! The normalized repository record.
//!
//! Every feed (search API, trend RSS, social feed) is converted into a
//! [`RepoRecord`]. The `full_name` (`user/repo`) is the unique key across the
//! pending cache and the watchlist.

use serde::{Deserialize, Serialize};

/// Star/fork count stored for records coming from the trend RSS feeds.
pub const UNKNOWN_TREND_COUNT: i64 = -1;

/// Star/fork count stored for records coming from the social feed.
pub const UNKNOWN_SOCIAL_COUNT: i64 = -2;

/// A repository waiting for review.
///
/// The on-disk shape is kept flat so cache files stay readable. Counts are
/// signed because the feeds without real numbers store a negative sentinel;
/// use [`stars`](Self::stars) and [`forks`](Self::forks) to read them.
///
/// # Examples
///
/// ```
/// use ghwatch_protocol::RepoRecord;
///
/// let url = "https://github.com/owner/tool";
/// let record = RepoRecord::from_social("owner", "tool", "Rust", url, "A tool");
/// assert_eq!(record.full_name, "owner/tool");
/// assert!(record.license.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    /// `user/repo`, unique across all stores.
    pub full_name: String,
    /// Owner login.
    pub user: String,
    /// Repository name.
    pub repo: String,
    /// Primary language, if the source reported one.
    pub language: Option<String>,
    /// Star count, or a negative sentinel.
    pub stargazers_count: i64,
    /// Fork count, or a negative sentinel.
    pub forks_count: i64,
    /// Repository page.
    pub html_url: String,
    /// Project homepage.
    pub homepage: Option<String>,
    /// Short description.
    pub description: Option<String>,
    /// License pre-check result; absent until evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<bool>,
}

impl RepoRecord {
    /// Builds a record from a trend RSS entry.
    #[must_use]
    pub fn from_trend(full_name: &str, language: &str, html_url: &str, description: &str) -> Self {
        let (user, repo) = full_name.split_once('/').unwrap_or((full_name, ""));
        Self {
            full_name: full_name.to_string(),
            user: user.to_string(),
            repo: repo.to_string(),
            language: Some(language.to_string()),
            stargazers_count: UNKNOWN_TREND_COUNT,
            forks_count: UNKNOWN_TREND_COUNT,
            html_url: html_url.to_string(),
            homepage: None,
            description: Some(description.to_string()),
            license: None,
        }
    }

    /// Builds a record from a social feed post.
    #[must_use]
    pub fn from_social(
        user: &str,
        repo: &str,
        language: &str,
        html_url: &str,
        title: &str,
    ) -> Self {
        Self {
            full_name: format!("{user}/{repo}"),
            user: user.to_string(),
            repo: repo.to_string(),
            language: Some(language.to_string()),
            stargazers_count: UNKNOWN_SOCIAL_COUNT,
            forks_count: UNKNOWN_SOCIAL_COUNT,
            html_url: html_url.to_string(),
            homepage: None,
            description: Some(title.to_string()),
            license: None,
        }
    }

    /// Returns the star count, or `None` when the source did not provide one.
    #[must_use]
    pub fn stars(&self) -> Option<u64> {
        u64::try_from(self.stargazers_count).ok()
    }

    /// Returns the fork count, or `None` when the source did not provide one.
    #[must_use]
    pub fn forks(&self) -> Option<u64> {
        u64::try_from(self.forks_count).ok()
    }

    /// Returns the homepage when it is set and non-empty.
    #[must_use]
    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref().filter(|h| !h.is_empty())
    }

    /// Returns the language, or `"Unknown"`.
    #[must_use]
    pub fn language_or_unknown(&self) -> &str {
        match self.language.as_deref() {
            Some(lang) if !lang.is_empty() => lang,
            _ => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_record_uses_trend_sentinel() {
        let record = RepoRecord::from_trend("a/b", "Go", "https://github.com/a/b", "desc");
        assert_eq!(record.user, "a");
        assert_eq!(record.repo, "b");
        assert_eq!(record.stargazers_count, -1);
        assert_eq!(record.forks_count, -1);
        assert_eq!(record.stars(), None);
        assert_eq!(record.forks(), None);
    }

    #[test]
    fn social_record_uses_social_sentinel() {
        let record = RepoRecord::from_social("a", "b", "Go", "https://github.com/a/b", "title");
        assert_eq!(record.stargazers_count, -2);
        assert_eq!(record.forks_count, -2);
        assert_eq!(record.description.as_deref(), Some("title"));
    }

    #[test]
    fn real_counts_are_exposed() {
        let mut record = RepoRecord::from_trend("a/b", "Go", "u", "");
        record.stargazers_count = 12;
        record.forks_count = 0;
        assert_eq!(record.stars(), Some(12));
        assert_eq!(record.forks(), Some(0));
    }

    #[test]
    fn sentinels_survive_serialization() {
        let record = RepoRecord::from_social("a", "b", "C++", "u", "t");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"stargazers_count\":-2"));
        assert!(!json.contains("license"));

        let parsed: RepoRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn license_is_read_back_when_present() {
        let json = r#"{
            "full_name": "a/b", "user": "a", "repo": "b", "language": null,
            "stargazers_count": 3, "forks_count": 1, "html_url": "u",
            "homepage": "", "description": null, "license": false
        }"#;
        let record: RepoRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.license, Some(false));
        assert_eq!(record.homepage(), None);
        assert_eq!(record.language_or_unknown(), "Unknown");
    }
}
