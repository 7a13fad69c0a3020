//! User settings and their loading logic.
//!
//! [`Settings`] is the serde shape of `config.json`; [`Config`] wraps it in a
//! [`Persisted`] store and holds the compiled [`RepoFilter`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::filter::RepoFilter;
use crate::persistence::{Persisted, config_path};
use crate::retry::RetryPolicy;
use crate::source::FetchSource;

/// Language allow-list entry that disables language filtering.
pub const ALL_LANGUAGES: &str = "All";

/// Default snooze duration (7 days).
pub const DEFAULT_SNOOZE_SECONDS: i64 = 7 * 86_400;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// The settings file contents.
///
/// Every field has a default, so a partial file only overrides what it
/// names.
///
/// # Examples
///
/// ```
/// use ghwatch_config::Settings;
///
/// let settings: Settings = serde_json::from_str(r#"{"snooze_seconds": 60}"#).unwrap();
/// assert_eq!(settings.snooze_seconds, 60);
/// assert_eq!(settings.cmd_readme, "less");
/// assert_eq!(settings.accept_languages, vec!["All".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pager command READMEs are piped into.
    pub cmd_readme: String,

    /// Pager command for `README.md` files; falls back to `cmd_readme`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd_readme_md: Option<String>,

    /// Command opening a URL, with `{}` standing for the URL. When unset the
    /// platform opener is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd_url: Option<String>,

    /// Accepted languages; `"All"` accepts everything.
    pub accept_languages: Vec<String>,

    /// Regexes searched in repository names.
    pub filters_repo: Vec<String>,

    /// Regexes searched in descriptions.
    pub filters_description: Vec<String>,

    /// How long a snoozed repository stays hidden.
    pub snooze_seconds: i64,

    /// Feeds to poll.
    pub fetches: Vec<FetchSource>,

    /// Retry policy for the social feed and the license pre-check.
    pub retry: RetryPolicy,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// GitHub token; falls back to `GITHUB_TOKEN` and `gh auth token`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cmd_readme: "less".to_string(),
            cmd_readme_md: None,
            cmd_url: None,
            accept_languages: vec![ALL_LANGUAGES.to_string()],
            filters_repo: Vec::new(),
            filters_description: Vec::new(),
            snooze_seconds: DEFAULT_SNOOZE_SECONDS,
            fetches: Vec::new(),
            retry: RetryPolicy::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            github_token: None,
        }
    }
}

impl Settings {
    /// Returns whether `language` passes the allow-list.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghwatch_config::Settings;
    ///
    /// let mut settings = Settings::default();
    /// assert!(settings.accepts_language(None));
    ///
    /// settings.accept_languages = vec!["Rust".to_string()];
    /// assert!(settings.accepts_language(Some("Rust")));
    /// assert!(!settings.accepts_language(Some("Go")));
    /// assert!(!settings.accepts_language(None));
    /// ```
    #[must_use]
    pub fn accepts_language(&self, language: Option<&str>) -> bool {
        self.accept_languages.iter().any(|l| l == ALL_LANGUAGES)
            || language.is_some_and(|language| self.accept_languages.iter().any(|l| l == language))
    }

    /// Returns the pager for a README file name.
    #[must_use]
    pub fn readme_command(&self, file_name: &str) -> &str {
        if file_name.eq_ignore_ascii_case("readme.md") {
            self.cmd_readme_md.as_deref().unwrap_or(&self.cmd_readme)
        } else {
            &self.cmd_readme
        }
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Loaded configuration: settings plus compiled filters.
///
/// # Examples
///
/// ```no_run
/// use ghwatch_config::Config;
///
/// # fn example() -> ghwatch_config::Result<()> {
/// let config = Config::load()?;
/// for source in &config.settings().fetches {
///     println!("{} every {}s", source.key, source.interval);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Config {
    record: Persisted<Settings>,
    filter: RepoFilter,
}

impl Config {
    /// Loads the configuration from `~/.config/ghwatch/config.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if a
    /// filter pattern is invalid.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path()?)
    }

    /// Loads the configuration from a specific file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if a
    /// filter pattern is invalid.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let record: Persisted<Settings> = Persisted::load(path.as_ref())?;
        let filter =
            RepoFilter::compile(&record.get().filters_repo, &record.get().filters_description)?;
        debug!(fetches = record.get().fetches.len(), "configuration loaded");
        Ok(Self { record, filter })
    }

    /// Builds a configuration from in-memory settings, backed by `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if a filter pattern is invalid.
    pub fn from_settings(path: impl Into<PathBuf>, settings: Settings) -> Result<Self> {
        let filter = RepoFilter::compile(&settings.filters_repo, &settings.filters_description)?;
        Ok(Self {
            record: Persisted::new(path, settings),
            filter,
        })
    }

    /// Returns the settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.record.get()
    }

    /// Returns the compiled filters.
    #[must_use]
    pub fn filter(&self) -> &RepoFilter {
        &self.filter
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.record.path()
    }

    /// Writes the settings back if they changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&mut self) -> Result<bool> {
        self.record.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::source::SourceKind;
    use tempfile::TempDir;

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.cmd_readme, "less");
        assert_eq!(settings.snooze_seconds, 604_800);
        assert!(settings.fetches.is_empty());
        assert!(settings.retry.max_attempts.is_none());
        assert_eq!(settings.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn defaults_are_fresh_per_instance() {
        let mut a = Settings::default();
        a.accept_languages.push("Rust".to_string());
        let b = Settings::default();
        assert_eq!(b.accept_languages, vec!["All".to_string()]);
    }

    #[test]
    fn readme_command_prefers_markdown_pager() {
        let mut settings = Settings::default();
        assert_eq!(settings.readme_command("README.md"), "less");

        settings.cmd_readme_md = Some("glow -".to_string());
        assert_eq!(settings.readme_command("README.md"), "glow -");
        assert_eq!(settings.readme_command("readme.MD"), "glow -");
        assert_eq!(settings.readme_command("README.rst"), "less");
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(dir.path().join("config.json")).unwrap();
        assert_eq!(config.settings(), &Settings::default());
        assert!(config.filter().is_empty());
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"
            {
                accept_languages: ["Rust", "Go"],
                filters_repo: ["^awesome"],
                snooze_seconds: 3600,
                fetches: [
                    { key: "cghp", type: "r/coolgithubprojects", interval: 600 },
                ],
            }
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        let settings = config.settings();
        assert_eq!(settings.accept_languages, vec!["Rust", "Go"]);
        assert_eq!(settings.snooze_seconds, 3600);
        assert_eq!(settings.cmd_readme, "less");
        assert_eq!(settings.fetches.len(), 1);
        assert_eq!(settings.fetches[0].kind, SourceKind::CoolGithubProjects);
        assert!(!config.filter().is_empty());
    }

    #[test]
    fn load_from_rejects_invalid_filter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"filters_description": ["(unclosed"]}"#).unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFilter { .. }));
    }

    #[test]
    fn unchanged_config_is_never_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::load_from(&path).unwrap();
        assert!(!config.save().unwrap());
        drop(config);
        assert!(!path.exists());
    }

    #[test]
    fn github_token_not_serialized_when_none() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert!(!json.contains("github_token"));
        assert!(!json.contains("cmd_url"));
    }
}
