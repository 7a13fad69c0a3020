//! The interactive review loop.
//!
//! Pending repositories are walked in name order. Each one is re-checked
//! against the filters, license-checked if needed, printed, and then waits
//! for a single key:
//!
//! ```text
//! unreviewed ─┬─ filter matches ──────► dropped
//!             ├─ no license ──────────► snoozed
//!             └─ shown ─┬─ z ─────────► zapped
//!                       ├─ s ─────────► snoozed
//!                       ├─ space ─────► skipped (stays pending)
//!                       ├─ q / Ctrl+C ► quit
//!                       └─ r, c, h ───► shown again
//! ```

use std::io::Write;

use crossterm::event::KeyCode;
use ghwatch_config::Config;
use ghwatch_github::{Cache, Error as FetchError, Watchlist};
use ghwatch_protocol::RepoRecord;
use tracing::{debug, error, info, instrument, warn};

use crate::display::{format_counter, format_repo, prompt};
use crate::error::Result;
use crate::event::{Action, KeySource, key_to_action};
use crate::launcher::Launcher;

/// How a review run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Every pending repository was visited.
    Completed,
    /// The user quit.
    Quit,
}

/// What happened to one pending repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Done,
    Quit,
}

/// Drives the review of the pending cache.
///
/// # Examples
///
/// ```no_run
/// use ghwatch_config::Config;
/// use ghwatch_github::{Cache, GitHubClient, Watchlist};
/// use ghwatch_review::{Reviewer, SystemLauncher, TerminalKeys};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::load()?;
/// let client = GitHubClient::from_settings(config.settings(), None)?;
/// let mut watchlist = Watchlist::load(config.settings().snooze_seconds, client.now())?;
/// let mut cache = Cache::load(client)?;
///
/// let outcome = Reviewer::new(
///     &config,
///     &mut cache,
///     &mut watchlist,
///     TerminalKeys,
///     SystemLauncher,
///     std::io::stdout(),
/// )
/// .run()
/// .await?;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
pub struct Reviewer<'a, K, L, W> {
    config: &'a Config,
    cache: &'a mut Cache,
    watchlist: &'a mut Watchlist,
    keys: K,
    launcher: L,
    out: W,
    check_only: bool,
    color: bool,
}

impl<'a, K, L, W> Reviewer<'a, K, L, W>
where
    K: KeySource,
    L: Launcher,
    W: Write,
{
    /// Creates an interactive reviewer writing uncolored text to `out`.
    pub fn new(
        config: &'a Config,
        cache: &'a mut Cache,
        watchlist: &'a mut Watchlist,
        keys: K,
        launcher: L,
        out: W,
    ) -> Self {
        Self {
            config,
            cache,
            watchlist,
            keys,
            launcher,
            out,
            check_only: false,
            color: false,
        }
    }

    /// Only runs the license checks and prints the survivors, without
    /// reading any key.
    #[must_use]
    pub fn check_only(mut self, check_only: bool) -> Self {
        self.check_only = check_only;
        self
    }

    /// Colors the owner and repository name.
    #[must_use]
    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Reviews every pending repository.
    ///
    /// # Errors
    ///
    /// Returns an error if keys cannot be read or output cannot be written.
    /// Remote and launcher failures are logged and do not end the run.
    #[instrument(skip_all, fields(check_only = self.check_only))]
    pub async fn run(&mut self) -> Result<ReviewOutcome> {
        let names = self.cache.pending_names();
        let total = names.len();
        info!(pending = total, "reviewing");

        for (index, name) in names.iter().enumerate() {
            if self.review_one(index + 1, total, name).await? == Verdict::Quit {
                info!("quit");
                return Ok(ReviewOutcome::Quit);
            }
        }
        Ok(ReviewOutcome::Completed)
    }

    async fn review_one(&mut self, index: usize, total: usize, full_name: &str) -> Result<Verdict> {
        let Some(record) = self.cache.pending(full_name).cloned() else {
            return Ok(Verdict::Done);
        };

        if self.config.filter().matches(&record) {
            self.cache.remove(full_name);
            return Ok(Verdict::Done);
        }

        if record.license.is_none() {
            match self
                .cache
                .check_license(full_name, &self.config.settings().retry)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    let now = self.cache.now();
                    self.watchlist.snooze(full_name, now);
                    self.cache.remove(full_name);
                    info!(full_name, "no license found, auto-snoozed");
                    return Ok(Verdict::Done);
                }
                Err(e) => {
                    error!(full_name, error = %e, "license check failed, left pending");
                    return Ok(Verdict::Done);
                }
            }
        }

        write!(self.out, "{}{}", format_counter(index, total), format_repo(&record, self.color))?;
        self.out.flush()?;
        if self.check_only {
            return Ok(Verdict::Done);
        }

        let verdict = self.prompt_for(&record).await?;
        writeln!(self.out)?;
        Ok(verdict)
    }

    async fn prompt_for(&mut self, record: &RepoRecord) -> Result<Verdict> {
        let full_name = record.full_name.as_str();
        let homepage = record.homepage();

        loop {
            write!(self.out, "{}", prompt(homepage.is_some()))?;
            self.out.flush()?;
            let key = self.keys.next_key()?;
            match key.code {
                KeyCode::Char(c) => writeln!(self.out, "{c}")?,
                other => writeln!(self.out, "{other:?}")?,
            }

            let Some(action) = key_to_action(key, homepage.is_some()) else {
                continue;
            };
            debug!(full_name, ?action, "key pressed");

            match action {
                Action::Zap => {
                    self.watchlist.zap(full_name);
                    self.cache.remove(full_name);
                    return Ok(Verdict::Done);
                }
                Action::Snooze => {
                    let now = self.cache.now();
                    self.watchlist.snooze(full_name, now);
                    self.cache.remove(full_name);
                    return Ok(Verdict::Done);
                }
                Action::Skip => return Ok(Verdict::Done),
                Action::Quit => return Ok(Verdict::Quit),
                Action::Readme => {
                    if let Err(e) = self.show_readme(full_name).await {
                        error!(full_name, error = %e, "failed to show README");
                    }
                }
                Action::OpenUrl => self.open(&record.html_url).await,
                Action::OpenHomepage => {
                    if let Some(homepage) = homepage {
                        self.open(homepage).await;
                    }
                }
            }
        }
    }

    async fn show_readme(&mut self, full_name: &str) -> Result<()> {
        let readme = match self.cache.fetch_readme(full_name).await {
            Ok(Some(readme)) => readme,
            Ok(None) => {
                info!(full_name, "no README");
                writeln!(self.out, "{full_name} does not have a README.")?;
                return Ok(());
            }
            Err(FetchError::UnsupportedEncoding(encoding)) => {
                warn!(full_name, %encoding, "unable to handle README encoding");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let command = self.config.settings().readme_command(&readme.name);
        self.launcher.page(command, &readme.content).await?;
        Ok(())
    }

    async fn open(&mut self, url: &str) {
        let command = self.config.settings().cmd_url.as_deref();
        if let Err(e) = self.launcher.open(command, url).await {
            error!(url, error = %e, "failed to open URL");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::ReviewError;
    use crate::event::ScriptedKeys;
    use crate::launcher::{Launch, RecordingLauncher};
    use crate::terminal::TerminalError;
    use ghwatch_config::{RetryPolicy, Settings};
    use ghwatch_github::{GitHubClient, HttpResponse, LanguageCheck, MockTransport, WatchlistData};
    use ghwatch_protocol::ManualClock;
    use serde_json::json;
    use tempfile::TempDir;

    const NOW: i64 = 1_700_000_000;

    struct Fixture {
        _dir: TempDir,
        clock: ManualClock,
        transport: Arc<MockTransport>,
        config: Config,
        cache: Cache,
        watchlist: Watchlist,
        launcher: RecordingLauncher,
        out: Vec<u8>,
    }

    impl Fixture {
        fn new(settings: Settings) -> Self {
            let dir = TempDir::new().unwrap();
            let clock = ManualClock::new(NOW);
            let transport = Arc::new(MockTransport::with_clock(Arc::new(clock.clone())));
            let client = GitHubClient::new(transport.clone(), Arc::new(clock.clone()));
            let cache = Cache::load_from(dir.path().join("cache.json"), client).unwrap();
            let watchlist = Watchlist::from_data(
                dir.path().join("watchlist.json"),
                WatchlistData::default(),
                600,
                NOW,
            );
            let config = Config::from_settings(dir.path().join("config.json"), settings).unwrap();
            Self {
                _dir: dir,
                clock,
                transport,
                config,
                cache,
                watchlist,
                launcher: RecordingLauncher::new(),
                out: Vec::new(),
            }
        }

        fn add(&mut self, full_name: &str, license: Option<bool>, homepage: Option<&str>) {
            let mut record = RepoRecord::from_trend(
                full_name,
                "Rust",
                &format!("https://github.com/{full_name}"),
                "A project",
            );
            record.license = license;
            record.homepage = homepage.map(str::to_string);
            assert!(self.cache.add_candidate(
                record,
                &Config::from_settings("/nonexistent", Settings::default()).unwrap(),
                &self.watchlist,
                LanguageCheck::Skip,
            ));
        }

        async fn run(&mut self, keys: &str, check_only: bool) -> Result<ReviewOutcome> {
            Reviewer::new(
                &self.config,
                &mut self.cache,
                &mut self.watchlist,
                ScriptedKeys::from_chars(keys),
                self.launcher.clone(),
                &mut self.out,
            )
            .check_only(check_only)
            .run()
            .await
        }

        fn output(&self) -> String {
            String::from_utf8_lossy(&self.out).into_owned()
        }
    }

    #[tokio::test]
    async fn zap_snooze_and_skip() {
        let mut fx = Fixture::new(Settings::default());
        fx.add("a/one", Some(true), None);
        fx.add("b/two", Some(true), None);
        fx.add("c/three", Some(true), None);

        let outcome = fx.run("zs ", false).await.unwrap();
        assert_eq!(outcome, ReviewOutcome::Completed);

        assert!(fx.watchlist.is_zapped("a/one"));
        assert_eq!(fx.watchlist.snoozed_at("b/two"), Some(NOW));
        assert_eq!(fx.cache.pending_names(), vec!["c/three"]);
        assert!(!fx.watchlist.is_known("c/three"));

        let output = fx.output();
        assert!(output.contains("[1/3] https://github.com/a/one"));
        assert!(output.contains("[3/3] https://github.com/c/three"));
        assert!(fx.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn quit_stops_and_keeps_the_rest() {
        let mut fx = Fixture::new(Settings::default());
        fx.add("a/one", Some(true), None);
        fx.add("b/two", Some(true), None);

        let outcome = fx.run("q", false).await.unwrap();
        assert_eq!(outcome, ReviewOutcome::Quit);
        assert_eq!(fx.cache.pending_count(), 2);
        assert!(!fx.output().contains("b/two"));
    }

    #[tokio::test]
    async fn unknown_keys_reprompt() {
        let mut fx = Fixture::new(Settings::default());
        fx.add("a/one", Some(true), None);

        // `h` is not offered without a homepage
        fx.run("xh z", false).await.unwrap();
        let prompts = fx.output().matches("[q]uit? ").count();
        assert_eq!(prompts, 3);
        assert_eq!(fx.cache.pending_count(), 1);
        assert!(fx.launcher.launches().is_empty());
    }

    #[tokio::test]
    async fn running_out_of_keys_is_an_error() {
        let mut fx = Fixture::new(Settings::default());
        fx.add("a/one", Some(true), None);

        let err = fx.run("", false).await.unwrap_err();
        assert!(matches!(err, ReviewError::Terminal(TerminalError::Closed)));
    }

    #[tokio::test]
    async fn unlicensed_repository_is_auto_snoozed() {
        let mut fx = Fixture::new(Settings::default());
        fx.transport.respond_json("/search/code", 200, &json!({"total_count": 0}));
        fx.add("a/nolicense", None, None);

        let outcome = fx.run("", false).await.unwrap();
        assert_eq!(outcome, ReviewOutcome::Completed);
        assert_eq!(fx.cache.pending_count(), 0);
        assert_eq!(fx.watchlist.snoozed_at("a/nolicense"), Some(NOW));
        assert!(fx.output().is_empty());

        let request = &fx.transport.requests()[0].request;
        assert_eq!(
            request.query_value("q"),
            Some(r#"license OR copying OR copyright OR "public domain" repo:a/nolicense"#)
        );
    }

    #[tokio::test]
    async fn failed_license_check_leaves_record_pending() {
        let settings = Settings {
            retry: RetryPolicy::bounded(2, 1),
            ..Settings::default()
        };
        let mut fx = Fixture::new(settings);
        fx.transport.respond("/search/code", HttpResponse::new(502, ""));
        fx.add("a/flaky", None, None);

        let outcome = fx.run("", false).await.unwrap();
        assert_eq!(outcome, ReviewOutcome::Completed);
        assert_eq!(fx.cache.pending("a/flaky").unwrap().license, None);
        assert!(!fx.watchlist.is_known("a/flaky"));
        assert_eq!(fx.clock.sleeps().len(), 1);
    }

    #[tokio::test]
    async fn check_mode_reads_no_keys() {
        let mut fx = Fixture::new(Settings::default());
        fx.transport.respond_json("/search/code", 200, &json!({"total_count": 3}));
        fx.add("a/one", None, None);
        fx.add("b/two", Some(true), None);

        let outcome = fx.run("", true).await.unwrap();
        assert_eq!(outcome, ReviewOutcome::Completed);
        assert_eq!(fx.cache.pending("a/one").unwrap().license, Some(true));
        assert_eq!(fx.cache.pending_count(), 2);
        assert!(!fx.output().contains("[q]uit?"));
    }

    #[tokio::test]
    async fn filters_are_reapplied() {
        let settings = Settings {
            filters_repo: vec!["^old$".to_string()],
            ..Settings::default()
        };
        let mut fx = Fixture::new(settings);
        fx.add("a/old", Some(true), None);

        fx.run("", false).await.unwrap();
        assert_eq!(fx.cache.pending_count(), 0);
        assert!(!fx.watchlist.is_known("a/old"));
    }

    #[tokio::test]
    async fn readme_goes_to_markdown_pager() {
        let settings = Settings {
            cmd_readme_md: Some("glow -".to_string()),
            ..Settings::default()
        };
        let mut fx = Fixture::new(settings);
        fx.transport.respond_json(
            "/repos/a/one/readme",
            200,
            &json!({"name": "README.md", "encoding": "base64", "content": "IyBI\nZWxsbw==\n"}),
        );
        fx.add("a/one", Some(true), None);

        fx.run("r ", false).await.unwrap();
        assert_eq!(
            fx.launcher.launches(),
            vec![Launch::Page {
                command: "glow -".to_string(),
                content: b"# Hello".to_vec(),
            }]
        );
    }

    #[tokio::test]
    async fn missing_readme_reprompts() {
        let mut fx = Fixture::new(Settings::default());
        fx.transport.respond_json("/readme", 404, &json!({"message": "Not Found"}));
        fx.add("a/one", Some(true), None);

        fx.run("rs", false).await.unwrap();
        assert!(fx.output().contains("a/one does not have a README."));
        assert!(fx.launcher.launches().is_empty());
        assert!(fx.watchlist.is_snoozed("a/one"));
    }

    #[tokio::test]
    async fn open_page_and_homepage() {
        let settings = Settings {
            cmd_url: Some("firefox {}".to_string()),
            ..Settings::default()
        };
        let mut fx = Fixture::new(settings);
        fx.add("a/one", Some(true), Some("https://one.example"));

        fx.run("ch ", false).await.unwrap();
        let command = Some("firefox {}".to_string());
        assert_eq!(
            fx.launcher.launches(),
            vec![
                Launch::Open {
                    command: command.clone(),
                    url: "https://github.com/a/one".to_string(),
                },
                Launch::Open {
                    command,
                    url: "https://one.example".to_string(),
                },
            ]
        );
        assert!(fx.output().contains("[h]omepage "));
    }
}
