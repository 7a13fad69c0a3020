//! ghwatch - Watch GitHub for new repositories worth a look.
//!
//! This is the main binary: it refreshes the pending cache from the
//! configured sources, then runs the interactive review.

use std::io::IsTerminal;

use anyhow::Context;
use clap::Parser;
use ghwatch_config::{Config, auth::resolve_token};
use ghwatch_github::{Cache, GitHubClient, Watchlist};
use ghwatch_review::{ReviewOutcome, Reviewer, SystemLauncher, TerminalKeys, terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ghwatch", version, about = "Watch GitHub for new repositories and triage them")]
struct Cli {
    /// Log at debug level
    #[arg(short, long)]
    debug: bool,

    /// Fetch due sources even when repositories are pending
    #[arg(short, long)]
    force: bool,

    /// Forget fetch times and fetch every source
    #[arg(short = 'F', long)]
    force_all: bool,

    /// Only run license checks and list pending repositories
    #[arg(short, long)]
    check: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Install panic hook to restore terminal on panic
    terminal::install_panic_hook();

    let mut config = Config::load().context("failed to load configuration")?;
    let settings = config.settings();

    let token = resolve_token(settings.github_token.as_deref()).await;
    let client =
        GitHubClient::from_settings(settings, token).context("failed to build HTTP client")?;

    let mut watchlist =
        Watchlist::load(settings.snooze_seconds, client.now()).context("failed to load watchlist")?;
    let mut cache = Cache::load(client).context("failed to load cache")?;

    if cli.force_all {
        cache.clear_fetch_cursors();
    }
    if cli.force || cli.force_all || cache.pending_count() == 0 {
        let summary = cache.fetch_due_sources(&config, &watchlist).await;
        info!(
            fetched = summary.fetched,
            not_due = summary.not_due,
            failed = summary.failed,
            added = summary.added,
            "fetch complete"
        );
        cache.save().context("failed to save cache")?;
    }

    let stdout = std::io::stdout();
    let color = stdout.is_terminal();
    let result = Reviewer::new(
        &config,
        &mut cache,
        &mut watchlist,
        TerminalKeys,
        SystemLauncher,
        stdout,
    )
    .check_only(cli.check)
    .color(color)
    .run()
    .await;

    // Save whatever was decided, even if the review failed
    watchlist.save().context("failed to save watchlist")?;
    cache.save().context("failed to save cache")?;
    config.save().context("failed to save configuration")?;

    match result.context("review failed")? {
        ReviewOutcome::Completed => info!(pending = cache.pending_count(), "review complete"),
        ReviewOutcome::Quit => info!(pending = cache.pending_count(), "review stopped"),
    }
    Ok(())
}
