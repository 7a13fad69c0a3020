//! Per-language trending RSS feeds.
//!
//! Item titles look like `owner/repo (1,234 stars) - Rust - daily`: the part
//! before the first space is the repository, and the second ` - ` segment of
//! the rest is its language.

use ghwatch_config::{Config, TrendLanguages};
use ghwatch_protocol::{RepoRecord, trend_feed_segment};
use tracing::{debug, instrument, warn};

use crate::cache::{Cache, LanguageCheck};
use crate::error::Result;
use crate::transport::HttpRequest;
use crate::watchlist::Watchlist;

/// Returns the feed URL for a normalised language segment and a period.
///
/// # Examples
///
/// ```
/// use ghwatch_github::sources::trend_feed_url;
///
/// assert_eq!(
///     trend_feed_url("cpp", "daily"),
///     "http://github-trends.ryotarai.info/rss/github_trends_cpp_daily.rss"
/// );
/// ```
#[must_use]
pub fn trend_feed_url(segment: &str, period: &str) -> String {
    format!("http://github-trends.ryotarai.info/rss/github_trends_{segment}_{period}.rss")
}

/// Fetches the trend feed of every configured language.
pub(crate) async fn fetch(
    cache: &mut Cache,
    config: &Config,
    watchlist: &Watchlist,
    languages: &TrendLanguages,
    period: &str,
) -> Result<()> {
    for language in languages.resolve(&config.settings().accept_languages) {
        let segment = trend_feed_segment(language);
        fetch_language(cache, config, watchlist, &segment, period).await?;
    }
    Ok(())
}

#[instrument(skip(cache, config, watchlist))]
async fn fetch_language(
    cache: &mut Cache,
    config: &Config,
    watchlist: &Watchlist,
    segment: &str,
    period: &str,
) -> Result<()> {
    let url = trend_feed_url(segment, period);
    let response = cache
        .client()
        .send(&HttpRequest::get(&url))
        .await?
        .error_for_status(&url)?;
    let channel = rss::Channel::read_from(&response.body[..])?;
    debug!(items = channel.items().len(), "trend feed received");

    for item in channel.items() {
        match parse_item(item) {
            Some(record) => {
                cache.add_candidate(record, config, watchlist, LanguageCheck::Skip);
            }
            None => warn!(title = ?item.title(), "malformed trend item, skipped"),
        }
    }
    Ok(())
}

fn parse_item(item: &rss::Item) -> Option<RepoRecord> {
    let (full_name, language) = parse_title(item.title()?)?;
    let html_url = item
        .link()
        .map_or_else(|| format!("https://github.com/{full_name}"), str::to_string);
    let description = item.description().unwrap_or_default().trim_end_matches('\n');
    Some(RepoRecord::from_trend(full_name, language, &html_url, description))
}

/// Splits a trend item title into `full_name` and language.
fn parse_title(title: &str) -> Option<(&str, &str)> {
    let (full_name, rest) = title.split_once(' ')?;
    let language = rest.split(" - ").nth(1)?;
    let (user, repo) = full_name.split_once('/')?;
    if user.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((full_name, language))
}
