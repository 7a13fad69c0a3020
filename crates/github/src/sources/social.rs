//! The r/coolgithubprojects feed.
//!
//! The feed often answers with throttling errors, so it is retried under the
//! configured [`RetryPolicy`](ghwatch_config::RetryPolicy) until a listing
//! comes back.

use std::sync::LazyLock;

use ghwatch_config::Config;
use ghwatch_protocol::{RepoRecord, flair_language};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{Cache, LanguageCheck};
use crate::client::GitHubClient;
use crate::error::{Error, Result};
use crate::transport::HttpRequest;
use crate::watchlist::Watchlist;

/// Listing of the newest posts.
pub const COOL_GITHUB_PROJECTS_URL: &str = "https://www.reddit.com/r/coolgithubprojects/new/.json";

static GITHUB_REPO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com/([0-9a-zA-Z-]+)/([0-9a-zA-Z-]+)")
        .expect("valid repository URL pattern")
});

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    link_flair_text: Option<String>,
}

impl Post {
    fn to_record(&self) -> Option<RepoRecord> {
        let captures = GITHUB_REPO_URL.captures(&self.url)?;
        let language = flair_language(self.link_flair_text.as_deref());
        Some(RepoRecord::from_social(
            &captures[1],
            &captures[2],
            &language,
            &self.url,
            &self.title,
        ))
    }
}

/// Fetches the newest posts and adds the GitHub repositories they link to.
pub(crate) async fn fetch(cache: &mut Cache, config: &Config, watchlist: &Watchlist) -> Result<()> {
    info!("searching r/coolgithubprojects");
    let listing = fetch_listing(cache.client(), config).await?;
    debug!(posts = listing.data.children.len(), "listing received");

    for child in listing.data.children {
        let post = child.data;
        match post.to_record() {
            Some(record) => {
                cache.add_candidate(record, config, watchlist, LanguageCheck::Apply);
            }
            None => warn!(url = %post.url, "not a repository URL, skipped"),
        }
    }
    Ok(())
}

async fn fetch_listing(client: &GitHubClient, config: &Config) -> Result<Listing> {
    let policy = config.settings().retry;
    let mut attempts = 0;
    loop {
        attempts += 1;
        match try_fetch_listing(client).await {
            Ok(listing) => return Ok(listing),
            Err(e) => client.wait_before_retry(&policy, attempts, e).await?,
        }
    }
}

async fn try_fetch_listing(client: &GitHubClient) -> Result<Listing> {
    let response = client
        .send(&HttpRequest::get(COOL_GITHUB_PROJECTS_URL))
        .await?
        .error_for_status(COOL_GITHUB_PROJECTS_URL)?;
    let body: Value = response.json()?;

    if let Some(error) = body.get("error") {
        return Err(Error::Api {
            error: error
                .as_str()
                .map_or_else(|| error.to_string(), str::to_string),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }
    Ok(serde_json::from_value(body)?)
}
