//! GitHub repository search.

use ghwatch_config::Config;
use ghwatch_protocol::RepoRecord;
use serde::Deserialize;
use tracing::{debug, info};

use crate::cache::{Cache, LanguageCheck};
use crate::error::Result;
use crate::transport::HttpRequest;
use crate::watchlist::Watchlist;

/// Repository search endpoint.
pub const SEARCH_REPOSITORIES_URL: &str = "https://api.github.com/search/repositories";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total_count: u64,
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    full_name: String,
    name: String,
    owner: Owner,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: i64,
    #[serde(default)]
    forks_count: i64,
    html_url: String,
    homepage: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Owner {
    login: String,
}

impl From<SearchItem> for RepoRecord {
    fn from(item: SearchItem) -> Self {
        Self {
            full_name: item.full_name,
            user: item.owner.login,
            repo: item.name,
            language: item.language,
            stargazers_count: item.stargazers_count,
            forks_count: item.forks_count,
            html_url: item.html_url,
            homepage: item.homepage,
            description: item.description,
            license: None,
        }
    }
}

/// Runs one search and adds the surviving results.
pub(crate) async fn fetch(
    cache: &mut Cache,
    config: &Config,
    watchlist: &Watchlist,
    q: &str,
    sort: &str,
    per_page: u32,
) -> Result<()> {
    info!(q, "searching repositories");
    let request = HttpRequest::get(SEARCH_REPOSITORIES_URL)
        .query("q", q)
        .query("sort", sort)
        .query("per_page", per_page);

    let response: SearchResponse = cache.github_request(&request, true).await?.json()?;
    debug!(
        total = response.total_count,
        returned = response.items.len(),
        "search results"
    );

    for item in response.items {
        cache.add_candidate(item.into(), config, watchlist, LanguageCheck::Apply);
    }
    Ok(())
}
