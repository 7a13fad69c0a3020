//! License pre-check.
//!
//! A repository counts as licensed when a code search for common license
//! wording inside it returns at least one hit. The check costs a search API
//! request, so it runs at most once per pending record.

use ghwatch_config::RetryPolicy;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::cache::Cache;
use crate::error::Result;
use crate::transport::HttpRequest;

/// Code search endpoint.
pub const SEARCH_CODE_URL: &str = "https://api.github.com/search/code";

/// Code search query matching typical license files and headers.
pub const LICENSE_QUERY: &str = r#"license OR copying OR copyright OR "public domain""#;

#[derive(Debug, Deserialize)]
struct CodeSearch {
    total_count: u64,
}

/// Builds the code search request for `full_name`.
///
/// # Examples
///
/// ```
/// use ghwatch_github::license_request;
///
/// let request = license_request("owner/repo");
/// assert_eq!(
///     request.query_value("q"),
///     Some(r#"license OR copying OR copyright OR "public domain" repo:owner/repo"#)
/// );
/// assert_eq!(request.query_value("per_page"), Some("1"));
/// ```
#[must_use]
pub fn license_request(full_name: &str) -> HttpRequest {
    HttpRequest::get(SEARCH_CODE_URL)
        .query("q", format!("{LICENSE_QUERY} repo:{full_name}"))
        .query("per_page", 1)
}

impl Cache {
    /// Returns whether the pending repository `full_name` appears licensed,
    /// storing the result on its record.
    ///
    /// A stored result is returned without a request. Failed requests are
    /// retried under `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetriesExhausted`](crate::Error::RetriesExhausted)
    /// when a bounded policy runs out of attempts, or any non-transient
    /// error.
    #[instrument(skip(self, policy))]
    pub async fn check_license(&mut self, full_name: &str, policy: &RetryPolicy) -> Result<bool> {
        if let Some(licensed) = self.pending(full_name).and_then(|r| r.license) {
            return Ok(licensed);
        }

        debug!("checking for license");
        let request = license_request(full_name);
        let mut attempts = 0;
        let licensed = loop {
            attempts += 1;
            match self.count_license_hits(&request).await {
                Ok(hits) => break hits > 0,
                Err(e) => self.client().wait_before_retry(policy, attempts, e).await?,
            }
        };

        self.set_license(full_name, licensed);
        Ok(licensed)
    }

    async fn count_license_hits(&mut self, request: &HttpRequest) -> Result<u64> {
        let result: CodeSearch = self.github_request(request, true).await?.json()?;
        Ok(result.total_count)
    }
}
