//! README lookup.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::instrument;

use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::transport::HttpRequest;

/// Media type asking for the README as a JSON object with encoded content.
pub const README_ACCEPT: &str = "application/vnd.github.v3.object";

/// Returns the README endpoint of `full_name`.
#[must_use]
pub fn readme_url(full_name: &str) -> String {
    format!("https://api.github.com/repos/{full_name}/readme")
}

/// A decoded README.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readme {
    /// File name, e.g. `README.md`.
    pub name: String,
    /// Raw file content.
    pub content: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct ReadmeObject {
    name: String,
    encoding: String,
    content: String,
}

impl ReadmeObject {
    fn decode(self) -> Result<Readme> {
        if self.encoding != "base64" {
            return Err(Error::UnsupportedEncoding(self.encoding));
        }
        // The API wraps base64 content at 60 columns
        let compact: String = self
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        Ok(Readme {
            name: self.name,
            content: STANDARD.decode(compact)?,
        })
    }
}

impl Cache {
    /// Fetches the README of `full_name`; `None` when the repository has
    /// none.
    ///
    /// # Errors
    ///
    /// Returns an error for failed requests, non-404 error statuses, and
    /// content that is not valid base64.
    #[instrument(skip(self))]
    pub async fn fetch_readme(&mut self, full_name: &str) -> Result<Option<Readme>> {
        let url = readme_url(full_name);
        let request = HttpRequest::get(&url).header("Accept", README_ACCEPT);

        let response = self.github_request(&request, false).await?;
        if response.status == 404 {
            return Ok(None);
        }

        let object: ReadmeObject = response.error_for_status(&url)?.json()?;
        object.decode().map(Some)
    }
}
