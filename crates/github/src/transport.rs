//! HTTP transport seam.
//!
//! Every remote call goes through a [`Transport`]. Production code uses
//! [`ReqwestTransport`]; tests script responses with
//! [`MockTransport`](crate::mock::MockTransport).

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Host that receives the GitHub token. Other feeds never see it.
const GITHUB_API_HOST: &str = "https://api.github.com/";

/// A GET request.
///
/// # Examples
///
/// ```
/// use ghwatch_github::HttpRequest;
///
/// let request = HttpRequest::get("https://api.github.com/search/repositories")
///     .query("q", "language:rust")
///     .header("Accept", "application/vnd.github.v3+json");
/// assert_eq!(request.query, vec![("q".to_string(), "language:rust".to_string())]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL, without query string.
    pub url: String,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Creates a GET request for `url`.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Appends a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the value of query parameter `name`.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A response with its body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: BTreeMap<String, String>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response without headers.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header; the name is lowercased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Returns an error for non-2xx statuses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] unless the status is 2xx.
    pub fn error_for_status(self, url: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Status {
                status: self.status,
                url: url.to_string(),
            })
        }
    }
}

/// Performs HTTP requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a GET request and reads the whole body.
    ///
    /// A non-2xx status is not an error at this level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if no response was received.
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by `reqwest`.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use ghwatch_github::{HttpRequest, ReqwestTransport, Transport};
///
/// # async fn example() -> ghwatch_github::Result<()> {
/// let transport = ReqwestTransport::new(Duration::from_secs(10), None)?;
/// let response = transport
///     .get(&HttpRequest::get("https://www.reddit.com/r/coolgithubprojects/new/.json"))
///     .await?;
/// println!("HTTP {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ReqwestTransport {
    client: Client,
    token: Option<SecretString>,
}

impl ReqwestTransport {
    /// Creates a transport with a per-request timeout and an optional GitHub
    /// token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    #[instrument(skip(token), fields(authenticated = token.is_some()))]
    pub fn new(timeout: Duration, token: Option<SecretString>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("ghwatch/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, token })
    }

    /// Returns whether requests to the GitHub API carry a token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = self
            .token
            .as_ref()
            .filter(|_| request.url.starts_with(GITHUB_API_HOST))
        {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let transport_error = |e: reqwest::Error| Error::Transport {
            url: request.url.clone(),
            reason: e.to_string(),
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(transport_error)?.to_vec();
        debug!(url = %request.url, status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_collects_query_and_headers() {
        let request = HttpRequest::get("https://example.com")
            .query("per_page", 1)
            .header("Accept", "text/plain");
        assert_eq!(request.query_value("per_page"), Some("1"));
        assert_eq!(request.query_value("q"), None);
        assert_eq!(
            request.headers,
            vec![("Accept".to_string(), "text/plain".to_string())]
        );
    }

    #[test]
    fn response_headers_are_case_insensitive() {
        let response = HttpResponse::new(200, "").with_header("X-RateLimit-Remaining", 4);
        assert_eq!(response.header("x-ratelimit-remaining"), Some("4"));
        assert_eq!(response.header("X-RATELIMIT-REMAINING"), Some("4"));
    }

    #[test]
    fn error_for_status() {
        assert!(HttpResponse::new(204, "").error_for_status("u").is_ok());
        let err = HttpResponse::new(404, "").error_for_status("u").unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
    }

    #[test]
    fn json_body() {
        let response = HttpResponse::new(200, r#"{"total_count": 3}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["total_count"], 3);
        assert!(HttpResponse::new(200, "<html>").json::<serde_json::Value>().is_err());
    }

    #[test]
    fn reqwest_transport_builds() {
        let transport = ReqwestTransport::new(Duration::from_secs(1), None).unwrap();
        assert!(!transport.is_authenticated());
    }
}
