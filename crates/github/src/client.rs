//! HTTP client with rate-limit waits and retries.
//!
//! This module provides the [`GitHubClient`] struct, which pairs a
//! [`Transport`] with a [`Clock`]. The clock drives every wait (rate-limit
//! resets and retry delays) so the whole fetch path can be tested without
//! sleeping.

use std::sync::Arc;
use std::time::Duration;

use ghwatch_config::{RetryPolicy, Settings};
use ghwatch_protocol::{Clock, SystemClock};
use secrecy::SecretString;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::ratelimit::{RateLimitClass, RateLimitState};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// HTTP client shared by every fetcher.
///
/// Requests are sent one at a time. The client itself holds no rate-limit
/// state; callers pass the [`RateLimitState`] to use, which lets the cache
/// persist it.
///
/// # Examples
///
/// ```no_run
/// use ghwatch_config::Settings;
/// use ghwatch_github::GitHubClient;
///
/// # fn example() -> ghwatch_github::Result<()> {
/// let client = GitHubClient::from_settings(&Settings::default(), None)?;
/// println!("now: {}", client.now());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient").finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Creates a client from a transport and a clock.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        Self { transport, clock }
    }

    /// Creates a `reqwest`-backed client using the configured timeout and the
    /// real clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_settings(settings: &Settings, token: Option<SecretString>) -> Result<Self> {
        let transport = ReqwestTransport::new(settings.timeout(), token)?;
        Ok(Self::new(Arc::new(transport), Arc::new(SystemClock)))
    }

    /// Returns the clock.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Current time in epoch seconds.
    #[must_use]
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Sends a request without rate-limit accounting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if no response was received. The status
    /// is not checked.
    #[instrument(skip_all, fields(url = %request.url))]
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        debug!("requesting");
        self.transport.get(request).await
    }

    /// Sends a GitHub API request, waiting first if `state` says the bucket
    /// is exhausted, then updating `state` from the response headers.
    ///
    /// With `raise_for_status`, a non-2xx answer becomes [`Error::Status`];
    /// otherwise the response is returned as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or, with `raise_for_status`,
    /// if the status is not 2xx.
    #[instrument(skip_all, fields(url = %request.url, class = %RateLimitClass::of(&request.url)))]
    pub async fn send_rate_limited(
        &self,
        state: &mut RateLimitState,
        request: &HttpRequest,
        raise_for_status: bool,
    ) -> Result<HttpResponse> {
        let now = self.clock.now();
        if let Some(wait) = state.wait_secs(now) {
            info!(
                wake_at = state.reset,
                seconds = wait,
                "sleeping until rate limit reset"
            );
            self.clock.sleep(Duration::from_secs(wait)).await;
        }

        let response = self.transport.get(request).await?;
        state.update_from(&response);
        debug!(
            remain = state.remain,
            reset_in = state.reset - self.clock.now(),
            status = response.status,
            "GitHub API response"
        );

        if raise_for_status {
            response.error_for_status(&request.url)
        } else {
            Ok(response)
        }
    }

    /// Decides what to do after the `attempts`-th failed attempt.
    ///
    /// Returns `Ok(())` after sleeping for the policy delay when another
    /// attempt should be made.
    ///
    /// # Errors
    ///
    /// Returns `error` itself when it is not transient, or
    /// [`Error::RetriesExhausted`] when the policy allows no more attempts.
    pub async fn wait_before_retry(
        &self,
        policy: &RetryPolicy,
        attempts: u32,
        error: Error,
    ) -> Result<()> {
        if !error.is_transient() {
            return Err(error);
        }
        if !policy.should_retry(attempts) {
            warn!(attempts, error = %error, "giving up");
            return Err(Error::RetriesExhausted {
                attempts,
                last: Box::new(error),
            });
        }

        warn!(
            attempts,
            error = %error,
            delay_secs = policy.delay_secs,
            "request failed, retrying"
        );
        self.clock.sleep(policy.delay()).await;
        Ok(())
    }
}
