//! GitHub API rate-limit bookkeeping.
//!
//! GitHub limits the search endpoints separately from the rest of the API,
//! so the state is tracked per [`RateLimitClass`] and persisted in the cache
//! file between runs.

use serde::{Deserialize, Serialize};

use crate::transport::HttpResponse;

/// Header carrying the number of requests left in the window.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Header carrying the epoch second at which the window resets.
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// GitHub API rate-limit buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitClass {
    /// `/search/` endpoints.
    Search,
    /// Everything else.
    General,
}

impl RateLimitClass {
    /// Classifies a request URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghwatch_github::RateLimitClass;
    ///
    /// assert_eq!(
    ///     RateLimitClass::of("https://api.github.com/search/code"),
    ///     RateLimitClass::Search
    /// );
    /// assert_eq!(
    ///     RateLimitClass::of("https://api.github.com/repos/a/b/readme"),
    ///     RateLimitClass::General
    /// );
    /// ```
    #[must_use]
    pub fn of(url: &str) -> Self {
        if url.contains("/search/") {
            Self::Search
        } else {
            Self::General
        }
    }

    /// Key under which the state is stored.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for RateLimitClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remaining requests and reset time of one bucket.
///
/// The default (`remain: 1, reset: 0`) never blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitState {
    /// Requests left in the current window.
    pub remain: i64,
    /// Epoch second at which the window resets.
    pub reset: i64,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self {
            remain: 1,
            reset: 0,
        }
    }
}

impl RateLimitState {
    /// Returns how many seconds to wait before the next request, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghwatch_github::RateLimitState;
    ///
    /// let state = RateLimitState { remain: 0, reset: 1_060 };
    /// assert_eq!(state.wait_secs(1_000), Some(60));
    /// assert_eq!(state.wait_secs(1_060), None);
    /// assert_eq!(RateLimitState::default().wait_secs(1_000), None);
    /// ```
    #[must_use]
    pub fn wait_secs(&self, now: i64) -> Option<u64> {
        if self.remain == 0 && self.reset > now {
            u64::try_from(self.reset - now).ok()
        } else {
            None
        }
    }

    /// Updates the state from response headers.
    ///
    /// Missing or unparsable headers keep the previous values.
    pub fn update_from(&mut self, response: &HttpResponse) {
        if let Some(remain) = parse_header(response, REMAINING_HEADER) {
            self.remain = remain;
        }
        if let Some(reset) = parse_header(response, RESET_HEADER) {
            self.reset = reset;
        }
    }
}

fn parse_header(response: &HttpResponse, name: &str) -> Option<i64> {
    response.header(name).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_urls() {
        assert_eq!(
            RateLimitClass::of("https://api.github.com/search/repositories"),
            RateLimitClass::Search
        );
        assert_eq!(RateLimitClass::of("https://api.github.com/"), RateLimitClass::General);
        assert_eq!(RateLimitClass::Search.to_string(), "search");
    }

    #[test]
    fn update_from_headers() {
        let mut state = RateLimitState::default();
        let response = HttpResponse::new(200, "")
            .with_header("X-RateLimit-Remaining", 9)
            .with_header("X-RateLimit-Reset", 1_700_000_000);
        state.update_from(&response);
        assert_eq!(state, RateLimitState { remain: 9, reset: 1_700_000_000 });
    }

    #[test]
    fn missing_headers_keep_previous_values() {
        let mut state = RateLimitState { remain: 3, reset: 77 };
        state.update_from(&HttpResponse::new(200, "").with_header("x-ratelimit-remaining", "oops"));
        assert_eq!(state, RateLimitState { remain: 3, reset: 77 });
    }

    #[test]
    fn wait_only_when_exhausted_and_reset_in_future() {
        assert_eq!(RateLimitState { remain: 1, reset: 500 }.wait_secs(100), None);
        assert_eq!(RateLimitState { remain: 0, reset: 50 }.wait_secs(100), None);
        assert_eq!(RateLimitState { remain: 0, reset: 101 }.wait_secs(100), Some(1));
    }
}
