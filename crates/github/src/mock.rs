//! Scripted [`Transport`] for tests.
//!
//! Responses are registered per URL substring and served in order; the last
//! response registered for a route keeps being served once the others are
//! used up. Every request is recorded, stamped with the clock time when a
//! clock is attached.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use ghwatch_protocol::Clock;

use crate::error::{Error, Result};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// The request as sent.
    pub request: HttpRequest,
    /// Clock time when it was sent, if a clock is attached.
    pub at: Option<i64>,
}

#[derive(Debug, Clone)]
enum Reply {
    Response(HttpResponse),
    Fail(String),
}

struct Route {
    pattern: String,
    replies: VecDeque<Reply>,
}

/// Test [`Transport`] serving canned responses.
///
/// # Examples
///
/// ```
/// use ghwatch_github::{HttpRequest, HttpResponse, MockTransport, Transport};
///
/// # async fn example() -> ghwatch_github::Result<()> {
/// let transport = MockTransport::new();
/// transport.respond("/search/code", HttpResponse::new(200, r#"{"total_count": 1}"#));
///
/// let response = transport
///     .get(&HttpRequest::get("https://api.github.com/search/code"))
///     .await?;
/// assert_eq!(response.status, 200);
/// assert_eq!(transport.requests().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
    clock: Option<Arc<dyn Clock>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// Creates a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that stamps requests with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock: Some(clock),
            ..Self::default()
        }
    }

    /// Queues `response` for URLs containing `pattern`.
    pub fn respond(&self, pattern: &str, response: HttpResponse) {
        self.push(pattern, Reply::Response(response));
    }

    /// Queues a JSON response for URLs containing `pattern`.
    pub fn respond_json(&self, pattern: &str, status: u16, body: &serde_json::Value) {
        self.respond(pattern, HttpResponse::new(status, body.to_string()));
    }

    /// Queues a transport failure for URLs containing `pattern`.
    pub fn fail(&self, pattern: &str, reason: &str) {
        self.push(pattern, Reply::Fail(reason.to_string()));
    }

    /// Returns every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Returns the requests whose URL contains `pattern`.
    #[must_use]
    pub fn requests_to(&self, pattern: &str) -> Vec<RecordedRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.request.url.contains(pattern))
            .cloned()
            .collect()
    }

    fn push(&self, pattern: &str, reply: Reply) {
        let mut routes = lock(&self.routes);
        match routes.iter_mut().find(|r| r.pattern == pattern) {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                pattern: pattern.to_string(),
                replies: VecDeque::from([reply]),
            }),
        }
    }

    fn next_reply(&self, url: &str) -> Option<Reply> {
        let mut routes = lock(&self.routes);
        let route = routes.iter_mut().find(|r| url.contains(&r.pattern))?;
        if route.replies.len() > 1 {
            route.replies.pop_front()
        } else {
            route.replies.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
        lock(&self.requests).push(RecordedRequest {
            request: request.clone(),
            at: self.clock.as_ref().map(|c| c.now()),
        });

        match self.next_reply(&request.url) {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Fail(reason)) => Err(Error::Transport {
                url: request.url.clone(),
                reason,
            }),
            None => Err(Error::Transport {
                url: request.url.clone(),
                reason: "no mock response registered".to_string(),
            }),
        }
    }
}
