//! Per-client sliding-window rate limiting.
//!
//! A [`RateLimiter`] is constructed once per server and held in
//! [`AppState`](crate::state::AppState). The [`enforce_rate_limit`]
//! middleware keys clients by peer IP when the server was started with
//! connect info, and lumps everyone else under `unknown`.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::OracleError;
use crate::state::AppState;

/// Default request budget per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 30;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Key used when the peer address is unavailable.
const UNKNOWN_CLIENT: &str = "unknown";

/// Tracked clients above which idle entries are swept.
const PRUNE_THRESHOLD: usize = 1024;

/// Sliding-window request counter keyed by client.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    calls: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// A limiter allowing `max_requests` per client within any `window`.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `client` now. Returns `false` if it must be
    /// refused.
    pub async fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now()).await
    }

    /// Record a request from `client` at `now`.
    ///
    /// Refused requests are not recorded, so a client that keeps hammering
    /// is let back in once its oldest accepted request leaves the window.
    pub async fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut calls = self.calls.lock().await;
        if calls.len() >= PRUNE_THRESHOLD {
            prune_idle(&mut calls, now, self.window);
        }
        let recent = calls.entry(client.to_owned()).or_default();
        while recent
            .front()
            .is_some_and(|&at| now.saturating_duration_since(at) >= self.window)
        {
            recent.pop_front();
        }

        let limit = usize::try_from(self.max_requests).unwrap_or(usize::MAX);
        if recent.len() >= limit {
            return false;
        }
        recent.push_back(now);
        true
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.calls.lock().await.len()
    }
}

/// Drop clients with no requests inside the window as of `now`.
fn prune_idle(calls: &mut HashMap<String, VecDeque<Instant>>, now: Instant, window: Duration) {
    calls.retain(|_, recent| {
        recent
            .back()
            .is_some_and(|&at| now.saturating_duration_since(at) < window)
    });
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

/// Middleware refusing requests over the client's budget with HTTP 429.
pub async fn enforce_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, OracleError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| UNKNOWN_CLIENT.to_owned(), |ConnectInfo(addr)| addr.ip().to_string());

    if !state.rate_limiter.check(&client).await {
        warn!(client = %client, path = %request.uri().path(), "rate limit exceeded");
        return Err(OracleError::RateLimited);
    }
    Ok(next.run(request).await)
}
