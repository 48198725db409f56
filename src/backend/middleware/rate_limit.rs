/**
 * Request Rate Limiting
 *
 * Caps the number of `/api` requests a single client IP may make within a
 * fixed window. The client is identified by the socket peer address that
 * `axum::serve` attaches as `ConnectInfo<SocketAddr>`; requests without
 * one share a single bucket.
 *
 * # Behavior
 *
 * - Each client gets a window that opens on its first request
 * - Up to `max_requests` requests pass inside the window
 * - Further requests are answered 429 with a `Retry-After` header
 * - Expired windows are dropped by `prune_expired`, called from the
 *   server's background maintenance task
 */

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::backend::error::BackendError;

#[derive(Debug, Clone, Copy)]
struct Window {
    opened_at: Instant,
    count: u32,
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    Denied { retry_after: Duration },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed)
    }
}

/// Fixed-window request counter keyed by client IP
///
/// Cheap to clone; all clones share the same counters.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Arc<Mutex<HashMap<Option<IpAddr>, Window>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Option<IpAddr>, Window>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count one request from `client` at `now`
    pub fn check(&self, client: Option<IpAddr>, now: Instant) -> RateLimitResult {
        let mut clients = self.lock();
        let window = clients.entry(client).or_insert(Window {
            opened_at: now,
            count: 0,
        });

        let elapsed = now.saturating_duration_since(window.opened_at);
        if elapsed >= self.window {
            *window = Window {
                opened_at: now,
                count: 0,
            };
        }

        if window.count < self.max_requests {
            window.count += 1;
            RateLimitResult::Allowed
        } else {
            RateLimitResult::Denied {
                retry_after: self.window.saturating_sub(elapsed),
            }
        }
    }

    /// Drop windows that have fully elapsed
    ///
    /// # Returns
    /// Number of clients forgotten
    pub fn prune_expired(&self, now: Instant) -> usize {
        let mut clients = self.lock();
        let before = clients.len();
        clients.retain(|_, w| now.saturating_duration_since(w.opened_at) < self.window);
        before - clients.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }
}

/// Rate limiting middleware for the `/api` routes
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match limiter.check(client, Instant::now()) {
        RateLimitResult::Allowed => next.run(request).await,
        RateLimitResult::Denied { retry_after } => {
            tracing::warn!(client = ?client, "Rate limit exceeded");
            let mut response = BackendError::too_many_requests(
                "Too many requests from this IP, please try again later",
            )
            .into_response();
            let secs = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
            response
        }
    }
}
