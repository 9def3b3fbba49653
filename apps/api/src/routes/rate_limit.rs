//! Token-bucket rate limit applied to every route, one bucket per client IP.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

pub const WINDOW: Duration = Duration::from_secs(60);

/// Above this many tracked clients, buckets that have fully refilled are dropped.
const PRUNE_THRESHOLD: usize = 1024;

/// Who a request is charged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKey {
    Ip(IpAddr),
    /// No peer address available (e.g. served without connect info).
    Unknown,
}

impl ClientKey {
    fn of(request: &Request) -> Self {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| ClientKey::Ip(addr.ip()))
            .unwrap_or(ClientKey::Unknown)
    }
}

struct Bucket {
    tokens: f64,
    last: Instant,
}

/// `capacity` requests per `window` for each client, refilled continuously.
#[derive(Clone)]
pub struct RateLimiter {
    capacity: f64,
    window: Duration,
    buckets: Arc<Mutex<HashMap<ClientKey, Bucket>>>,
}

impl RateLimiter {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity: capacity.max(1) as f64,
            window,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn per_minute(capacity: u32) -> Self {
        Self::new(capacity, WINDOW)
    }

    /// Takes one token from `client`'s bucket if available.
    pub fn try_acquire(&self, client: ClientKey) -> bool {
        self.try_acquire_at(client, Instant::now())
    }

    fn try_acquire_at(&self, client: ClientKey, now: Instant) -> bool {
        let mut buckets = self.buckets.lock();

        if buckets.len() > PRUNE_THRESHOLD {
            let window = self.window;
            buckets.retain(|_, b| now.saturating_duration_since(b.last) < window);
        }

        let capacity = self.capacity;
        let bucket = buckets.entry(client).or_insert(Bucket {
            tokens: capacity,
            last: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last);
        let refill = elapsed.as_secs_f64() / self.window.as_secs_f64() * capacity;
        bucket.tokens = (bucket.tokens + refill).min(capacity);
        bucket.last = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.buckets.lock().len()
    }
}

/// Middleware: rejects with 429 once the caller's bucket is empty.
pub async fn enforce(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = ClientKey::of(&request);
    if !state.rate_limiter.try_acquire(client) {
        warn!(
            "Rate limit exceeded for {client:?}: {} {}",
            request.method(),
            request.uri().path()
        );
        return Err(AppError::RateLimited);
    }
    Ok(next.run(request).await)
}
