//! Per-client rate limiting middleware.
//!
//! Generation calls are billed upstream, so a single client hammering the
//! endpoints is throttled here before any provider is contacted.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::http::response::ApiError;
use crate::observability::metrics;

/// A simple token bucket rate limiter.
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    /// Untouched for at least `idle` and back to full capacity.
    fn is_idle(&self, now: Instant, idle: Duration, capacity: f64, refill_rate: f64) -> bool {
        let elapsed = now.duration_since(self.last_update);
        elapsed >= idle && self.tokens + elapsed.as_secs_f64() * refill_rate >= capacity
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Shared limiter state, keyed by client IP.
pub struct RateLimiterState {
    buckets: DashMap<String, TokenBucket>,
    rps: f64,
    burst: f64,
}

impl RateLimiterState {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            rps: f64::from(config.requests_per_second),
            burst: f64::from(config.burst_size),
        }
    }

    /// Take one token for `key`; false when the bucket is empty.
    pub fn check(&self, key: &str) -> bool {
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.burst));

        bucket.try_acquire(self.burst, self.rps)
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }

    /// Drop buckets that have refilled and seen no traffic for `idle`.
    /// Returns how many were removed.
    pub fn evict_idle(&self, idle: Duration) -> usize {
        let before = self.buckets.len();
        let now = Instant::now();
        self.buckets
            .retain(|_, bucket| !bucket.is_idle(now, idle, self.burst, self.rps));
        before.saturating_sub(self.buckets.len())
    }
}

/// Middleware function for per-IP rate limiting.
pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if state.check(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "Rate limit exceeded");
        metrics::record_rate_limited("rps_limit");
        ApiError::RateLimited.into_response()
    }
}
