//! Fixed-window rate limiting for the public redirect surface
//!
//! Counting happens in a [`CounterStore`]; the limiter owns only the
//! window arithmetic and the fail-open policy. A broken counter backend
//! takes out the limit enforcement, never the redirects themselves.

pub mod store;

use std::time::Duration;

use tracing::warn;

pub use store::{CounterStore, MemoryCounterStore, RedisCounterStore};

use crate::config::RateLimitConfig;

/// Outcome of one rate-limit check, carrying what the response headers
/// need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
}

pub struct FixedWindowLimiter {
    store: Box<dyn CounterStore>,
    limit: u64,
    window: Duration,
}

impl FixedWindowLimiter {
    pub fn new(store: Box<dyn CounterStore>, config: &RateLimitConfig) -> Self {
        Self {
            store,
            limit: config.redirect_limit.max(1),
            window: Duration::from_secs(config.window_secs.max(1)),
        }
    }

    /// Count one hit for this route/client pair and decide. Counter
    /// failures log and allow: dropped redirects cost more than a
    /// briefly unenforced limit.
    pub async fn check(&self, route_key: &str, client_key: &str) -> RateDecision {
        let key = format!("rl:{}:{}", route_key, client_key);

        let count = match self.store.incr_and_expire(&key, self.window).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Rate limit counter unavailable, failing open: {}", e);
                return RateDecision {
                    allowed: true,
                    limit: self.limit,
                    remaining: self.limit,
                };
            }
        };

        RateDecision {
            allowed: count <= self.limit,
            limit: self.limit,
            remaining: self.limit.saturating_sub(count),
        }
    }
}
