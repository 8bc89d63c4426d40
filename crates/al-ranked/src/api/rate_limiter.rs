//! Client-side rate limiter.
//!
//! Enforces both a minimum spacing between requests and a sliding
//! per-minute cap, so AniList's 429 answers stay the exception.

use shared::config::RateLimitConfig;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

const WINDOW: Duration = Duration::from_secs(60);

/// Longest spacing ever enforced between two requests
const MAX_INTERVAL: Duration = Duration::from_secs(3600);

/// Rate limiter with dual constraints (per-second and per-minute)
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between two requests
    min_interval: Duration,
    /// Maximum requests per sliding minute
    max_per_minute: usize,
    /// Last request timestamp
    last_request: Option<Instant>,
    /// Request timestamps in the last minute, oldest first
    recent_requests: VecDeque<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(max_per_second: f64, max_per_minute: u32) -> Self {
        let min_interval = if max_per_second > 0.0 {
            Duration::try_from_secs_f64(1.0 / max_per_second)
                .unwrap_or(MAX_INTERVAL)
                .min(MAX_INTERVAL)
        } else {
            Duration::ZERO
        };
        let max_per_minute = max_per_minute.max(1) as usize;

        Self {
            min_interval,
            max_per_minute,
            last_request: None,
            recent_requests: VecDeque::with_capacity(max_per_minute),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests_per_second, config.requests_per_minute)
    }

    /// Wait until a request can be made, respecting both rate limits
    pub async fn acquire(&mut self) {
        self.prune(Instant::now());

        if self.recent_requests.len() >= self.max_per_minute {
            if let Some(&oldest) = self.recent_requests.front() {
                let wait = WINDOW.saturating_sub(oldest.elapsed());
                if !wait.is_zero() {
                    debug!(wait_ms = wait.as_millis() as u64, "Rate limit: waiting for per-minute window");
                    sleep(wait).await;
                }
            }
            self.prune(Instant::now());
        }

        if let Some(last) = self.last_request {
            let wait = self.min_interval.saturating_sub(last.elapsed());
            if !wait.is_zero() {
                debug!(wait_ms = wait.as_millis() as u64, "Rate limit: waiting for request spacing");
                sleep(wait).await;
            }
        }

        let now = Instant::now();
        self.last_request = Some(now);
        self.recent_requests.push_back(now);
    }

    /// Number of requests made in the last minute
    pub fn current_minute_count(&mut self) -> usize {
        self.prune(Instant::now());
        self.recent_requests.len()
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.recent_requests.front() {
            if now.duration_since(oldest) >= WINDOW {
                self.recent_requests.pop_front();
            } else {
                break;
            }
        }
    }
}
