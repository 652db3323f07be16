//! Token bucket arithmetic.
//!
//! The bucket is refilled lazily: nothing ticks in the background, tokens are
//! recomputed from elapsed time whenever the bucket is consulted.

use std::time::Duration;

use tokio::time::Instant;

/// A token bucket with a fixed capacity and refill rate.
///
/// Invariant: `0 <= tokens <= capacity`.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket.
    pub fn new(capacity: f64, refill_rate: f64, now: Instant) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            capacity,
            refill_rate: refill_rate.max(0.0),
            tokens: capacity,
            last_refill: now,
        }
    }

    /// Add tokens for the time elapsed since the last refill, saturating at capacity.
    pub fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        if elapsed.is_zero() {
            return;
        }
        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Refill, then take one token if available.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        self.refill(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time until one token is available, as of the last refill.
    ///
    /// `None` when the bucket never refills.
    pub fn time_until_available(&self) -> Option<Duration> {
        if self.tokens >= 1.0 {
            return Some(Duration::ZERO);
        }
        if self.refill_rate <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64((1.0 - self.tokens) / self.refill_rate).ok()
    }

    /// Tokens currently held (as of the last refill).
    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}
