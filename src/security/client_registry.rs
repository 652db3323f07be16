//! Per-client rate limiter state.
//!
//! # Responsibilities
//! - Map a client identifier to its token bucket and last-activity time
//! - Admit or deny a single request for a client
//! - Periodically reclaim entries for clients that went quiet
//!
//! # Design Decisions
//! - Sharded map (`DashMap`): a check holds one shard lock for the refill
//!   arithmetic only, never across downstream work
//! - Entries are created lazily with a full bucket
//! - The reclamation loop is tied to the shutdown coordinator

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time::{self, Instant};

use crate::observability::metrics;
use crate::security::token_bucket::TokenBucket;

/// How often idle clients are swept.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// How long a client may stay idle before its state is reclaimed.
pub const IDLE_TTL: Duration = Duration::from_secs(3 * 60);

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Denied; `retry_after` is the wait until the next token, if one will ever come.
    Rejected { retry_after: Option<Duration> },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

#[derive(Debug)]
struct ClientState {
    bucket: TokenBucket,
    last_seen: Instant,
}

impl ClientState {
    fn admit(&mut self, now: Instant) -> Admission {
        if self.bucket.try_acquire(now) {
            self.last_seen = now;
            Admission::Admitted
        } else {
            Admission::Rejected {
                retry_after: self.bucket.time_until_available(),
            }
        }
    }
}

/// Concurrent store of rate limiter state, keyed by client identifier.
#[derive(Debug)]
pub struct ClientRegistry {
    clients: DashMap<String, ClientState>,
    capacity: f64,
    refill_rate: f64,
    idle_ttl: Duration,
}

impl ClientRegistry {
    /// Create a registry whose buckets refill at `requests_per_second` up to `burst`.
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        Self {
            clients: DashMap::new(),
            capacity: f64::from(burst),
            refill_rate: requests_per_second,
            idle_ttl: IDLE_TTL,
        }
    }

    /// Record a request from `identifier`; returns whether it is admitted.
    pub fn touch(&self, identifier: &str) -> bool {
        self.touch_at(identifier, Instant::now())
    }

    /// Same as [`touch`](Self::touch) with an explicit clock.
    pub fn touch_at(&self, identifier: &str, now: Instant) -> bool {
        self.check_at(identifier, now).is_admitted()
    }

    /// Like [`touch`](Self::touch), but a rejection carries the wait until
    /// the client's next token.
    pub fn check(&self, identifier: &str) -> Admission {
        self.check_at(identifier, Instant::now())
    }

    pub fn check_at(&self, identifier: &str, now: Instant) -> Admission {
        if let Some(mut state) = self.clients.get_mut(identifier) {
            return state.admit(now);
        }

        let mut state = self
            .clients
            .entry(identifier.to_owned())
            .or_insert_with(|| ClientState {
                bucket: TokenBucket::new(self.capacity, self.refill_rate, now),
                last_seen: now,
            });
        state.admit(now)
    }

    /// Remove every client idle for longer than the threshold. Returns the number removed.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    /// Same as [`evict_idle`](Self::evict_idle) with an explicit clock.
    pub fn evict_idle_at(&self, now: Instant) -> usize {
        let mut evicted = 0;
        self.clients.retain(|_, state| {
            let keep = now.saturating_duration_since(state.last_seen) <= self.idle_ttl;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Sweep idle clients every `interval` until shutdown is signalled.
    pub async fn run_reaper(self: Arc<Self>, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = interval.as_secs(),
            idle_ttl_secs = self.idle_ttl.as_secs(),
            "Client reaper starting"
        );

        let mut ticker = time::interval_at(Instant::now() + interval, interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = self.evict_idle();
                    let remaining = self.len();
                    metrics::record_tracked_clients(remaining);
                    if evicted > 0 {
                        tracing::debug!(evicted, remaining, "Reclaimed idle clients");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Client reaper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;

    #[test]
    fn burst_then_refill() {
        let registry = ClientRegistry::new(2.0, 4);
        let t0 = Instant::now();

        for _ in 0..4 {
            assert!(registry.touch_at("10.0.0.1", t0));
        }
        assert!(!registry.touch_at("10.0.0.1", t0));

        let later = t0 + Duration::from_millis(500);
        assert!(registry.touch_at("10.0.0.1", later));
        assert!(!registry.touch_at("10.0.0.1", later));
    }

    #[test]
    fn rejection_reports_wait_for_next_token() {
        let registry = ClientRegistry::new(0.01, 1);
        let t0 = Instant::now();

        assert_eq!(registry.check_at("slow", t0), Admission::Admitted);
        assert_eq!(
            registry.check_at("slow", t0),
            Admission::Rejected {
                retry_after: Some(Duration::from_secs(100))
            }
        );
    }

    #[test]
    fn clients_are_independent() {
        let registry = ClientRegistry::new(1.0, 1);
        let t0 = Instant::now();

        assert!(registry.touch_at("a", t0));
        assert!(!registry.touch_at("a", t0));
        assert!(registry.touch_at("b", t0));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn idle_clients_are_evicted_and_start_fresh() {
        let registry = ClientRegistry::new(0.1, 3);
        let t0 = Instant::now();

        for _ in 0..3 {
            assert!(registry.touch_at("10.0.0.1", t0));
        }
        assert!(!registry.touch_at("10.0.0.1", t0));

        assert_eq!(registry.evict_idle_at(t0 + IDLE_TTL), 0);
        assert_eq!(registry.evict_idle_at(t0 + IDLE_TTL + Duration::from_secs(1)), 1);
        assert!(registry.is_empty());

        // A returning client gets the full burst again.
        let back = t0 + IDLE_TTL + Duration::from_secs(2);
        for _ in 0..3 {
            assert!(registry.touch_at("10.0.0.1", back));
        }
        assert!(!registry.touch_at("10.0.0.1", back));
    }

    #[test]
    fn admitted_request_refreshes_last_seen() {
        let registry = ClientRegistry::new(1.0, 2);
        let t0 = Instant::now();

        registry.touch_at("a", t0);
        registry.touch_at("a", t0 + Duration::from_secs(120));

        assert_eq!(registry.evict_idle_at(t0 + Duration::from_secs(240)), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn concurrent_touches_never_over_admit() {
        let registry = Arc::new(ClientRegistry::new(0.0001, 50));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    (0..20).filter(|_| registry.touch("shared")).count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn reaper_evicts_idle_clients() {
        let registry = Arc::new(ClientRegistry::new(1.0, 1));
        registry.touch("quiet");
        registry.touch("busy");

        let shutdown = Shutdown::new();
        let handle = tokio::spawn(registry.clone().run_reaper(SWEEP_INTERVAL, shutdown.subscribe()));

        time::sleep(Duration::from_secs(150)).await;
        registry.touch("busy");
        time::sleep(Duration::from_secs(100)).await;

        assert_eq!(registry.len(), 1);

        shutdown.trigger();
        time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reaper should stop on shutdown")
            .unwrap();
    }
}
