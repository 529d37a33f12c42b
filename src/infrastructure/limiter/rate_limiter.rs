use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::{task::JoinHandle, time::sleep};

/// Weighted sliding window: the previous window's count decays linearly as
/// the current window advances.
#[derive(Debug)]
pub struct SlidingWindow {
    window_size: Duration,
    limit: u64,
    current_window_start: Instant,
    current_count: u64,
    prev_count: u64,
}

impl SlidingWindow {
    fn new(window_size: Duration, limit: u64, now: Instant) -> Self {
        Self {
            window_size,
            limit,
            current_window_start: now,
            current_count: 0,
            prev_count: 0,
        }
    }

    fn roll(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.current_window_start);
        if elapsed >= self.window_size * 2 {
            self.prev_count = 0;
            self.current_count = 0;
            self.current_window_start = now;
        } else if elapsed >= self.window_size {
            self.prev_count = self.current_count;
            self.current_count = 0;
            self.current_window_start += self.window_size;
        }
    }

    fn effective(&self, now: Instant) -> f64 {
        let elapsed = now.duration_since(self.current_window_start);
        let weight = (elapsed.as_secs_f64() / self.window_size.as_secs_f64()).min(1.0);
        (self.prev_count as f64) * (1.0 - weight) + (self.current_count as f64)
    }

    fn allow(&mut self, now: Instant) -> RateDecision {
        self.roll(now);

        let effective = self.effective(now);
        let reset_after = self
            .window_size
            .saturating_sub(now.duration_since(self.current_window_start));

        if effective + 1.0 <= self.limit as f64 {
            self.current_count += 1;
            RateDecision {
                allowed: true,
                limit: self.limit,
                remaining: (self.limit as f64 - effective - 1.0).floor().max(0.0) as u64,
                reset_after,
            }
        } else {
            RateDecision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
                reset_after,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    pub reset_after: Duration,
}

impl RateDecision {
    /// Whole seconds until the current window closes, at least one.
    pub fn reset_secs(&self) -> u64 {
        self.reset_after.as_secs().max(1)
    }
}

#[derive(Debug)]
struct ClientWindow {
    window: SlidingWindow,
    last_seen: Instant,
}

type Key = String;

/// Per-client windows keyed by address.
#[derive(Clone)]
pub struct RateLimiterStore {
    map: Arc<DashMap<Key, Arc<Mutex<ClientWindow>>>>,
    window_size: Duration,
    limit: u64,
}

impl RateLimiterStore {
    pub fn new(window_size: Duration, limit: u64) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            window_size,
            limit,
        }
    }

    fn get_window(&self, key: &str, now: Instant) -> Arc<Mutex<ClientWindow>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }

        self.map
            .entry(key.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(ClientWindow {
                    window: SlidingWindow::new(self.window_size, self.limit, now),
                    last_seen: now,
                }))
            })
            .clone()
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let entry = self.get_window(key, now);
        let mut client = entry.lock();
        client.last_seen = now;
        client.window.allow(now)
    }

    /// Drops clients idle for longer than two windows.
    pub fn evict_idle(&self) -> usize {
        let ttl = self.window_size * 2;
        let now = Instant::now();
        let before = self.map.len();
        self.map.retain(|_, client| now.duration_since(client.lock().last_seen) <= ttl);
        before - self.map.len()
    }

    /// Periodically evicts idle clients. Abort the handle to stop it.
    pub fn spawn_eviction(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                sleep(every).await;
                let evicted = store.evict_idle();
                if evicted > 0 {
                    tracing::debug!(evicted, "Evicted idle rate limiter entries");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_limit_then_rejects() {
        let store = RateLimiterStore::new(Duration::from_secs(60), 3);
        let now = Instant::now();

        for expected_remaining in [2, 1, 0] {
            let decision = store.check_at("10.0.0.1", now);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let rejected = store.check_at("10.0.0.1", now);
        assert!(!rejected.allowed);
        assert_eq!(rejected.limit, 3);
    }

    #[test]
    fn clients_are_tracked_independently() {
        let store = RateLimiterStore::new(Duration::from_secs(60), 1);
        let now = Instant::now();

        assert!(store.check_at("a", now).allowed);
        assert!(!store.check_at("a", now).allowed);
        assert!(store.check_at("b", now).allowed);
        assert_eq!(store.map.len(), 2);
    }

    #[test]
    fn previous_window_decays() {
        let window = Duration::from_secs(10);
        let start = Instant::now();
        let mut sliding = SlidingWindow::new(window, 4, start);

        for _ in 0..4 {
            assert!(sliding.allow(start).allowed);
        }
        assert!(!sliding.allow(start + Duration::from_secs(5)).allowed);

        // Halfway into the next window half of the previous count still applies.
        let halfway = start + Duration::from_secs(15);
        assert!(sliding.allow(halfway).allowed);
        assert!(sliding.allow(halfway).allowed);
        assert!(!sliding.allow(halfway).allowed);
    }

    #[test]
    fn long_idle_resets_counts() {
        let window = Duration::from_secs(10);
        let start = Instant::now();
        let mut sliding = SlidingWindow::new(window, 1, start);

        assert!(sliding.allow(start).allowed);
        assert!(sliding.allow(start + Duration::from_secs(25)).allowed);
    }
}
