// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed-window admission limiter.
//!
//! Counts requests per client key in windows that start with the client's
//! first request and last `window_ms`. The table lives in this process only,
//! so each instance enforces its own budget.

use crate::time_utils::now_unix_millis;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};

/// On average one admit call in this many also sweeps expired windows.
const DEFAULT_SWEEP_ONE_IN: u16 = 100;

/// Counter for one client key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub count: u32,
    /// Unix milliseconds after which the window is replaced
    pub reset_at_ms: u64,
}

impl RateWindow {
    fn open(now_ms: u64, window_ms: u64) -> Self {
        Self {
            count: 1,
            reset_at_ms: now_ms.saturating_add(window_ms),
        }
    }

    fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.reset_at_ms
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at_ms: u64,
}

impl Admission {
    /// Whole seconds until the window resets, rounded up.
    pub fn retry_after_secs(&self, now_ms: u64) -> u64 {
        self.reset_at_ms.saturating_sub(now_ms).div_ceil(1000)
    }
}

/// Per-client request counters.
pub struct AdmissionLimiter {
    windows: DashMap<String, RateWindow>,
    rng: SystemRandom,
    sweep_one_in: u16,
}

impl Default for AdmissionLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionLimiter {
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
            rng: SystemRandom::new(),
            sweep_one_in: DEFAULT_SWEEP_ONE_IN,
        }
    }

    /// Change how often admit calls sweep the table; 0 disables sweeping.
    pub fn with_sweep_one_in(mut self, one_in: u16) -> Self {
        self.sweep_one_in = one_in;
        self
    }

    /// Count a request from `client_key` against the current window.
    pub fn admit(&self, client_key: &str, max_requests: u32, window_ms: u64) -> Admission {
        self.admit_at(client_key, max_requests, window_ms, now_unix_millis())
    }

    pub fn admit_at(
        &self,
        client_key: &str,
        max_requests: u32,
        window_ms: u64,
        now_ms: u64,
    ) -> Admission {
        if self.should_sweep() {
            self.sweep_expired(now_ms);
        }

        // The entry guard holds the shard lock, so concurrent requests from
        // one client can't both observe the same count.
        let window = match self.windows.entry(client_key.to_string()) {
            Entry::Occupied(mut entry) if !entry.get().is_expired(now_ms) => {
                let window = entry.get_mut();
                window.count = window.count.saturating_add(1);
                *window
            }
            Entry::Occupied(mut entry) => {
                let window = RateWindow::open(now_ms, window_ms);
                entry.insert(window);
                window
            }
            Entry::Vacant(entry) => {
                let window = RateWindow::open(now_ms, window_ms);
                entry.insert(window);
                window
            }
        };

        Admission {
            allowed: window.count <= max_requests,
            limit: max_requests,
            remaining: max_requests.saturating_sub(window.count),
            reset_at_ms: window.reset_at_ms,
        }
    }

    /// Drop every window that has already expired. Returns how many were removed.
    pub fn sweep_expired(&self, now_ms: u64) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| !window.is_expired(now_ms));
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            tracing::debug!(removed, "Swept expired rate-limit windows");
        }
        removed
    }

    /// Current window for a client, if one is tracked.
    pub fn window(&self, client_key: &str) -> Option<RateWindow> {
        self.windows.get(client_key).map(|w| *w)
    }

    /// Number of tracked client keys.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    fn should_sweep(&self) -> bool {
        if self.sweep_one_in == 0 {
            return false;
        }
        let mut bytes = [0u8; 2];
        // A failed draw just skips this sweep.
        if self.rng.fill(&mut bytes).is_err() {
            return false;
        }
        u16::from_le_bytes(bytes) % self.sweep_one_in == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u32 = 5;
    const WINDOW_MS: u64 = 60_000;
    const T0: u64 = 1_700_000_000_000;

    fn limiter() -> AdmissionLimiter {
        AdmissionLimiter::new().with_sweep_one_in(0)
    }

    #[test]
    fn test_sixth_request_denied() {
        let limiter = limiter();
        let allowed: Vec<bool> = (0..6)
            .map(|i| limiter.admit_at("1.2.3.4", MAX, WINDOW_MS, T0 + i * 1000).allowed)
            .collect();
        assert_eq!(allowed, vec![true, true, true, true, true, false]);
    }

    #[test]
    fn test_remaining_and_reset() {
        let limiter = limiter();
        let first = limiter.admit_at("k", MAX, WINDOW_MS, T0);
        assert_eq!(first.remaining, 4);
        assert_eq!(first.limit, MAX);
        assert_eq!(first.reset_at_ms, T0 + WINDOW_MS);

        // The window doesn't slide with later requests.
        let second = limiter.admit_at("k", MAX, WINDOW_MS, T0 + 30_000);
        assert_eq!(second.remaining, 3);
        assert_eq!(second.reset_at_ms, T0 + WINDOW_MS);

        for _ in 0..5 {
            limiter.admit_at("k", MAX, WINDOW_MS, T0 + 30_000);
        }
        let denied = limiter.admit_at("k", MAX, WINDOW_MS, T0 + 30_000);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.retry_after_secs(T0 + 30_000), 30);
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let limiter = limiter();
        for i in 0..6 {
            limiter.admit_at("k", MAX, WINDOW_MS, T0 + i);
        }

        // Still inside the window at exactly reset_at.
        assert!(!limiter.admit_at("k", MAX, WINDOW_MS, T0 + WINDOW_MS).allowed);

        let after = limiter.admit_at("k", MAX, WINDOW_MS, T0 + WINDOW_MS + 1);
        assert!(after.allowed);
        assert_eq!(limiter.window("k").unwrap().count, 1);
        assert_eq!(after.reset_at_ms, T0 + 2 * WINDOW_MS + 1);
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = limiter();
        for _ in 0..6 {
            limiter.admit_at("a", MAX, WINDOW_MS, T0);
        }
        assert!(!limiter.admit_at("a", MAX, WINDOW_MS, T0).allowed);

        let b = limiter.admit_at("b", MAX, WINDOW_MS, T0);
        assert!(b.allowed);
        assert_eq!(b.remaining, 4);
        assert_eq!(limiter.len(), 2);
    }

    #[test]
    fn test_sweep_expired() {
        let limiter = limiter();
        limiter.admit_at("old", MAX, WINDOW_MS, T0);
        limiter.admit_at("new", MAX, WINDOW_MS, T0 + 50_000);

        assert_eq!(limiter.sweep_expired(T0 + WINDOW_MS + 1), 1);
        assert!(limiter.window("old").is_none());
        assert!(limiter.window("new").is_some());

        assert_eq!(limiter.sweep_expired(T0 + 200_000), 1);
        assert!(limiter.is_empty());
    }

    #[test]
    fn test_always_sweeping_keeps_semantics() {
        let limiter = AdmissionLimiter::new().with_sweep_one_in(1);
        let allowed: Vec<bool> = (0..6)
            .map(|_| limiter.admit_at("k", MAX, WINDOW_MS, T0).allowed)
            .collect();
        assert_eq!(allowed, vec![true, true, true, true, true, false]);

        limiter.admit_at("other", MAX, WINDOW_MS, T0 + WINDOW_MS + 1);
        assert!(limiter.window("k").is_none());
    }

    #[test]
    fn test_concurrent_admits_are_counted_exactly() {
        use std::sync::Arc;

        let limiter = Arc::new(limiter());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .filter(|_| limiter.admit_at("shared", 100, WINDOW_MS, T0).allowed)
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 100);
        assert_eq!(limiter.window("shared").unwrap().count, 400);
    }
}
