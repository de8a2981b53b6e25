// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so timeouts, backoff, and timestamps can be tested
//! deterministically without sleeping real wall-clock time.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A source of time. `now()` feeds monotonic deadlines (timers, backoff);
/// `epoch_ms()` feeds wall-clock timestamps that get persisted to disk.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;
    fn epoch_ms(&self) -> u64;
}

/// Real wall-clock time.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

struct FakeClockState {
    base: Instant,
    offset: Duration,
    epoch_ms: u64,
}

/// Deterministic clock for tests: starts at a fixed epoch and only advances
/// when told to.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

impl FakeClock {
    pub fn new(epoch_ms: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                base: Instant::now(),
                offset: Duration::ZERO,
                epoch_ms,
            })),
        }
    }

    /// Advance both the monotonic and wall clocks by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.inner.lock();
        state.offset += duration;
        state.epoch_ms += duration.as_millis() as u64;
    }

    pub fn set_epoch_ms(&self, epoch_ms: u64) {
        self.inner.lock().epoch_ms = epoch_ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        let state = self.inner.lock();
        state.base + state.offset
    }

    fn epoch_ms(&self) -> u64 {
        self.inner.lock().epoch_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_advances_both_axes() {
        let clock = FakeClock::new(1_000);
        let t0 = clock.now();
        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.epoch_ms(), 6_000);
        assert!(clock.now() >= t0 + Duration::from_secs(5));
    }

    #[test]
    fn system_clock_epoch_is_plausible() {
        let clock = SystemClock;
        // Any reasonable wall-clock time is well past year 2020.
        assert!(clock.epoch_ms() > 1_577_836_800_000);
    }
}
