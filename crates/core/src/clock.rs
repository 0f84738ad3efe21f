// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time source abstraction.
//!
//! The engine never calls `SystemTime::now()`/`Instant::now()` directly so
//! that timer scheduling, trace timestamps, and grace-period bookkeeping can
//! be driven deterministically in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A source of wall-clock and monotonic time.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, for deadlines and elapsed-time measurement.
    fn now(&self) -> Instant;

    /// Wall-clock epoch milliseconds, for trace records and history lines.
    fn epoch_ms(&self) -> u64;
}

/// Real wall-clock/monotonic time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// A controllable clock for deterministic tests.
///
/// `now()` is pinned at construction (an `Instant` cannot be synthesized
/// for an arbitrary point in time); advance it explicitly with
/// [`FakeClock::advance`]. `epoch_ms()` starts at a fixed base and advances
/// independently via the same atomic, in lock-step with `advance`.
#[derive(Debug, Clone)]
pub struct FakeClock {
    base: Instant,
    offset_ms: std::sync::Arc<AtomicU64>,
    epoch_base_ms: u64,
}

impl FakeClock {
    pub fn new(epoch_base_ms: u64) -> Self {
        Self {
            base: Instant::now(),
            offset_ms: std::sync::Arc::new(AtomicU64::new(0)),
            epoch_base_ms,
        }
    }

    /// Advance both the monotonic and epoch clocks by `d`.
    pub fn advance(&self, d: Duration) {
        self.offset_ms
            .fetch_add(d.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }

    fn epoch_ms(&self) -> u64 {
        self.epoch_base_ms + self.offset_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
