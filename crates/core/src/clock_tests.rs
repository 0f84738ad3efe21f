// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_epoch_ms_is_plausible() {
    let clock = SystemClock;
    let ms = clock.epoch_ms();
    // Anything after 2020-01-01 in epoch millis.
    assert!(ms > 1_577_836_800_000);
}

#[test]
fn fake_clock_starts_at_base() {
    let clock = FakeClock::new(1_000);
    assert_eq!(clock.epoch_ms(), 1_000);
}

#[test]
fn fake_clock_advances_monotonic_and_epoch_together() {
    let clock = FakeClock::new(1_000);
    let t0 = clock.now();
    clock.advance(Duration::from_millis(500));
    assert_eq!(clock.epoch_ms(), 1_500);
    assert_eq!(clock.now() - t0, Duration::from_millis(500));
}

#[test]
fn fake_clock_clones_share_state() {
    let clock = FakeClock::new(0);
    let clone = clock.clone();
    clock.advance(Duration::from_millis(10));
    assert_eq!(clone.epoch_ms(), 10);
}
