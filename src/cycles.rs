/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Cycle-unit timekeeping.
//!
//! Tasks are budgeted in abstract cycles; the clock maps them to wall time.
//! A delay is a plain blocking sleep: control returns only after the full
//! span has elapsed.  There is no early wake and no cancellation.

use std::thread;
use std::time::Duration;

use tracing::debug;

/// Maps cycle units to wall time.
///
/// The wall time of one cycle is fixed at construction (from the
/// `cycle_time_ms` configuration field).  [`Default`] is one second per
/// cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleClock {
    cycle: Duration,
}

impl CycleClock {
    pub const fn new(cycle: Duration) -> Self {
        Self { cycle }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Wall time of one cycle.
    pub fn cycle(&self) -> Duration {
        self.cycle
    }

    /// Wall time of `cycles` cycle units, saturating at `Duration::MAX`.
    pub fn duration_for(&self, cycles: u32) -> Duration {
        self.cycle.checked_mul(cycles).unwrap_or(Duration::MAX)
    }

    /// Block the calling thread for `cycles` cycle units.
    pub fn delay(&self, cycles: u32) {
        debug!(cycles, "delaying");
        thread::sleep(self.duration_for(cycles));
    }
}

impl Default for CycleClock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn duration_for_multiplies_cycle_time() {
        let clock = CycleClock::from_millis(10);
        assert_eq!(clock.duration_for(0), Duration::ZERO);
        assert_eq!(clock.duration_for(3), Duration::from_millis(30));
    }

    #[test]
    fn duration_for_saturates_instead_of_overflowing() {
        let clock = CycleClock::new(Duration::MAX);
        assert_eq!(clock.duration_for(2), Duration::MAX);
    }

    #[test]
    fn delay_blocks_for_at_least_the_requested_cycles() {
        let clock = CycleClock::from_millis(5);
        let start = Instant::now();
        clock.delay(2);
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn delay_of_zero_cycles_returns_immediately() {
        let clock = CycleClock::from_millis(50);
        let start = Instant::now();
        clock.delay(0);
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn default_clock_is_one_second_per_cycle() {
        assert_eq!(CycleClock::default().cycle(), Duration::from_secs(1));
    }
}
