//! Time abstraction for platform-agnostic control timing.
//!
//! The navigation loop and PID controllers never read a wall clock
//! directly; they receive timestamps from a [`Clock`] so that timing
//! logic can be tested deterministically on host.

use core::cell::Cell;

/// Monotonic time source for control loops.
///
/// Implementations must be monotonic: `now_us` never decreases. The
/// PID controller guards against duplicate timestamps but relies on
/// the clock never running backwards.
pub trait Clock {
    /// Current time in microseconds since an arbitrary start point.
    fn now_us(&self) -> u64;

    /// Current time in milliseconds since the same start point.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    /// Elapsed microseconds since a reference timestamp.
    ///
    /// Saturates to zero if the reference lies in the future.
    fn elapsed_us(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Interior mutability keeps the advancing side ergonomic in
/// single-threaded test code.
///
/// # Example
///
/// ```
/// use terrapin_core::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// clock.advance(50_000);
/// assert_eq!(clock.now_ms(), 50);
/// ```
#[derive(Clone, Default)]
pub struct ManualClock {
    current_us: Cell<u64>,
}

impl ManualClock {
    /// Create a clock starting at time 0.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Create a clock starting at the given timestamp.
    pub fn starting_at(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    /// Set the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advance the current time by the given amount.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_starts_at_zero() {
        let clock = ManualClock::new();
        assert_eq!(clock.now_us(), 0);
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn manual_clock_starting_at() {
        let clock = ManualClock::starting_at(2_500_000);
        assert_eq!(clock.now_us(), 2_500_000);
        assert_eq!(clock.now_ms(), 2500);
    }

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::new();
        clock.set(1_000);
        clock.advance(500);
        assert_eq!(clock.now_us(), 1_500);
    }

    #[test]
    fn elapsed_us_saturates() {
        let clock = ManualClock::starting_at(1_000);
        assert_eq!(clock.elapsed_us(400), 600);
        // Reference in the future saturates to zero
        assert_eq!(clock.elapsed_us(5_000), 0);
    }

    #[test]
    fn now_ms_rounds_down() {
        let clock = ManualClock::starting_at(1_999);
        assert_eq!(clock.now_ms(), 1);
    }
}
