//! Low-pass heading filter.
//!
//! Smooths noisy instantaneous magnetometer headings before they reach
//! the steering controller, taking the shorter arc across the 0/360
//! discontinuity so a 359 -> 1 degree transition filters as +2 and not
//! -358.

use crate::geo::{wrap_180, wrap_360};

/// Default filter gain, matching the reference tuning.
pub const DEFAULT_ALPHA: f64 = 0.6;

/// First-order low-pass filter over heading samples.
///
/// `filtered += alpha * shortest_arc(raw - filtered)`, re-normalized
/// to [0, 360) after every update.
///
/// - `alpha = 1.0`: pass-through
/// - `alpha = 0.6`: reference tuning ([`DEFAULT_ALPHA`])
/// - `alpha = 0.0`: holds the seed value indefinitely
///
/// The filter is deterministic: replaying the same sample sequence
/// from the same initial state reproduces the same outputs. When the
/// upstream sensor has no sample this tick, the caller simply does not
/// invoke [`update`](Self::update); staleness is signalled by the
/// sensor's own validity flag, never hidden here.
pub struct HeadingEstimator {
    alpha: f64,
    filtered: Option<f64>,
}

impl HeadingEstimator {
    /// Create an estimator with the given gain, clamped to [0, 1].
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            filtered: None,
        }
    }

    /// Feed one raw heading sample (degrees), returning the filtered
    /// heading in [0, 360).
    ///
    /// The first sample after construction or [`reset`](Self::reset)
    /// seeds the filter and is returned normalized but otherwise
    /// unchanged.
    pub fn update(&mut self, raw_deg: f64) -> f64 {
        let next = match self.filtered {
            None => wrap_360(raw_deg),
            Some(prev) => {
                let diff = wrap_180(raw_deg - prev);
                wrap_360(prev + self.alpha * diff)
            }
        };
        self.filtered = Some(next);
        next
    }

    /// Last filtered heading, if any sample has been seen.
    pub fn current(&self) -> Option<f64> {
        self.filtered
    }

    /// Forget the filter state; the next sample seeds it again.
    pub fn reset(&mut self) {
        self.filtered = None;
    }
}

impl Default for HeadingEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_seeds_filter() {
        let mut est = HeadingEstimator::default();
        assert_eq!(est.current(), None);
        let out = est.update(47.5);
        assert!((out - 47.5).abs() < 1e-9);
        assert_eq!(est.current(), Some(out));
    }

    #[test]
    fn smooths_toward_new_heading() {
        let mut est = HeadingEstimator::new(0.6);
        est.update(90.0);
        // 90 + 0.6 * (100 - 90) = 96
        let out = est.update(100.0);
        assert!((out - 96.0).abs() < 1e-9, "got {out}");
        // 96 + 0.6 * 4 = 98.4
        let out = est.update(100.0);
        assert!((out - 98.4).abs() < 1e-9, "got {out}");
    }

    #[test]
    fn takes_shorter_arc_across_north() {
        let mut est = HeadingEstimator::new(0.6);
        est.update(350.0);
        // Shorter arc 350 -> 10 is +20: 350 + 0.6 * 20 = 362 -> 2
        let out = est.update(10.0);
        assert!((out - 2.0).abs() < 1e-9, "got {out}");
    }

    #[test]
    fn output_always_normalized() {
        let mut est = HeadingEstimator::default();
        for raw in [-720.0, -359.0, -1.0, 0.0, 359.99, 360.0, 1000.0] {
            let out = est.update(raw);
            assert!((0.0..360.0).contains(&out), "update({raw}) = {out}");
        }
    }

    #[test]
    fn jump_bounded_by_alpha_times_180() {
        let alpha = 0.6;
        let mut est = HeadingEstimator::new(alpha);
        let mut prev = est.update(0.0);
        // Worst-case adversarial samples near the +/-180 arc boundary
        for raw in [179.9, 0.0, 180.1, 359.9, 90.0, 270.0] {
            let out = est.update(raw);
            let step = crate::geo::wrap_180(out - prev).abs();
            assert!(
                step <= alpha * 180.0 + 1e-9,
                "step {step} exceeds bound for raw {raw}"
            );
            prev = out;
        }
    }

    #[test]
    fn alpha_extremes() {
        let mut pass = HeadingEstimator::new(1.0);
        pass.update(10.0);
        assert!((pass.update(200.0) - 200.0).abs() < 1e-9);

        let mut hold = HeadingEstimator::new(0.0);
        hold.update(10.0);
        assert!((hold.update(200.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn reset_clears_seed() {
        let mut est = HeadingEstimator::default();
        est.update(90.0);
        est.update(120.0);
        est.reset();
        assert_eq!(est.current(), None);
        let out = est.update(200.0);
        assert!((out - 200.0).abs() < 1e-9);
    }
}
