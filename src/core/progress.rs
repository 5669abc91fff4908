//! Wall-clock to progress conversion.

use super::error::{ProgressError, ProgressResult};

/// Baseline progress and target duration, both in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeState {
    pub current: f64,
    pub total: f64,
}

impl TimeState {
    pub fn new(current: f64, total: f64) -> Self {
        Self { current, total }
    }

    /// Reject negative or non-finite values
    pub fn validate(&self) -> ProgressResult<()> {
        for (field, value) in [("current", self.current), ("total", self.total)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ProgressError::InvalidTime { field, value });
            }
        }
        Ok(())
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Pure progress math for a bar started at `start` and running at `timescale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressCalculator {
    pub start: f64,
    pub time: TimeState,
    pub timescale: f64,
}

impl ProgressCalculator {
    pub fn new(start: f64, time: TimeState, timescale: f64) -> Self {
        Self {
            start,
            time,
            timescale,
        }
    }

    /// Scaled seconds since `start`
    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.start) * self.timescale
    }

    /// Baseline plus elapsed, clamped at the total
    pub fn progress(&self, now: f64) -> f64 {
        (self.time.current + self.elapsed(now)).min(self.time.total)
    }

    /// Fraction complete. Totals under one second always report complete.
    pub fn percentage(&self, now: f64) -> f64 {
        if self.time.total < 1.0 {
            return 1.0;
        }
        self.progress(now) / self.time.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_progress_tracks_elapsed_time() {
        let calc = ProgressCalculator::new(100.0, TimeState::new(10.0, 60.0), 1.0);
        assert_eq!(calc.elapsed(105.0), 5.0);
        assert_eq!(calc.progress(105.0), 15.0);
        assert_eq!(calc.percentage(105.0), 0.25);
    }

    #[test]
    fn test_timescale_speeds_up_elapsed() {
        let calc = ProgressCalculator::new(0.0, TimeState::new(0.0, 100.0), 4.0);
        assert_eq!(calc.progress(5.0), 20.0);

        let frozen = ProgressCalculator::new(0.0, TimeState::new(3.0, 100.0), 0.0);
        assert_eq!(frozen.progress(5000.0), 3.0);
    }

    #[test]
    fn test_progress_clamps_at_total() {
        let calc = ProgressCalculator::new(0.0, TimeState::new(50.0, 60.0), 1.0);
        assert_eq!(calc.progress(3600.0), 60.0);
        assert_eq!(calc.percentage(3600.0), 1.0);

        let overfull = ProgressCalculator::new(0.0, TimeState::new(90.0, 60.0), 1.0);
        assert_eq!(overfull.progress(0.0), 60.0);
    }

    #[test]
    fn test_degenerate_total_is_always_complete() {
        let zero = ProgressCalculator::new(0.0, TimeState::new(0.0, 0.0), 1.0);
        assert_eq!(zero.percentage(0.0), 1.0);

        let tiny = ProgressCalculator::new(0.0, TimeState::new(0.0, 0.5), 1.0);
        assert_eq!(tiny.percentage(0.0), 1.0);
    }

    #[test]
    fn test_time_state_validation() {
        assert!(TimeState::new(0.0, 10.0).validate().is_ok());
        assert_eq!(
            TimeState::new(0.0, -1.0).validate(),
            Err(ProgressError::InvalidTime {
                field: "total",
                value: -1.0
            })
        );
        assert!(TimeState::new(f64::NAN, 10.0).validate().is_err());
        assert!(TimeState::new(0.0, f64::INFINITY).validate().is_err());
    }

    proptest! {
        #[test]
        fn progress_is_monotonic(
            current in 0.0f64..10_000.0,
            total in 0.0f64..10_000.0,
            timescale in 0.0f64..100.0,
            now1 in 0.0f64..100_000.0,
            step in 0.0f64..100_000.0,
        ) {
            let calc = ProgressCalculator::new(0.0, TimeState::new(current, total), timescale);
            let now2 = now1 + step;
            prop_assert!(calc.progress(now2) >= calc.progress(now1));
        }

        #[test]
        fn progress_never_exceeds_total(
            current in 0.0f64..10_000.0,
            total in 0.0f64..10_000.0,
            timescale in 0.0f64..100.0,
            now in 0.0f64..100_000.0,
        ) {
            let calc = ProgressCalculator::new(0.0, TimeState::new(current, total), timescale);
            prop_assert!(calc.progress(now) <= total);
        }

        #[test]
        fn percentage_stays_in_unit_range(
            current in 0.0f64..10_000.0,
            total in 0.0f64..10_000.0,
            timescale in 0.0f64..100.0,
            now in 0.0f64..100_000.0,
        ) {
            let calc = ProgressCalculator::new(0.0, TimeState::new(current, total), timescale);
            let pct = calc.percentage(now);
            prop_assert!((0.0..=1.0).contains(&pct));
            if total < 1.0 {
                prop_assert_eq!(pct, 1.0);
            }
        }
    }
}
