// RollingEstimator - continuously adapting baseline thresholds
//
// Maintains a fixed-size moving window of the most recent accepted readings
// and recomputes the full ThresholdSet from the window mean once the window
// is full. The recompute is deliberately from scratch on every observation
// rather than an incremental exponential filter: the result is always a
// pure function of the current window contents, which keeps baseline drift
// tracking (thermal, mechanical settling) trivially testable.

use std::collections::VecDeque;

use crate::calibration::ThresholdSet;
use crate::config::ThresholdMultipliers;

/// RollingEstimator owns the sliding window driving adaptive recalibration
#[derive(Debug)]
pub struct RollingEstimator {
    window: VecDeque<f64>,
    capacity: usize,
    margins: ThresholdMultipliers,
}

impl RollingEstimator {
    pub fn new(capacity: usize, margins: ThresholdMultipliers) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            margins,
        }
    }

    /// Append a reading and recompute thresholds when the window is full
    ///
    /// Returns `None` while the window is still filling. Once full, every
    /// observation evicts the oldest value and yields a fresh set that
    /// supersedes the prior one wholesale; there is no partial or blended
    /// update.
    pub fn observe(&mut self, value: f64) -> Option<ThresholdSet> {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);

        if self.window.len() < self.capacity {
            return None;
        }

        let mean = self.window.iter().sum::<f64>() / self.window.len() as f64;
        Some(ThresholdSet::from_baseline(mean, &self.margins))
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.capacity
    }

    /// Drop all window contents (session reset)
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn margins() -> ThresholdMultipliers {
        ThresholdMultipliers {
            low_drop: 0.0015,
            high_rise: 0.00025,
            puncture_drop: 0.00029,
        }
    }

    #[test]
    fn test_no_recompute_before_capacity() {
        let mut estimator = RollingEstimator::new(5, margins());

        for i in 0..4 {
            assert!(estimator.observe(1000.0 + i as f64).is_none());
        }
        assert!(!estimator.is_full());
        assert!(estimator.observe(1004.0).is_some());
        assert!(estimator.is_full());
    }

    #[test]
    fn test_recompute_on_every_observation_once_full() {
        let mut estimator = RollingEstimator::new(3, margins());
        estimator.observe(1000.0);
        estimator.observe(1000.0);

        assert!(estimator.observe(1000.0).is_some());
        assert!(estimator.observe(1000.0).is_some());
        assert!(estimator.observe(1000.0).is_some());
    }

    #[test]
    fn test_eviction_moves_the_mean() {
        let mut estimator = RollingEstimator::new(2, margins());
        estimator.observe(1000.0);
        let first = estimator.observe(2000.0).unwrap();
        let second = estimator.observe(4000.0).unwrap();

        assert_eq!(first, ThresholdSet::from_baseline(1500.0, &margins()));
        assert_eq!(second, ThresholdSet::from_baseline(3000.0, &margins()));
    }

    #[test]
    fn test_pure_function_of_window_contents() {
        // Same final window contents reached in different arrival orders
        // produce the same set.
        let mut forward = RollingEstimator::new(4, margins());
        let mut backward = RollingEstimator::new(4, margins());

        let values = [100.0, 200.0, 300.0, 400.0];
        let mut a = None;
        let mut b = None;
        for value in values {
            a = forward.observe(value);
        }
        for value in values.iter().rev() {
            b = backward.observe(*value);
        }

        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn test_reset_empties_window() {
        let mut estimator = RollingEstimator::new(2, margins());
        estimator.observe(1000.0);
        estimator.observe(1000.0);
        estimator.reset();

        assert!(estimator.is_empty());
        assert!(estimator.observe(1000.0).is_none());
    }
}
