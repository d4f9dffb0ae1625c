// ThresholdSet - baseline-derived classification boundaries
//
// This module stores the threshold values used by the EventStateMachine to
// classify probe readings. Thresholds are always derived wholesale from a
// baseline mean (the calibration window or the rolling window) using small
// multiplicative margins; a set is installed atomically and never patched
// field by field.

use serde::{Deserialize, Serialize};

use crate::config::{CalibrationConfig, ThresholdMultipliers};

/// ThresholdSet holds the three classification boundaries
///
/// Intended ordering is `puncture <= low <= high`. The classifier keeps
/// operating when a pathological baseline inverts the ordering; the
/// condition is surfaced to the presentation layer as a data-quality
/// warning instead of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    /// Boundary below which a reading counts toward the touch/puncture dwell
    pub low: f64,
    /// Upper boundary used by the burst pattern detector
    pub high: f64,
    /// Deep-drop boundary that starts a qualifying burst triple
    pub puncture: f64,
}

impl ThresholdSet {
    /// Derive a full set from a baseline mean
    pub fn from_baseline(baseline: f64, margins: &ThresholdMultipliers) -> Self {
        Self {
            low: baseline * (1.0 - margins.low_drop),
            high: baseline * (1.0 + margins.high_rise),
            puncture: baseline * (1.0 - margins.puncture_drop),
        }
    }

    /// Fixed fallback set used when calibration collects no valid samples
    ///
    /// A deterministic function of the configured fallback baseline and the
    /// calibration margins; never NaN.
    pub fn fallback(config: &CalibrationConfig) -> Self {
        Self::from_baseline(config.fallback_baseline, &config.margins)
    }

    /// Check the intended `puncture <= low <= high` ordering
    pub fn is_ordered(&self) -> bool {
        self.puncture <= self.low && self.low <= self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn margins() -> ThresholdMultipliers {
        ThresholdMultipliers {
            low_drop: 0.0012,
            high_rise: 0.00035,
            puncture_drop: 0.0003,
        }
    }

    #[test]
    fn test_from_baseline_margins() {
        let set = ThresholdSet::from_baseline(100_000.0, &margins());

        assert!((set.low - 99_880.0).abs() < 1e-6);
        assert!((set.high - 100_035.0).abs() < 1e-6);
        assert!((set.puncture - 99_970.0).abs() < 1e-6);
    }

    #[test]
    fn test_fallback_is_fixed_and_finite() {
        let config = CalibrationConfig::default();
        let a = ThresholdSet::fallback(&config);
        let b = ThresholdSet::fallback(&config);

        assert_eq!(a, b);
        assert!(a.low.is_finite() && a.high.is_finite() && a.puncture.is_finite());
        assert!(a.is_ordered());
    }

    #[test]
    fn test_ordering_check() {
        let ordered = ThresholdSet {
            low: 100.0,
            high: 110.0,
            puncture: 90.0,
        };
        assert!(ordered.is_ordered());

        // A negative baseline flips every margin.
        let inverted = ThresholdSet::from_baseline(-1000.0, &margins());
        assert!(!inverted.is_ordered());
    }
}
