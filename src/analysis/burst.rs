// BurstDetector - 3-sample puncture burst pattern
//
// A qualifying burst is a deep drop below the puncture threshold followed
// by two readings at or below the high threshold: the needle snaps through
// resistance, then the signal partially recovers. The detector feeds the
// cumulative puncture counter and is evaluated once per arriving sample
// against the 3 most recent values; it is a frequency counter input,
// independent of the dwell-based state transitions.

use std::collections::VecDeque;

use crate::calibration::ThresholdSet;

const TRIPLE_LEN: usize = 3;

/// BurstDetector keeps the 3 most recent accepted values
#[derive(Debug, Default)]
pub struct BurstDetector {
    recent: VecDeque<f64>,
}

impl BurstDetector {
    pub fn new() -> Self {
        Self {
            recent: VecDeque::with_capacity(TRIPLE_LEN),
        }
    }

    /// Push a reading and test the current triple
    ///
    /// Returns `true` when the oldest of the triple is below the puncture
    /// threshold and the two newer values are both at or below the high
    /// threshold. Fires at most once per qualifying triple.
    pub fn observe(&mut self, value: f64, thresholds: &ThresholdSet) -> bool {
        if self.recent.len() == TRIPLE_LEN {
            self.recent.pop_front();
        }
        self.recent.push_back(value);

        if self.recent.len() < TRIPLE_LEN {
            return false;
        }

        self.recent[0] < thresholds.puncture
            && self.recent[1] <= thresholds.high
            && self.recent[2] <= thresholds.high
    }

    /// Drop the triple (session reset)
    pub fn reset(&mut self) {
        self.recent.clear();
    }
}
