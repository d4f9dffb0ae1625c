// CalibrationProcedure - time-boxed baseline collection
//
// Collects raw readings for a fixed wall-clock duration before a session
// starts and derives the initial ThresholdSet from their mean. Unparseable
// readings are discarded and counted, never treated as errors, and an empty
// collection falls back to the documented default set: calibration must not
// be able to prevent a session from starting.
//
// The collection window is hard-bounded by the reading timestamps, so the
// procedure is a pure function of its feed and trivially testable.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::acquisition::{parse_value, SampleSource};
use crate::calibration::state::ThresholdSet;
use crate::config::CalibrationConfig;
use crate::error::log_sample_error;

/// Progress snapshot for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProgress {
    pub elapsed_seconds: f64,
    pub duration_seconds: f64,
    pub samples_collected: usize,
    pub samples_discarded: usize,
    pub complete: bool,
}

/// CalibrationProcedure accumulates the pre-session collection window
pub struct CalibrationProcedure {
    config: CalibrationConfig,
    values: Vec<f64>,
    discarded: usize,
    started_at: Option<f64>,
    last_at: Option<f64>,
}

impl CalibrationProcedure {
    pub fn new(config: &CalibrationConfig) -> Self {
        Self {
            config: config.clone(),
            values: Vec::new(),
            discarded: 0,
            started_at: None,
            last_at: None,
        }
    }

    /// Feed one raw reading into the collection window
    ///
    /// # Arguments
    /// * `timestamp` - Monotonic seconds since the feed started
    /// * `raw` - Reading text as received from the device
    ///
    /// # Returns
    /// `true` while the window is still open; `false` once the configured
    /// duration has elapsed (the reading is not consumed).
    pub fn push(&mut self, timestamp: f64, raw: &str) -> bool {
        if self.deadline_passed(timestamp) {
            return false;
        }
        self.started_at.get_or_insert(timestamp);
        self.last_at = Some(timestamp);

        match parse_value(raw) {
            Ok(value) => self.values.push(value),
            Err(err) => {
                self.discarded += 1;
                log_sample_error(&err, "calibration");
            }
        }
        true
    }

    fn deadline_passed(&self, timestamp: f64) -> bool {
        match self.started_at {
            Some(started) => timestamp - started >= self.config.duration_seconds,
            None => false,
        }
    }

    /// Whether the collection window has run its full duration
    pub fn is_complete(&self) -> bool {
        match (self.started_at, self.last_at) {
            (Some(started), Some(last)) => last - started >= self.config.duration_seconds,
            _ => false,
        }
    }

    /// Current progress for display
    pub fn progress(&self) -> CalibrationProgress {
        let elapsed = match (self.started_at, self.last_at) {
            (Some(started), Some(last)) => last - started,
            _ => 0.0,
        };
        CalibrationProgress {
            elapsed_seconds: elapsed,
            duration_seconds: self.config.duration_seconds,
            samples_collected: self.values.len(),
            samples_discarded: self.discarded,
            complete: self.is_complete(),
        }
    }

    /// Derive the ThresholdSet from the collected window
    ///
    /// Zero valid samples yields the fixed fallback set; never fails.
    pub fn finalize(self) -> ThresholdSet {
        if self.values.is_empty() {
            warn!(
                "[Calibration] no valid samples collected ({} discarded), using fallback thresholds",
                self.discarded
            );
            return ThresholdSet::fallback(&self.config);
        }

        let mean = self.values.iter().sum::<f64>() / self.values.len() as f64;
        let set = ThresholdSet::from_baseline(mean, &self.config.margins);
        info!(
            "[Calibration] baseline {:.2} from {} samples ({} discarded): low={:.2} high={:.2} puncture={:.2}",
            mean,
            self.values.len(),
            self.discarded,
            set.low,
            set.high,
            set.puncture
        );
        if !set.is_ordered() {
            warn!("[Calibration] threshold ordering violated: {:?}", set);
        }
        set
    }
}

/// Drive a sample source through a full calibration window
///
/// Collection is hard-bounded by the configured duration: it ends when the
/// feed's timestamps pass the deadline or the feed is exhausted, whichever
/// comes first. Never blocks indefinitely and never fails.
pub fn run_calibration(source: &mut dyn SampleSource, config: &CalibrationConfig) -> ThresholdSet {
    let mut procedure = CalibrationProcedure::new(config);
    while let Some(reading) = source.next_reading() {
        if !procedure.push(reading.timestamp, &reading.text) {
            break;
        }
    }
    procedure.finalize()
}
