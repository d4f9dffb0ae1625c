// EventStateMachine - dwell-debounced probe state classification
//
// Consumes one accepted reading at a time and maintains:
// - the cumulative burst counter (via BurstDetector),
// - the below-threshold dwell clock that debounces touch vs puncture,
// - the puncture-state sample history consumed by the evaluator,
// - the stability tracker that requests auto-stop once the signal goes flat.
//
// The dwell clock is an explicit optional start timestamp and every elapsed
// time is computed from sample timestamps, so each transition is a pure
// function of (value, timestamp, clock state). States are sticky: Puncturing
// persists above the low threshold once the dwell completed, until a reset
// or a later brief dip downgrades it to Touching.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::analysis::burst::BurstDetector;
use crate::analysis::Sample;
use crate::calibration::ThresholdSet;
use crate::config::EngineConfig;

/// Physical probe state; exactly one is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No sustained excursion below the low threshold
    Idle,
    /// Brief (sub-dwell) excursion below the low threshold
    Touching,
    /// Sustained excursion: the probe has punctured
    Puncturing,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Touching => write!(f, "touching"),
            SessionState::Puncturing => write!(f, "puncturing"),
        }
    }
}

/// Cumulative burst counter plus the first qualifying timestamp
///
/// Reset only by an explicit session reset; independent of the dwell-based
/// state transitions, so a brief dip never clears `first_detected_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PunctureEvent {
    pub count: u32,
    pub first_detected_at: Option<f64>,
}

/// Consecutive-identical-reading tracker for the auto-stop signal
#[derive(Debug, Clone, Copy, Default)]
struct StabilityTracker {
    last_value: Option<f64>,
    run_length: u32,
}

impl StabilityTracker {
    /// Track one stability reading; returns the current run length
    fn observe(&mut self, value: f64) -> u32 {
        match self.last_value {
            Some(last) if last == value => {
                self.run_length += 1;
            }
            _ => {
                self.last_value = Some(value);
                self.run_length = 1;
            }
        }
        self.run_length
    }

    fn reset(&mut self) {
        self.last_value = None;
        self.run_length = 0;
    }
}

/// Dwell classification of a single reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DwellEvent {
    /// No transition implied by this reading
    Hold,
    /// Brief dip, below the dwell requirement
    Touch,
    /// Sustained dip, dwell requirement met
    Puncture,
}

/// Pure dwell step: (value, timestamp, clock) -> (event, new clock)
///
/// The clock is the timestamp at which the signal first went below `low`,
/// or `None` when it is at or above `low`.
fn dwell_step(
    value: f64,
    timestamp: f64,
    low: f64,
    dwell_seconds: f64,
    clock: Option<f64>,
) -> (DwellEvent, Option<f64>) {
    if value < low {
        match clock {
            None => (DwellEvent::Hold, Some(timestamp)),
            Some(started) if timestamp - started >= dwell_seconds => {
                (DwellEvent::Puncture, Some(started))
            }
            Some(started) => (DwellEvent::Touch, Some(started)),
        }
    } else {
        match clock {
            // A dip that ended before the dwell elapsed still counts as one
            // final touch so the brief contact is recorded.
            Some(started) if timestamp - started < dwell_seconds => (DwellEvent::Touch, None),
            _ => (DwellEvent::Hold, None),
        }
    }
}

/// Per-sample outputs of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub state: SessionState,
    pub state_changed: bool,
    /// A qualifying burst triple was counted on this sample
    pub burst_counted: bool,
    /// The stability tracker requested an auto-stop on this sample
    pub auto_stop: bool,
}

/// EventStateMachine drives the per-sample classification
pub struct EventStateMachine {
    state: SessionState,
    below_since: Option<f64>,
    burst: BurstDetector,
    puncture_event: PunctureEvent,
    puncture_history: Vec<Sample>,
    stability: StabilityTracker,
    touch_dwell_seconds: f64,
    stability_repeat_threshold: u32,
    auto_stop_signaled: bool,
}

impl EventStateMachine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            state: SessionState::Idle,
            below_since: None,
            burst: BurstDetector::new(),
            puncture_event: PunctureEvent::default(),
            puncture_history: Vec::new(),
            stability: StabilityTracker::default(),
            touch_dwell_seconds: config.touch_dwell_seconds,
            stability_repeat_threshold: config.stability_repeat_threshold.max(1),
            auto_stop_signaled: false,
        }
    }

    /// Process one accepted reading against the current thresholds
    ///
    /// Samples must arrive strictly in order; the dwell clock and the
    /// windows are not valid under reordering or duplication.
    pub fn step(&mut self, timestamp: f64, value: f64, thresholds: &ThresholdSet) -> StepOutcome {
        // 1. Burst pattern counter, independent of the dwell transitions.
        let burst_counted = self.burst.observe(value, thresholds);
        if burst_counted {
            self.puncture_event.count += 1;
            if self.puncture_event.first_detected_at.is_none() {
                self.puncture_event.first_detected_at = Some(timestamp);
                info!("[StateMachine] first burst detected at {:.3}s", timestamp);
            }
        }

        // 2. Dwell-debounced state transition.
        let (event, clock) = dwell_step(
            value,
            timestamp,
            thresholds.low,
            self.touch_dwell_seconds,
            self.below_since,
        );
        self.below_since = clock;
        let previous = self.state;
        match event {
            DwellEvent::Puncture => self.state = SessionState::Puncturing,
            DwellEvent::Touch => self.state = SessionState::Touching,
            DwellEvent::Hold => {}
        }
        let state_changed = self.state != previous;
        if state_changed {
            debug!(
                "[StateMachine] {} -> {} at {:.3}s",
                previous, self.state, timestamp
            );
        }

        // 3. Record puncture-state samples for the evaluator.
        if self.state == SessionState::Puncturing {
            self.puncture_history.push(Sample::new(timestamp, value));
        }

        // 4. Stability auto-stop while punctured and back at or above low.
        let mut auto_stop = false;
        if self.state == SessionState::Puncturing && value >= thresholds.low {
            let run = self.stability.observe(value);
            if run >= self.stability_repeat_threshold && !self.auto_stop_signaled {
                self.auto_stop_signaled = true;
                auto_stop = true;
                info!(
                    "[StateMachine] signal stable after puncture, requesting stop at {:.3}s",
                    timestamp
                );
            }
        }

        StepOutcome {
            state: self.state,
            state_changed,
            burst_counted,
            auto_stop,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn puncture_count(&self) -> u32 {
        self.puncture_event.count
    }

    pub fn puncture_event(&self) -> PunctureEvent {
        self.puncture_event
    }

    /// Samples recorded while in the puncturing state
    pub fn puncture_history(&self) -> &[Sample] {
        &self.puncture_history
    }

    pub fn auto_stop_signaled(&self) -> bool {
        self.auto_stop_signaled
    }

    /// Clear every timer, counter, and history in one step
    ///
    /// Partial resets are not permitted: stale dwell state would corrupt
    /// the next session.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.below_since = None;
        self.burst.reset();
        self.puncture_event = PunctureEvent::default();
        self.puncture_history.clear();
        self.stability.reset();
        self.auto_stop_signaled = false;
    }
}
