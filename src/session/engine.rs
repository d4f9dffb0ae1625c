// SessionEngine - single-session orchestration
//
// Owns the rolling estimator, the event state machine, and the session
// histories; accepts samples strictly in arrival order and exposes the
// snapshot/export surface consumed by the presentation layer. The engine
// holds no UI handles and performs no I/O beyond logging; presentation
// either polls snapshots or subscribes to the manager's broadcast.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::acquisition::parse_value;
use crate::analysis::evaluator::EvaluationReport;
use crate::analysis::{
    EventStateMachine, Outcome, RollingEstimator, Sample, SessionEvaluator, SessionState,
};
use crate::calibration::ThresholdSet;
use crate::config::AppConfig;
use crate::error::{log_sample_error, ErrorCode};
use crate::session::recorder::{ExportRow, SampleLog};
use crate::telemetry::{self, MetricEvent};

/// Per-sample classification output for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub timestamp: f64,
    pub value: f64,
    pub state: SessionState,
    pub puncture_count: u32,
    /// A qualifying burst triple was counted on this sample
    pub burst_counted: bool,
    /// The stability tracker requested a session stop on this sample
    pub auto_stop: bool,
    /// The rolling estimator refreshed the thresholds on this sample
    pub thresholds_refreshed: bool,
}

/// Polled snapshot of engine state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub state: SessionState,
    pub thresholds: ThresholdSet,
    pub thresholds_ordered: bool,
    pub puncture_count: u32,
    pub first_detected_at: Option<f64>,
    pub samples_accepted: u64,
    pub samples_discarded: u64,
    pub auto_stop_pending: bool,
    pub outcome: Option<Outcome>,
}

/// SessionEngine drives one training session at a time
pub struct SessionEngine {
    config: AppConfig,
    thresholds: ThresholdSet,
    thresholds_ordered: bool,
    estimator: RollingEstimator,
    machine: EventStateMachine,
    log: SampleLog,
    samples_accepted: u64,
    samples_discarded: u64,
    auto_stop_pending: bool,
    outcome: Option<Outcome>,
}

impl SessionEngine {
    pub fn new(config: AppConfig) -> Self {
        let thresholds = ThresholdSet::fallback(&config.calibration);
        let estimator = RollingEstimator::new(config.engine.window_size, config.engine.margins);
        let machine = EventStateMachine::new(&config.engine);
        let log = SampleLog::new(config.engine.plot_capacity);

        Self {
            config,
            thresholds,
            thresholds_ordered: thresholds.is_ordered(),
            estimator,
            machine,
            log,
            samples_accepted: 0,
            samples_discarded: 0,
            auto_stop_pending: false,
            outcome: None,
        }
    }

    /// Install a freshly derived threshold set wholesale
    pub fn install_thresholds(&mut self, set: ThresholdSet) {
        info!(
            "[Engine] thresholds installed: low={:.2} high={:.2} puncture={:.2}",
            set.low, set.high, set.puncture
        );
        self.apply_thresholds(set);
    }

    fn apply_thresholds(&mut self, set: ThresholdSet) {
        let ordered = set.is_ordered();
        if !ordered && self.thresholds_ordered {
            warn!("[Engine] threshold ordering violated: {:?}", set);
            telemetry::hub().publish(MetricEvent::ThresholdOrderInverted {
                low: set.low,
                high: set.high,
                puncture: set.puncture,
            });
        }
        self.thresholds = set;
        self.thresholds_ordered = ordered;
    }

    pub fn thresholds(&self) -> ThresholdSet {
        self.thresholds
    }

    /// Submit a raw reading; unparseable input is dropped softly
    ///
    /// Returns `None` for a discarded reading. A dropped reading advances
    /// no timer, window, or triple.
    pub fn submit_raw(&mut self, timestamp: f64, raw: &str) -> Option<ClassificationResult> {
        match parse_value(raw) {
            Ok(value) => Some(self.submit_sample(timestamp, value)),
            Err(err) => {
                self.samples_discarded += 1;
                log_sample_error(&err, "submit_raw");
                telemetry::hub().publish(MetricEvent::SampleDiscarded { code: err.code() });
                None
            }
        }
    }

    /// Submit one parsed sample in arrival order
    pub fn submit_sample(&mut self, timestamp: f64, value: f64) -> ClassificationResult {
        self.samples_accepted += 1;
        self.log.record(timestamp, value);

        let mut thresholds_refreshed = false;
        if let Some(set) = self.estimator.observe(value) {
            self.apply_thresholds(set);
            thresholds_refreshed = true;
        }

        let previous_state = self.machine.state();
        let step = self.machine.step(timestamp, value, &self.thresholds);

        if step.state_changed {
            self.log.record_event(
                timestamp,
                format!("state: {} -> {}", previous_state, step.state),
            );
            telemetry::hub().publish(MetricEvent::StateChanged {
                from: previous_state,
                to: step.state,
                timestamp,
            });
        }
        if step.burst_counted {
            if self.machine.puncture_count() == 1 {
                self.log.record_event(timestamp, "first burst detected");
            }
            telemetry::hub().publish(MetricEvent::BurstCounted {
                count: self.machine.puncture_count(),
                timestamp,
            });
        }
        if step.auto_stop {
            self.auto_stop_pending = true;
            self.log.record_event(timestamp, "auto-stop requested");
            telemetry::hub().publish(MetricEvent::AutoStopRequested { timestamp });
        }

        ClassificationResult {
            timestamp,
            value,
            state: step.state,
            puncture_count: self.machine.puncture_count(),
            burst_counted: step.burst_counted,
            auto_stop: step.auto_stop,
            thresholds_refreshed,
        }
    }

    /// Evaluate the session and return the outcome
    ///
    /// Idempotent: repeated calls re-evaluate the same recorded history.
    /// An empty history is inconclusive, never an error.
    pub fn request_stop(&mut self) -> Outcome {
        let report =
            SessionEvaluator::report(self.machine.puncture_history(), &self.config.evaluation);
        self.outcome = Some(report.outcome);
        info!("[Engine] session evaluated: {:?}", report.outcome);
        telemetry::hub().publish(MetricEvent::SessionEvaluated {
            outcome: report.outcome,
        });
        report.outcome
    }

    /// Full evaluation detail for the presentation layer
    pub fn evaluation_report(&self) -> EvaluationReport {
        SessionEvaluator::report(self.machine.puncture_history(), &self.config.evaluation)
    }

    /// Atomically clear every window, timer, counter, and history
    ///
    /// The fallback thresholds are reinstalled; nothing survives a reset.
    pub fn reset(&mut self) {
        self.estimator.reset();
        self.machine.reset();
        self.log.clear();
        self.thresholds = ThresholdSet::fallback(&self.config.calibration);
        self.thresholds_ordered = self.thresholds.is_ordered();
        self.samples_accepted = 0;
        self.samples_discarded = 0;
        self.auto_stop_pending = false;
        self.outcome = None;
        info!("[Engine] session reset");
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            state: self.machine.state(),
            thresholds: self.thresholds,
            thresholds_ordered: self.thresholds_ordered,
            puncture_count: self.machine.puncture_count(),
            first_detected_at: self.machine.puncture_event().first_detected_at,
            samples_accepted: self.samples_accepted,
            samples_discarded: self.samples_discarded,
            auto_stop_pending: self.auto_stop_pending,
            outcome: self.outcome,
        }
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    /// Full unbounded sample history for charting/export
    pub fn raw_history(&self) -> &[Sample] {
        self.log.raw()
    }

    /// Bounded live-display window
    pub fn plot_snapshot(&self) -> Vec<Sample> {
        self.log.plot_snapshot()
    }

    /// Samples recorded while puncturing
    pub fn puncture_history(&self) -> &[Sample] {
        self.machine.puncture_history()
    }

    /// Plain tabular export structure
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.log.export_rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    /// Config with a window too large to fill in tests, so installed
    /// thresholds stay stationary while choreographing signals.
    fn stationary_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.engine.window_size = 100_000;
        config
    }

    fn fixed_thresholds() -> ThresholdSet {
        ThresholdSet {
            low: 100.0,
            high: 110.0,
            puncture: 90.0,
        }
    }

    fn engine_with_fixed_thresholds() -> SessionEngine {
        let mut engine = SessionEngine::new(stationary_config());
        engine.install_thresholds(fixed_thresholds());
        engine
    }

    /// Drive a puncture: below low past the dwell, then a stable recovery.
    fn drive_puncture(engine: &mut SessionEngine) {
        let mut t = 0.0;
        while t < 3.2 {
            engine.submit_sample(t, 95.0);
            t += 0.05;
        }
    }

    #[test]
    fn test_unparseable_reading_is_soft_dropped() {
        let mut engine = engine_with_fixed_thresholds();

        assert!(engine.submit_raw(0.0, "garbage").is_none());
        assert!(engine.submit_raw(0.05, "105").is_some());

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.samples_discarded, 1);
        assert_eq!(snapshot.samples_accepted, 1);
    }

    #[test]
    fn test_dropped_reading_does_not_advance_dwell() {
        let mut engine = engine_with_fixed_thresholds();

        engine.submit_sample(0.0, 95.0);
        engine.submit_raw(1.0, "junk");
        // Without the junk reading counting, elapsed at 2.0 is still < 3.
        let result = engine.submit_sample(2.0, 95.0).state;
        assert_eq!(result, SessionState::Touching);
    }

    #[test]
    fn test_stop_without_puncture_is_inconclusive() {
        let mut engine = engine_with_fixed_thresholds();
        engine.submit_sample(0.0, 105.0);

        assert_eq!(engine.request_stop(), Outcome::Inconclusive);
        assert_eq!(engine.snapshot().outcome, Some(Outcome::Inconclusive));
    }

    #[test]
    fn test_auto_stop_pending_latches_in_snapshot() {
        let mut engine = engine_with_fixed_thresholds();
        drive_puncture(&mut engine);

        let mut fired = 0;
        for i in 0..6 {
            let result = engine.submit_sample(3.3 + i as f64 * 0.05, 104.0);
            if result.auto_stop {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
        assert!(engine.snapshot().auto_stop_pending);
    }

    #[test]
    fn test_reset_is_idempotent_and_total() {
        let mut engine = engine_with_fixed_thresholds();
        engine.submit_raw(0.0, "junk");
        drive_puncture(&mut engine);
        engine.submit_sample(3.3, 80.0);
        engine.request_stop();

        engine.reset();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.state, SessionState::Idle);
        assert_eq!(snapshot.puncture_count, 0);
        assert_eq!(snapshot.first_detected_at, None);
        assert_eq!(snapshot.samples_accepted, 0);
        assert_eq!(snapshot.samples_discarded, 0);
        assert!(!snapshot.auto_stop_pending);
        assert_eq!(snapshot.outcome, None);
        assert!(engine.raw_history().is_empty());
        assert!(engine.puncture_history().is_empty());
        assert_eq!(
            snapshot.thresholds,
            ThresholdSet::fallback(&stationary_config().calibration)
        );

        // A second reset changes nothing.
        engine.reset();
        assert_eq!(engine.snapshot().state, SessionState::Idle);
    }

    #[test]
    fn test_rolling_recompute_supersedes_installed_thresholds() {
        let mut config = AppConfig::default();
        config.engine.window_size = 4;
        let mut engine = SessionEngine::new(config.clone());
        engine.install_thresholds(fixed_thresholds());

        let mut refreshed = 0;
        for i in 0..6 {
            let result = engine.submit_sample(i as f64 * 0.05, 200_000.0);
            if result.thresholds_refreshed {
                refreshed += 1;
            }
        }
        // Window of 4 fills on the 4th sample and recomputes on each after.
        assert_eq!(refreshed, 3);
        let expected = ThresholdSet::from_baseline(200_000.0, &config.engine.margins);
        assert_eq!(engine.thresholds(), expected);
    }

    #[test]
    fn test_export_rows_match_history_and_events() {
        let mut engine = engine_with_fixed_thresholds();
        drive_puncture(&mut engine);

        let rows = engine.export_rows();
        assert_eq!(rows.len(), engine.raw_history().len());
        let labeled: Vec<&ExportRow> = rows.iter().filter(|row| row.label.is_some()).collect();
        assert!(!labeled.is_empty());
        assert!(labeled
            .iter()
            .any(|row| row.label.as_deref().unwrap().contains("puncturing")));
    }

    #[test]
    fn test_inverted_thresholds_surface_but_do_not_crash() {
        let mut engine = engine_with_fixed_thresholds();
        engine.install_thresholds(ThresholdSet {
            low: 90.0,
            high: 80.0,
            puncture: 100.0,
        });

        assert!(!engine.snapshot().thresholds_ordered);
        for i in 0..10 {
            engine.submit_sample(i as f64 * 0.05, 85.0);
        }
    }
}
