// SessionEvaluator - end-of-session outcome judgment
//
// A genuine puncture is modeled as a slow, sustained drop to a true
// minimum: the signal's minimum must occur strictly more than the
// configured dwell after the first puncture-state sample. A fast minimum
// indicates noise or a false trigger. Evaluation is a pure function of the
// recorded history; the caller presents the outcome.

use serde::{Deserialize, Serialize};

use crate::analysis::Sample;
use crate::config::EvaluationConfig;

/// Session outcome reported at stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
    /// The session never entered the puncturing state
    Inconclusive,
}

/// Detail behind an outcome, for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub outcome: Outcome,
    pub started_at: Option<f64>,
    pub minimum_value: Option<f64>,
    pub minimum_at: Option<f64>,
    pub elapsed_to_minimum: Option<f64>,
}

/// SessionEvaluator judges the recorded puncture-state history
pub struct SessionEvaluator;

impl SessionEvaluator {
    /// Evaluate the history into a bare outcome
    pub fn evaluate(history: &[Sample], config: &EvaluationConfig) -> Outcome {
        Self::report(history, config).outcome
    }

    /// Evaluate the history into a full report
    ///
    /// Empty history means the session never entered the puncturing state
    /// and is inconclusive rather than an error.
    pub fn report(history: &[Sample], config: &EvaluationConfig) -> EvaluationReport {
        let Some(first) = history.first() else {
            return EvaluationReport {
                outcome: Outcome::Inconclusive,
                started_at: None,
                minimum_value: None,
                minimum_at: None,
                elapsed_to_minimum: None,
            };
        };

        // First occurrence of the minimum wins when values tie.
        let mut minimum = *first;
        for sample in &history[1..] {
            if sample.value < minimum.value {
                minimum = *sample;
            }
        }

        let elapsed = minimum.timestamp - first.timestamp;
        let outcome = if elapsed > config.success_dwell_seconds {
            Outcome::Success
        } else {
            Outcome::Failure
        };

        EvaluationReport {
            outcome,
            started_at: Some(first.timestamp),
            minimum_value: Some(minimum.value),
            minimum_at: Some(minimum.timestamp),
            elapsed_to_minimum: Some(elapsed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EvaluationConfig {
        EvaluationConfig::default()
    }

    fn history(pairs: &[(f64, f64)]) -> Vec<Sample> {
        pairs
            .iter()
            .map(|&(timestamp, value)| Sample::new(timestamp, value))
            .collect()
    }

    #[test]
    fn test_empty_history_is_inconclusive() {
        let report = SessionEvaluator::report(&[], &config());
        assert_eq!(report.outcome, Outcome::Inconclusive);
        assert_eq!(report.minimum_value, None);
    }

    #[test]
    fn test_slow_minimum_is_success() {
        let history = history(&[(10.0, 500.0), (13.0, 400.0), (16.5, 300.0), (18.0, 350.0)]);
        let report = SessionEvaluator::report(&history, &config());

        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(report.minimum_value, Some(300.0));
        assert_eq!(report.minimum_at, Some(16.5));
        assert_eq!(report.elapsed_to_minimum, Some(6.5));
    }

    #[test]
    fn test_fast_minimum_is_failure() {
        let history = history(&[(10.0, 500.0), (11.0, 200.0), (18.0, 450.0)]);
        let outcome = SessionEvaluator::evaluate(&history, &config());
        assert_eq!(outcome, Outcome::Failure);
    }

    #[test]
    fn test_exactly_six_seconds_is_failure() {
        // Strict `>` is required for success.
        let history = history(&[(10.0, 500.0), (16.0, 300.0), (17.0, 400.0)]);
        let report = SessionEvaluator::report(&history, &config());

        assert_eq!(report.elapsed_to_minimum, Some(6.0));
        assert_eq!(report.outcome, Outcome::Failure);
    }

    #[test]
    fn test_tied_minimum_uses_first_occurrence() {
        let history = history(&[(10.0, 500.0), (12.0, 300.0), (19.0, 300.0)]);
        let report = SessionEvaluator::report(&history, &config());

        assert_eq!(report.minimum_at, Some(12.0));
        assert_eq!(report.outcome, Outcome::Failure);
    }

    #[test]
    fn test_single_sample_history_is_failure() {
        let history = history(&[(10.0, 500.0)]);
        let report = SessionEvaluator::report(&history, &config());

        assert_eq!(report.elapsed_to_minimum, Some(0.0));
        assert_eq!(report.outcome, Outcome::Failure);
    }
}
