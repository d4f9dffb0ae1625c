//! Telemetry event types describing classifier diagnostics exposed to the
//! presentation layer and CLI surfaces.

use serde::{Deserialize, Serialize};

use crate::analysis::{Outcome, SessionState};

/// Metric events covering state transitions, threshold health, and session results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum MetricEvent {
    StateChanged {
        from: SessionState,
        to: SessionState,
        timestamp: f64,
    },
    BurstCounted {
        count: u32,
        timestamp: f64,
    },
    AutoStopRequested {
        timestamp: f64,
    },
    /// Thresholds lost the intended `puncture <= low <= high` ordering;
    /// classification continues, but the data quality is suspect.
    ThresholdOrderInverted {
        low: f64,
        high: f64,
        puncture: f64,
    },
    SampleDiscarded {
        code: i32,
    },
    SessionEvaluated {
        outcome: Outcome,
    },
}
