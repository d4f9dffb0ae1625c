// Calibration module - pre-session baseline capture
//
// This module provides two main components:
// 1. ThresholdSet: the three classification boundaries derived from a baseline
// 2. CalibrationProcedure: time-boxed sample collection producing the initial set
//
// The calibration workflow:
// 1. Create CalibrationProcedure (or call run_calibration with a source)
// 2. Feed raw readings for the configured duration; bad readings are discarded
// 3. Finalize to derive the ThresholdSet from the window mean
//
// The rolling estimator reuses ThresholdSet for continuous recalibration
// once the session is running.

pub mod procedure;
pub mod state;

pub use procedure::{run_calibration, CalibrationProcedure, CalibrationProgress};
pub use state::ThresholdSet;
