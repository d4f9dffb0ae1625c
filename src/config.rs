//! Configuration management for deployment-specific tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling per-deployment adjustment without recompilation. Threshold
//! margins, dwell times, and window sizes are calibration policy rather
//! than structural contracts, so behavioral variants of the classifier
//! are configuration here, not separate code paths.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub calibration: CalibrationConfig,
    pub evaluation: EvaluationConfig,
    pub acquisition: AcquisitionConfig,
}

/// Multiplicative margins applied to a baseline mean to derive a threshold set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdMultipliers {
    /// Fractional drop below baseline for the low (touch/puncture dwell) boundary
    pub low_drop: f64,
    /// Fractional rise above baseline for the high (burst ceiling) boundary
    pub high_rise: f64,
    /// Fractional drop below baseline for the puncture (deep drop) boundary
    pub puncture_drop: f64,
}

/// Classifier and rolling-estimator parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sliding-window capacity for the rolling baseline estimate
    pub window_size: usize,
    /// Continuous time below the low threshold required to classify a puncture
    pub touch_dwell_seconds: f64,
    /// Consecutive identical readings that trigger the auto-stop signal
    pub stability_repeat_threshold: u32,
    /// Capacity of the bounded live-display ring buffer
    pub plot_capacity: usize,
    /// Margins used for rolling threshold recomputes
    pub margins: ThresholdMultipliers,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: 50,
            touch_dwell_seconds: 3.0,
            stability_repeat_threshold: 5,
            plot_capacity: 50,
            // Rolling margins differ from the calibration margins: the moving
            // window lags a drifting baseline and needs wider headroom.
            margins: ThresholdMultipliers {
                low_drop: 0.0015,
                high_rise: 0.00025,
                puncture_drop: 0.00029,
            },
        }
    }
}

/// Pre-session calibration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Wall-clock duration of the collection window in seconds
    pub duration_seconds: f64,
    /// Margins used to derive the initial threshold set
    pub margins: ThresholdMultipliers,
    /// Baseline assumed when calibration collects no valid samples
    pub fallback_baseline: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 10.0,
            margins: ThresholdMultipliers {
                low_drop: 0.0012,
                high_rise: 0.00035,
                puncture_drop: 0.0003,
            },
            fallback_baseline: 1500.0,
        }
    }
}

/// End-of-session evaluation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Minimum time from first puncture sample to the signal minimum for success
    pub success_dwell_seconds: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            success_dwell_seconds: 6.0,
        }
    }
}

/// Acquisition boundary parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Capacity of the SPSC ring between acquisition and classification
    pub queue_capacity: usize,
    /// Nominal device cadence in milliseconds (synthetic source pacing)
    pub cadence_ms: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            cadence_ms: 50,
        }
    }
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            calibration: CalibrationConfig::default(),
            evaluation: EvaluationConfig::default(),
            acquisition: AcquisitionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file is missing or
    /// the JSON is invalid (both logged, never fatal).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default deployment location
    pub fn load() -> Self {
        Self::load_from_file("assets/puncture_config.json")
    }
}
