// Acquisition module - sample source boundary
//
// The engine consumes timestamped raw readings through the SampleSource
// trait; device discovery and serial transport live outside the core. The
// scripted source replays recorded tables for tests and the CLI, and the
// synthetic source generates a plausible probe signal for demos.

mod scripted;
mod synthetic;

pub use scripted::ScriptedSource;
pub use synthetic::{SyntheticProfile, SyntheticSource};

use crate::error::SampleError;

/// One raw reading from the acquisition collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    /// Monotonic seconds since session start
    pub timestamp: f64,
    /// Reading text as received from the device
    pub text: String,
}

impl RawReading {
    pub fn new(timestamp: f64, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text: text.into(),
        }
    }

    /// Parse the reading into a finite value
    pub fn parse(&self) -> Result<f64, SampleError> {
        parse_value(&self.text)
    }
}

/// Parse raw reading text into a finite value
///
/// Surrounding whitespace is tolerated. NaN and infinities are rejected
/// the same as unparseable text: they would poison every later threshold
/// comparison.
pub fn parse_value(raw: &str) -> Result<f64, SampleError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed.parse().map_err(|_| SampleError::Unparseable {
        raw: trimmed.to_string(),
    })?;
    if !value.is_finite() {
        return Err(SampleError::NonFinite { value });
    }
    Ok(value)
}

/// Supplies a sequence of timestamped raw readings in arrival order
pub trait SampleSource {
    /// Next reading, or `None` when the feed is exhausted
    fn next_reading(&mut self) -> Option<RawReading>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_device_text() {
        assert_eq!(parse_value("620000").unwrap(), 620000.0);
        assert_eq!(parse_value(" 1500.5 \r\n").unwrap(), 1500.5);
        assert_eq!(parse_value("-3").unwrap(), -3.0);
    }

    #[test]
    fn test_parse_value_rejects_garbage() {
        assert!(matches!(
            parse_value("##noise##"),
            Err(SampleError::Unparseable { .. })
        ));
        assert!(matches!(
            parse_value(""),
            Err(SampleError::Unparseable { .. })
        ));
    }

    #[test]
    fn test_parse_value_rejects_non_finite() {
        assert!(matches!(
            parse_value("NaN"),
            Err(SampleError::NonFinite { .. })
        ));
        assert!(matches!(
            parse_value("inf"),
            Err(SampleError::NonFinite { .. })
        ));
    }
}
