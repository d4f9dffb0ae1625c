// Sample input error types and constants

use crate::error::ErrorCode;
use log::info;
use std::fmt;

/// Sample error code constants shared with the presentation layer
///
/// Error code range: 1001-1002
pub struct SampleErrorCodes {}

impl SampleErrorCodes {
    /// Reading text did not parse as a number
    pub const UNPARSEABLE: i32 = 1001;

    /// Reading parsed but is NaN or infinite
    pub const NON_FINITE: i32 = 1002;
}

/// Log a discarded sample as a soft event
///
/// Transient input errors advance no timer or window and never abort the
/// session; they are recorded at info level only.
pub fn log_sample_error(err: &SampleError, context: &str) {
    info!(
        "Discarded sample in {}: code={}, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Transient input errors
///
/// These cover readings that cannot participate in classification. They are
/// counted and dropped at the boundary where they occur.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleError {
    /// Reading text did not parse as a number
    Unparseable { raw: String },

    /// Reading parsed but is NaN or infinite
    NonFinite { value: f64 },
}

impl ErrorCode for SampleError {
    fn code(&self) -> i32 {
        match self {
            SampleError::Unparseable { .. } => SampleErrorCodes::UNPARSEABLE,
            SampleError::NonFinite { .. } => SampleErrorCodes::NON_FINITE,
        }
    }

    fn message(&self) -> String {
        match self {
            SampleError::Unparseable { raw } => {
                format!("Unparseable reading: {:?}", raw)
            }
            SampleError::NonFinite { value } => {
                format!("Non-finite reading: {}", value)
            }
        }
    }
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SampleError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for SampleError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_error_codes() {
        assert_eq!(
            SampleError::Unparseable {
                raw: "garbage".to_string()
            }
            .code(),
            SampleErrorCodes::UNPARSEABLE
        );
        assert_eq!(
            SampleError::NonFinite { value: f64::NAN }.code(),
            SampleErrorCodes::NON_FINITE
        );
    }

    #[test]
    fn test_sample_error_messages() {
        let err = SampleError::Unparseable {
            raw: "##".to_string(),
        };
        assert!(err.message().contains("##"));

        let err = SampleError::NonFinite {
            value: f64::INFINITY,
        };
        assert!(err.message().contains("inf"));
    }

    #[test]
    fn test_sample_error_display() {
        let err = SampleError::Unparseable {
            raw: "x".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("1001"));
    }
}
