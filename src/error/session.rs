// Session control error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Session error code constants shared with the presentation layer
///
/// Error code range: 3001-3003
pub struct SessionErrorCodes {}

impl SessionErrorCodes {
    /// A session is already running
    pub const ALREADY_RUNNING: i32 = 3001;

    /// No session is running
    pub const NOT_RUNNING: i32 = 3002;

    /// Engine state mutex was poisoned
    pub const STATE_POISONED: i32 = 3003;
}

/// Log a session control error with structured context
pub fn log_session_error(err: &SessionError, context: &str) {
    error!(
        "Session error in {}: code={}, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Session control errors
///
/// Only the thread-safe manager facade returns these; the engine core never
/// raises an unrecoverable fault during normal operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A session is already running
    AlreadyRunning,

    /// No session is running
    NotRunning,

    /// Engine state mutex was poisoned
    StatePoisoned,
}

impl ErrorCode for SessionError {
    fn code(&self) -> i32 {
        match self {
            SessionError::AlreadyRunning => SessionErrorCodes::ALREADY_RUNNING,
            SessionError::NotRunning => SessionErrorCodes::NOT_RUNNING,
            SessionError::StatePoisoned => SessionErrorCodes::STATE_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            SessionError::AlreadyRunning => "Session already running".to_string(),
            SessionError::NotRunning => "No session running".to_string(),
            SessionError::StatePoisoned => "Engine state lock poisoned".to_string(),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_codes() {
        assert_eq!(
            SessionError::AlreadyRunning.code(),
            SessionErrorCodes::ALREADY_RUNNING
        );
        assert_eq!(
            SessionError::NotRunning.code(),
            SessionErrorCodes::NOT_RUNNING
        );
        assert_eq!(
            SessionError::StatePoisoned.code(),
            SessionErrorCodes::STATE_POISONED
        );
    }

    #[test]
    fn test_session_error_messages() {
        assert!(SessionError::AlreadyRunning
            .message()
            .contains("already running"));
        assert!(SessionError::NotRunning.message().contains("No session"));
        assert!(SessionError::StatePoisoned.message().contains("poisoned"));
    }
}
