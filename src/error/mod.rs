// Error types for the puncture trainer engine
//
// This module defines structured error types with numeric codes suitable
// for the presentation boundary. Transient input errors are always soft:
// logged and dropped, never propagated as hard failures, since a bad
// reading must not be able to end a training session.

mod sample;
mod session;

pub use sample::{log_sample_error, SampleError, SampleErrorCodes};
pub use session::{log_session_error, SessionError, SessionErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the presentation boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
