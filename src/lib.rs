// Puncture Trainer Core - Rust signal engine
// Adaptive-threshold classification for venipuncture training sessions

// Module declarations
pub mod acquisition;
pub mod analysis;
pub mod calibration;
pub mod config;
pub mod error;
pub mod managers;
pub mod session;
pub mod telemetry;

use once_cell::sync::OnceCell;

/// Initialize process-wide logging once (binaries and ad hoc tools)
///
/// Safe to call repeatedly; only the first call installs the subscriber.
pub fn init_logging() {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt().with_target(false).try_init();
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_init_logging_is_idempotent() {
        super::init_logging();
        super::init_logging();
    }
}
