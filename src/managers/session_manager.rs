// SessionManager: thread-safe facade over the session engine
//
// Owns the engine behind a mutex and fans classification results out on a
// broadcast channel, so the presentation layer can either subscribe to the
// stream or poll snapshots. The engine itself owns no UI handles.
//
// Readings submitted while no session is running are dropped and counted,
// mirroring the acquisition queue's back-pressure rule.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::acquisition::SampleSource;
use crate::analysis::Outcome;
use crate::calibration::{run_calibration, ThresholdSet};
use crate::config::AppConfig;
use crate::error::{log_session_error, SessionError};
use crate::session::engine::{ClassificationResult, EngineSnapshot, SessionEngine};
use crate::session::recorder::ExportRow;

/// Manages session lifecycle and result distribution
pub struct SessionManager {
    engine: Arc<Mutex<SessionEngine>>,
    result_tx: broadcast::Sender<ClassificationResult>,
    running: AtomicBool,
    rejected: AtomicU64,
    config: AppConfig,
}

impl SessionManager {
    pub fn new(config: AppConfig) -> Self {
        let engine = Arc::new(Mutex::new(SessionEngine::new(config.clone())));
        let (result_tx, _) = broadcast::channel(128);
        Self {
            engine,
            result_tx,
            running: AtomicBool::new(false),
            rejected: AtomicU64::new(0),
            config,
        }
    }

    /// Run the pre-session calibration and install the result
    ///
    /// Calibration never fails; a degenerate collection installs the
    /// fallback set.
    pub fn run_calibration(
        &self,
        source: &mut dyn SampleSource,
    ) -> Result<ThresholdSet, SessionError> {
        let set = run_calibration(source, &self.config.calibration);
        let mut engine = self.lock_engine()?;
        engine.install_thresholds(set);
        Ok(set)
    }

    /// Begin accepting samples
    pub fn begin_session(&self) -> Result<(), SessionError> {
        if self.running.swap(true, Ordering::SeqCst) {
            let err = SessionError::AlreadyRunning;
            log_session_error(&err, "begin_session");
            return Err(err);
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Readings rejected because no session was running
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Submit one raw reading; accepted results are broadcast to subscribers
    ///
    /// Returns `Ok(None)` both for discarded readings and for readings
    /// rejected while no session is running.
    pub fn submit_raw(
        &self,
        timestamp: f64,
        raw: &str,
    ) -> Result<Option<ClassificationResult>, SessionError> {
        if !self.is_running() {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            debug!(
                "[SessionManager] rejected reading at {:.3}s: no session running",
                timestamp
            );
            return Ok(None);
        }

        let mut engine = self.lock_engine()?;
        let result = engine.submit_raw(timestamp, raw);
        drop(engine);

        if let Some(result) = result {
            let _ = self.result_tx.send(result);
        }
        Ok(result)
    }

    /// Stop the session and return the evaluated outcome
    pub fn request_stop(&self) -> Result<Outcome, SessionError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            let err = SessionError::NotRunning;
            log_session_error(&err, "request_stop");
            return Err(err);
        }
        let mut engine = self.lock_engine()?;
        Ok(engine.request_stop())
    }

    /// Reset the engine to a fresh pre-calibration state
    pub fn reset(&self) -> Result<(), SessionError> {
        self.running.store(false, Ordering::SeqCst);
        self.rejected.store(0, Ordering::Relaxed);
        let mut engine = self.lock_engine()?;
        engine.reset();
        Ok(())
    }

    pub fn snapshot(&self) -> Result<EngineSnapshot, SessionError> {
        Ok(self.lock_engine()?.snapshot())
    }

    pub fn export_rows(&self) -> Result<Vec<ExportRow>, SessionError> {
        Ok(self.lock_engine()?.export_rows())
    }

    /// Subscribe to per-sample classification results
    pub fn subscribe(&self) -> broadcast::Receiver<ClassificationResult> {
        self.result_tx.subscribe()
    }

    /// Stream wrapper for async consumers
    pub fn subscribe_stream(&self) -> BroadcastStream<ClassificationResult> {
        BroadcastStream::new(self.result_tx.subscribe())
    }

    fn lock_engine(&self) -> Result<MutexGuard<'_, SessionEngine>, SessionError> {
        self.engine.lock().map_err(|_| {
            let err = SessionError::StatePoisoned;
            log_session_error(&err, "lock_engine");
            err
        })
    }
}
