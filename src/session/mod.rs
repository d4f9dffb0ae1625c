//! Session module housing the reusable classification core.
//!
//! Exposes the single-threaded `SessionEngine`, the session history
//! containers, and the SPSC queue used when acquisition runs on its own
//! thread.

pub mod engine;
pub mod queue;
pub mod recorder;

pub use engine::{ClassificationResult, EngineSnapshot, SessionEngine};
pub use queue::{SampleConsumer, SampleProducer, SampleQueue};
pub use recorder::{ExportRow, SampleLog};
