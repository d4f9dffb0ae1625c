// SampleQueue - SPSC boundary between acquisition and classification
//
// When acquisition runs on its own thread, this queue is the required
// hand-off: a lock-free single-producer/single-consumer ring with
// back-pressure. While the session is paused, or when the ring is full,
// new readings are dropped and counted as soft events; the classifier
// always observes the survivors one at a time in arrival order.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;
use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::acquisition::RawReading;

struct QueueShared {
    paused: AtomicBool,
    dropped: AtomicU64,
}

/// Factory for the producer/consumer pair
pub struct SampleQueue;

impl SampleQueue {
    pub fn with_capacity(capacity: usize) -> (SampleProducer, SampleConsumer) {
        let (producer, consumer) = RingBuffer::new(capacity.max(1));
        let shared = Arc::new(QueueShared {
            paused: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
        });

        (
            SampleProducer {
                inner: producer,
                shared: Arc::clone(&shared),
            },
            SampleConsumer {
                inner: consumer,
                shared,
            },
        )
    }
}

/// Acquisition-side handle
pub struct SampleProducer {
    inner: Producer<RawReading>,
    shared: Arc<QueueShared>,
}

impl SampleProducer {
    /// Offer a reading; returns `true` when enqueued
    ///
    /// Readings are dropped (and counted) while paused or when the ring is
    /// full; acquisition never blocks on the classifier.
    pub fn offer(&mut self, reading: RawReading) -> bool {
        if self.shared.paused.load(Ordering::Acquire) {
            self.shared.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        match self.inner.push(reading) {
            Ok(()) => true,
            Err(PushError::Full(reading)) => {
                self.shared.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "[SampleQueue] ring full, dropped reading at {:.3}s",
                    reading.timestamp
                );
                false
            }
        }
    }

    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

/// Classifier-side handle
pub struct SampleConsumer {
    inner: Consumer<RawReading>,
    shared: Arc<QueueShared>,
}

impl SampleConsumer {
    /// Next enqueued reading, in arrival order
    pub fn poll(&mut self) -> Option<RawReading> {
        self.inner.pop().ok()
    }

    /// Pause or resume intake on the producer side
    pub fn set_paused(&self, paused: bool) {
        self.shared.paused.store(paused, Ordering::Release);
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}
