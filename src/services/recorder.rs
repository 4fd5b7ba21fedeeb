//! Fire-and-forget scan recording
//!
//! The resolver hands captures off here and returns to the client
//! without waiting; the durable append happens on detached worker
//! tasks that deliberately do not share the request's lifetime. The
//! queue is bounded: under a load spike events are dropped and counted
//! rather than accumulating unbounded tasks. Delivery is at-most-once
//! by design — scan counts are an analytics signal, not a billing
//! ledger.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, warn};

use crate::analytics::{ScanCapture, ScanEvent, ScanEventStore};
use crate::config::RecorderConfig;

/// Dispatch seam between the resolver and the write path. Non-async and
/// infallible from the caller's point of view: recording failures never
/// surface as resolution failures.
pub trait ScanRecorder: Send + Sync {
    fn dispatch(&self, capture: ScanCapture);
}

pub struct WorkerPoolRecorder {
    tx: mpsc::Sender<ScanEvent>,
    in_flight: Arc<AtomicUsize>,
    dispatched: AtomicU64,
    dropped: AtomicU64,
}

impl WorkerPoolRecorder {
    /// Spawn the worker pool. Must be called inside a tokio runtime.
    pub fn new(store: Arc<dyn ScanEventStore>, config: &RecorderConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let in_flight = Arc::new(AtomicUsize::new(0));

        for worker_id in 0..config.workers.max(1) {
            let rx = Arc::clone(&rx);
            let store = Arc::clone(&store);
            let in_flight = Arc::clone(&in_flight);

            tokio::spawn(async move {
                loop {
                    // Lock only around recv so workers interleave freely
                    // while one of them is writing
                    let event = rx.lock().await.recv().await;
                    let Some(event) = event else {
                        debug!("Recorder worker {} shutting down", worker_id);
                        break;
                    };

                    if let Err(e) = store.insert_event(event).await {
                        // Swallowed by contract: the scan is lost, the
                        // redirect already succeeded
                        warn!("Recorder worker {}: event append failed: {}", worker_id, e);
                    }
                    in_flight.fetch_sub(1, Ordering::AcqRel);
                }
            });
        }

        Self {
            tx,
            in_flight,
            dispatched: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Events successfully handed to the queue since startup.
    pub fn dispatched_count(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Events lost to a full queue since startup.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Wait until all dispatched events have been written (or the
    /// timeout passes). Used for graceful drain on shutdown.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight.load(Ordering::Acquire) > 0 {
            if Instant::now() >= deadline {
                return false;
            }
            sleep(Duration::from_millis(10)).await;
        }
        true
    }
}

impl ScanRecorder for WorkerPoolRecorder {
    fn dispatch(&self, capture: ScanCapture) {
        let event = ScanEvent::record(capture);

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        match self.tx.try_send(event) {
            Ok(()) => {
                self.dispatched.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(event)) => {
                self.in_flight.fetch_sub(1, Ordering::AcqRel);
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Recorder queue full, dropping scan event for link {}",
                    event.link_id
                );
            }
            Err(TrySendError::Closed(event)) => {
                self.in_flight.fetch_sub(1, Ordering::AcqRel);
                warn!(
                    "Recorder workers gone, dropping scan event for link {}",
                    event.link_id
                );
            }
        }
    }
}
