//! Bounded submission queue and the worker pool draining it.
//!
//! Producers push whole batches onto a bounded `crossbeam` channel and block
//! while it is full. Each worker owns a receiver clone plus a receiver of the
//! shutdown channel; shutdown is broadcast by dropping the only shutdown
//! sender, which disconnects every worker's copy at once.
//!
//! Once a worker observes shutdown it stops waiting on the shutdown signal
//! and switches to drain mode: it keeps taking batches until the lifecycle
//! reports no outstanding submissions. This covers producers that were
//! accepted just before the close and are still blocked on a full queue.

use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{
    Receiver, RecvTimeoutError, SendError, Sender, TryRecvError, bounded, select,
};
use log::{debug, warn};
use parking_lot::Mutex;

use crate::backend::LogBackend;
use crate::lifecycle::Lifecycle;
use crate::notifier::{Notifier, notify_best_effort};
use crate::record::LogBatch;
use crate::report;

/// How long a draining worker waits for a batch before rechecking the
/// in-flight count.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

thread_local! {
    static ON_DISPATCH_WORKER: Cell<bool> = const { Cell::new(false) };
}

/// Whether the calling thread is a dispatch worker.
///
/// Anything logged on a worker (a backend, its HTTP client) must not be fed
/// back into the queue: a worker blocked on its own full queue never drains.
#[cfg(any(feature = "log-compat", feature = "tracing-compat", test))]
pub(crate) fn on_dispatch_worker() -> bool {
    ON_DISPATCH_WORKER.with(Cell::get)
}

/// Whether a record from `target` on the current thread must stay out of
/// the pipeline. Covers the crate's own targets (`slslog` and
/// `slslog::*`) and everything emitted on a dispatch worker.
#[cfg(any(feature = "log-compat", feature = "tracing-compat"))]
pub(crate) fn feeds_back(target: &str) -> bool {
    on_dispatch_worker() || is_own_target(target)
}

#[cfg(any(feature = "log-compat", feature = "tracing-compat"))]
fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix("slslog")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Why a batch was not queued.
#[derive(Debug)]
pub(crate) enum SubmitError {
    /// Shutdown began before the batch was accepted.
    Closed(LogBatch),
    /// Every worker has gone away.
    Disconnected(LogBatch),
}

/// Where batches go and who hears about failures.
pub(crate) struct Destination {
    pub(crate) project: String,
    pub(crate) logstore: String,
    pub(crate) backend: Arc<dyn LogBackend>,
    pub(crate) notifier: Arc<dyn Notifier>,
}

struct Shared {
    destination: Destination,
    lifecycle: Lifecycle,
}

/// Queue, worker threads and lifecycle of one pipeline.
pub(crate) struct Dispatcher {
    tx: Sender<LogBatch>,
    shutdown_tx: Mutex<Option<Sender<()>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shared: Arc<Shared>,
}

impl Dispatcher {
    /// Create the queue and spawn `worker_count` workers.
    pub(crate) fn spawn(
        destination: Destination,
        capacity: usize,
        worker_count: usize,
    ) -> std::io::Result<Self> {
        let (tx, rx) = bounded::<LogBatch>(capacity);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        let shared = Arc::new(Shared {
            destination,
            lifecycle: Lifecycle::new(),
        });

        let dispatcher = Self {
            tx,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            workers: Mutex::new(Vec::with_capacity(worker_count)),
            shared: Arc::clone(&shared),
        };
        for id in 0..worker_count {
            let worker = Worker {
                id,
                rx: rx.clone(),
                shutdown_rx: shutdown_rx.clone(),
                shared: Arc::clone(&shared),
            };
            let spawned = thread::Builder::new()
                .name(format!("slslog-worker-{id}"))
                .spawn(move || worker.run());
            match spawned {
                Ok(handle) => dispatcher.workers.lock().push(handle),
                Err(err) => {
                    dispatcher.shutdown();
                    return Err(err);
                }
            }
        }
        Ok(dispatcher)
    }

    /// Queue `batch`, blocking while the queue is full.
    pub(crate) fn submit(&self, batch: LogBatch) -> Result<(), SubmitError> {
        if self.shared.lifecycle.submit_accepted().is_err() {
            return Err(SubmitError::Closed(batch));
        }
        if let Err(SendError(batch)) = self.tx.send(batch) {
            self.shared.lifecycle.submit_completed();
            return Err(SubmitError::Disconnected(batch));
        }
        Ok(())
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.shared.lifecycle.is_closed()
    }

    pub(crate) fn pending(&self) -> usize {
        self.shared.lifecycle.pending()
    }

    pub(crate) fn notifier(&self) -> &dyn Notifier {
        self.shared.destination.notifier.as_ref()
    }

    /// Stop intake, wait for every accepted batch, then join the workers.
    ///
    /// Returns `false` when shutdown had already begun.
    pub(crate) fn shutdown(&self) -> bool {
        let first = self.shared.lifecycle.shutdown(|| {
            self.shutdown_tx.lock().take();
        });
        if first {
            self.join_workers();
        }
        first
    }

    fn join_workers(&self) {
        let handles = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if handle.join().is_err() {
                warn!("slslog: dispatch worker panicked");
            }
        }
    }
}

struct Worker {
    id: usize,
    rx: Receiver<LogBatch>,
    shutdown_rx: Receiver<()>,
    shared: Arc<Shared>,
}

impl Worker {
    /// Non-blocking check run before every blocking wait so a saturated
    /// queue cannot starve the shutdown branch of `select!`.
    fn should_shutdown_now(shutdown_rx: &Receiver<()>) -> bool {
        matches!(
            shutdown_rx.try_recv(),
            Ok(()) | Err(TryRecvError::Disconnected)
        )
    }

    fn run(self) {
        ON_DISPATCH_WORKER.with(|flag| flag.set(true));
        debug!("slslog: starting dispatch worker {}", self.id);
        loop {
            if Self::should_shutdown_now(&self.shutdown_rx) {
                break;
            }
            select! {
                recv(self.shutdown_rx) -> _ => break,
                recv(self.rx) -> batch => match batch {
                    Ok(batch) => self.deliver(batch),
                    Err(_) => {
                        warn!("slslog: queue disconnected, worker {} exiting", self.id);
                        return;
                    }
                },
            }
        }
        self.drain();
        debug!("slslog: dispatch worker {} stopped", self.id);
    }

    /// Keep delivering until no accepted batch is outstanding.
    fn drain(&self) {
        loop {
            match self.rx.recv_timeout(DRAIN_POLL_INTERVAL) {
                Ok(batch) => self.deliver(batch),
                Err(RecvTimeoutError::Timeout) => {
                    if self.shared.lifecycle.pending() == 0 {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    /// Forward one batch; failures are reported, never retried.
    fn deliver(&self, batch: LogBatch) {
        let _completion = self.shared.lifecycle.completion();
        let destination = &self.shared.destination;
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            destination
                .backend
                .put_logs(&destination.project, &destination.logstore, &batch)
        }));
        let text = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => report::delivery_failed(batch.severity(), &err),
            Err(_) => report::worker_panicked(batch.severity()),
        };
        notify_best_effort(destination.notifier.as_ref(), &text);
    }
}
