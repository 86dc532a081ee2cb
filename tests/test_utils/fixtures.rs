//! Recording collaborators and a ready-made pipeline fixture.
//!
//! The backends and notifier here capture everything they receive so tests
//! can assert on delivery and failure reporting without any network.

#![allow(dead_code)]

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use rstest::fixture;
use slslog::{
    BackendError, LogBackend, LogBatch, Logger, LoggerConfig, Notifier, NotifyError,
};

/// Backend that stores every batch and optionally fails each call.
#[derive(Default)]
pub struct RecordingBackend {
    batches: Mutex<Vec<LogBatch>>,
    fail: bool,
}

impl RecordingBackend {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<LogBatch> {
        self.batches.lock().expect("batches mutex poisoned").clone()
    }

    /// Value of the first pair of each delivered batch, in delivery order.
    pub fn first_values(&self) -> Vec<String> {
        self.batches()
            .iter()
            .map(|batch| batch.records()[0].contents()[0].value.clone())
            .collect()
    }
}

impl LogBackend for RecordingBackend {
    fn put_logs(&self, _project: &str, _logstore: &str, batch: &LogBatch) -> Result<(), BackendError> {
        self.batches
            .lock()
            .expect("batches mutex poisoned")
            .push(batch.clone());
        if self.fail {
            Err(BackendError::Transport("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

/// Notifier that stores every text it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    texts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().expect("texts mutex poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        self.texts
            .lock()
            .expect("texts mutex poisoned")
            .push(text.to_owned());
        Ok(())
    }
}

#[derive(Default)]
struct Gate {
    open: bool,
    entered: usize,
}

/// Backend that holds every call until [`GatedBackend::open`] is called.
#[derive(Default)]
pub struct GatedBackend {
    gate: Mutex<Gate>,
    changed: Condvar,
    inner: RecordingBackend,
}

impl GatedBackend {
    pub fn open(&self) {
        self.gate.lock().expect("gate mutex poisoned").open = true;
        self.changed.notify_all();
    }

    /// Wait until `count` calls have reached the gate.
    pub fn wait_entered(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut gate = self.gate.lock().expect("gate mutex poisoned");
        while gate.entered < count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            gate = self
                .changed
                .wait_timeout(gate, remaining)
                .expect("gate mutex poisoned")
                .0;
        }
        true
    }

    pub fn delivered(&self) -> Vec<String> {
        self.inner.first_values()
    }
}

impl LogBackend for GatedBackend {
    fn put_logs(&self, project: &str, logstore: &str, batch: &LogBatch) -> Result<(), BackendError> {
        let mut gate = self.gate.lock().expect("gate mutex poisoned");
        gate.entered += 1;
        self.changed.notify_all();
        while !gate.open {
            gate = self.changed.wait(gate).expect("gate mutex poisoned");
        }
        drop(gate);
        self.inner.put_logs(project, logstore, batch)
    }
}

/// Pipeline configuration naming a project and logstore.
pub fn pipeline_config(queue_capacity: usize, worker_count: usize) -> LoggerConfig {
    LoggerConfig {
        project: "test-project".into(),
        logstore: "test-store".into(),
        queue_capacity,
        worker_count,
        ..LoggerConfig::default()
    }
}

/// A pipeline logger wired to recording collaborators.
pub struct Rig {
    pub logger: Logger,
    pub backend: Arc<RecordingBackend>,
    pub notifier: Arc<RecordingNotifier>,
}

#[fixture]
pub fn rig(#[default(4)] queue_capacity: usize, #[default(2)] worker_count: usize) -> Rig {
    let backend = Arc::new(RecordingBackend::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let logger = Logger::with_collaborators(
        pipeline_config(queue_capacity, worker_count),
        backend.clone(),
        notifier.clone(),
    )
    .expect("pipeline logger");
    Rig {
        logger,
        backend,
        notifier,
    }
}
