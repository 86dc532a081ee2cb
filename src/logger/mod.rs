//! The public logging facade.
//!
//! A [`Logger`] runs in one of two modes. In pipeline mode it normalizes each
//! payload, queues the resulting batch and lets the dispatch workers ship it.
//! In debug mode it writes `[{severity}]: {payload}` lines synchronously and
//! never touches the network.

mod convenience_methods;
mod debug_sink;

use std::io::{self, Write};
use std::sync::Arc;

use crate::backend::LogBackend;
use crate::config::{ConfigError, LoggerBuilder, LoggerConfig};
use crate::dispatch::{Destination, Dispatcher, SubmitError};
use crate::normalize::normalize;
use crate::notifier::{Notifier, notify_best_effort};
use crate::payload::Payload;
use crate::report;
use crate::severity::Severity;
use crate::timestamp::TimestampResolver;

use debug_sink::DebugSink;

enum Mode {
    Debug(DebugSink),
    Pipeline(Pipeline),
}

struct Pipeline {
    dispatcher: Dispatcher,
    clock: TimestampResolver,
}

/// Thread-safe handle accepting log entries.
///
/// Share it behind an [`Arc`] across threads. Dropping the last handle closes
/// the pipeline and waits for queued batches.
pub struct Logger {
    mode: Mode,
}

impl Logger {
    /// Build a logger from a configuration snapshot, using the default
    /// backend and notifier.
    pub fn new(config: LoggerConfig) -> Result<Self, ConfigError> {
        LoggerBuilder::from_config(config).build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Build a pipeline logger around explicit collaborators.
    ///
    /// Debug mode in `config` is honoured and leaves both collaborators
    /// unused.
    pub fn with_collaborators(
        config: LoggerConfig,
        backend: Arc<dyn LogBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        config.validate(true)?;
        if config.debug {
            return Ok(Self::debug_stdout());
        }
        let destination = Destination {
            project: config.project,
            logstore: config.logstore,
            backend,
            notifier,
        };
        let dispatcher = Dispatcher::spawn(destination, config.queue_capacity, config.worker_count)
            .map_err(ConfigError::Io)?;
        Ok(Self {
            mode: Mode::Pipeline(Pipeline {
                dispatcher,
                clock: TimestampResolver::new(config.default_timezone),
            }),
        })
    }

    /// A debug-mode logger writing to `writer`.
    pub fn debug_to(writer: impl Write + Send + 'static) -> Self {
        Self {
            mode: Mode::Debug(DebugSink::new(Box::new(writer))),
        }
    }

    pub(crate) fn debug_stdout() -> Self {
        Self::debug_to(io::stdout())
    }

    /// Record `payload` at `severity`.
    ///
    /// Never fails from the caller's perspective; rejected, late and
    /// undeliverable entries are reported through the notifier. Blocks while
    /// the submission queue is full.
    pub fn log(&self, severity: Severity, payload: impl Into<Payload>) {
        let payload = payload.into();
        match &self.mode {
            Mode::Debug(sink) => sink.write(severity, &payload),
            Mode::Pipeline(pipeline) => pipeline.log(severity, payload),
        }
    }

    /// Stop intake and block until every accepted batch has been handed to
    /// the backend. Later calls return immediately. A no-op in debug mode.
    pub fn close(&self) {
        if let Mode::Pipeline(pipeline) = &self.mode {
            pipeline.dispatcher.shutdown();
        }
    }

    /// Whether [`close`](Self::close) has begun. Always `false` in debug
    /// mode.
    pub fn is_closed(&self) -> bool {
        match &self.mode {
            Mode::Debug(_) => false,
            Mode::Pipeline(pipeline) => pipeline.dispatcher.is_closed(),
        }
    }

    /// Accepted batches not yet handed to the backend.
    pub fn pending(&self) -> usize {
        match &self.mode {
            Mode::Debug(_) => 0,
            Mode::Pipeline(pipeline) => pipeline.dispatcher.pending(),
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self.mode, Mode::Debug(_))
    }
}

impl Pipeline {
    fn log(&self, severity: Severity, payload: Payload) {
        let notifier = self.dispatcher.notifier();
        if self.dispatcher.is_closed() {
            notify_best_effort(notifier, &report::closed(severity, &payload.to_json()));
            return;
        }
        let batch = match normalize(&payload, severity, &self.clock) {
            Ok(batch) => batch,
            Err(err) => {
                notify_best_effort(notifier, &report::rejected(severity, &err));
                return;
            }
        };
        match self.dispatcher.submit(batch) {
            Ok(()) => {}
            Err(SubmitError::Closed(batch) | SubmitError::Disconnected(batch)) => {
                notify_best_effort(
                    notifier,
                    &report::closed(batch.severity(), &payload.to_json()),
                );
            }
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}
