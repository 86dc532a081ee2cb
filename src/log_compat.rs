//! Compatibility bridge for the Rust `log` crate.
//!
//! [`SlsLogAdapter`] implements [`log::Log`] on top of a shared [`Logger`],
//! turning each record into a structured message categorised by its target.
//! Records that would feed the pipeline back into itself are skipped: the
//! crate's own targets (`slslog` and `slslog::*`) and anything logged on a
//! dispatch worker, such as the HTTP client's request tracing.

use std::sync::Arc;

use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::dispatch::feeds_back;
use crate::logger::Logger;
use crate::notifier::NOTIFY_TARGET;
use crate::payload::Message;
use crate::severity::Severity;

/// Adapter implementing the Rust `log` trait.
pub struct SlsLogAdapter {
    logger: Arc<Logger>,
    max_level: LevelFilter,
}

impl SlsLogAdapter {
    pub fn new(logger: Arc<Logger>, max_level: LevelFilter) -> Self {
        Self { logger, max_level }
    }

    /// Install the adapter as the global `log` logger and raise the global
    /// max level to `max_level`.
    ///
    /// Failure reports of a logger without a webhook token go through the
    /// `log` facade under `slslog::notify`. The adapter cannot ship those
    /// into the pipeline they describe, so it prints them to stderr instead.
    ///
    /// # Errors
    ///
    /// Fails when another global logger is already installed.
    pub fn install(logger: Arc<Logger>, max_level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(Self::new(logger, max_level)))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

/// Text printed to stderr for a failure report, if `record` is one.
fn stderr_report(record: &Record<'_>) -> Option<String> {
    (record.target() == NOTIFY_TARGET).then(|| format!("slslog: {}", record.args()))
}

/// Shape a `log` record as a structured message.
///
/// The formatted arguments land under `message`; module, file and line are
/// added when the record carries them.
fn to_message(record: &Record<'_>) -> Message {
    let mut message = Message::new()
        .with_category(record.target())
        .with_pair("message", record.args().to_string());
    if let Some(module) = record.module_path() {
        message.push("module", module);
    }
    if let Some(file) = record.file() {
        message.push("file", file);
    }
    if let Some(line) = record.line() {
        message.push("line", line.to_string());
    }
    message
}

impl log::Log for SlsLogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.max_level && !feeds_back(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if let Some(report) = stderr_report(record) {
            eprintln!("{report}");
            return;
        }
        if !self.enabled(record.metadata()) {
            return;
        }
        self.logger
            .log(Severity::from(record.level()), to_message(record));
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    //! Unit tests for the `log` crate bridge.

    use super::*;
    use std::io::{self, Write};

    use crate::backend::{BackendError, LogBackend};
    use crate::config::LoggerConfig;
    use crate::notifier::LogNotifier;
    use crate::payload::Pair;
    use crate::record::LogBatch;
    use log::{Level, Log};
    use parking_lot::Mutex;
    use rstest::rstest;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).expect("utf-8 output")
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capturing_adapter(level: LevelFilter) -> (SlsLogAdapter, SharedBuf) {
        let buf = SharedBuf::default();
        let adapter = SlsLogAdapter::new(Arc::new(Logger::debug_to(buf.clone())), level);
        (adapter, buf)
    }

    fn log_http_trace(adapter: &SlsLogAdapter) {
        adapter.log(
            &Record::builder()
                .args(format_args!("sending request {} {}", "POST", "/logstores"))
                .level(Level::Debug)
                .target("ureq::unit")
                .build(),
        );
    }

    #[test]
    fn record_becomes_categorised_message() {
        let message = to_message(
            &Record::builder()
                .args(format_args!("pool exhausted after {} tries", 3))
                .level(Level::Warn)
                .target("app::db")
                .module_path(Some("app::db::pool"))
                .file(Some("src/db/pool.rs"))
                .line(Some(88))
                .build(),
        );
        assert_eq!(message.category, "app::db");
        assert_eq!(
            message.pairs,
            [
                Pair::new("message", "pool exhausted after 3 tries"),
                Pair::new("module", "app::db::pool"),
                Pair::new("file", "src/db/pool.rs"),
                Pair::new("line", "88"),
            ]
        );
    }

    #[test]
    fn missing_location_is_omitted() {
        let message = to_message(&Record::builder().args(format_args!("bare")).target("t").build());
        assert_eq!(message.pairs, [Pair::new("message", "bare")]);
    }

    #[rstest]
    #[case(Level::Error, "app", true)]
    #[case(Level::Debug, "app", false)]
    #[case(Level::Error, "slslog::dispatch", false)]
    #[case(Level::Error, "slslog_extras", true)]
    fn enabled_respects_level_and_target(
        #[case] level: Level,
        #[case] target: &str,
        #[case] expected: bool,
    ) {
        let (adapter, _buf) = capturing_adapter(LevelFilter::Info);
        let metadata = Metadata::builder().level(level).target(target).build();
        assert_eq!(adapter.enabled(&metadata), expected);
    }

    #[rstest]
    #[case(NOTIFY_TARGET, Some("slslog: Info log write failed"))]
    #[case("slslog::dispatch", None)]
    #[case("app", None)]
    fn failure_reports_go_to_stderr(#[case] target: &str, #[case] expected: Option<&str>) {
        let report = stderr_report(
            &Record::builder()
                .args(format_args!("Info log write failed"))
                .level(Level::Error)
                .target(target)
                .build(),
        );
        assert_eq!(report.as_deref(), expected);
    }

    #[test]
    fn failure_reports_stay_out_of_the_pipeline() {
        let (adapter, buf) = capturing_adapter(LevelFilter::Trace);
        adapter.log(
            &Record::builder()
                .args(format_args!("Warn log delivery to SLS failed"))
                .level(Level::Error)
                .target(NOTIFY_TARGET)
                .build(),
        );
        assert_eq!(buf.text(), "");
    }

    struct TracingBackend {
        adapter: SlsLogAdapter,
    }

    impl LogBackend for TracingBackend {
        fn put_logs(&self, _: &str, _: &str, _: &LogBatch) -> Result<(), BackendError> {
            log_http_trace(&self.adapter);
            Ok(())
        }
    }

    #[test]
    fn records_logged_on_dispatch_workers_are_dropped() {
        let (adapter, buf) = capturing_adapter(LevelFilter::Trace);
        let config = LoggerConfig {
            project: "p".into(),
            logstore: "s".into(),
            queue_capacity: 2,
            worker_count: 2,
            ..LoggerConfig::default()
        };
        let logger = Logger::with_collaborators(
            config,
            Arc::new(TracingBackend { adapter }),
            Arc::new(LogNotifier),
        )
        .expect("pipeline logger");
        for i in 0..4 {
            logger.info(format!("entry {i}"));
        }
        logger.close();
        assert_eq!(buf.text(), "");

        let (adapter, buf) = capturing_adapter(LevelFilter::Trace);
        log_http_trace(&adapter);
        assert!(buf.text().starts_with("[Debug]: "), "{}", buf.text());
    }
}
