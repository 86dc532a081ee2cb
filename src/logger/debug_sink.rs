//! Synchronous output used in debug mode.

use std::io::Write;

use parking_lot::Mutex;

use crate::payload::Payload;
use crate::severity::Severity;

pub(super) struct DebugSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl DebugSink {
    pub(super) fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Write one `[{severity}]: {payload}` line. Output errors are dropped,
    /// matching the fire-and-forget contract of the pipeline.
    pub(super) fn write(&self, severity: Severity, payload: &Payload) {
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "[{severity}]: {payload}");
        let _ = writer.flush();
    }
}
