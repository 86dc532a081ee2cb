//! Wire-shaped records produced by normalization.
//!
//! Both types are immutable once built: fields are private and only exposed
//! through borrowing accessors.

use crate::payload::Pair;
use crate::severity::Severity;

/// One timestamped entry with ordered key/value contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    time: u32,
    contents: Vec<Pair>,
}

impl LogRecord {
    pub fn new(time: u32, contents: Vec<Pair>) -> Self {
        Self { time, contents }
    }

    /// Epoch seconds.
    pub fn time(&self) -> u32 {
        self.time
    }

    pub fn contents(&self) -> &[Pair] {
        &self.contents
    }
}

/// A severity-tagged group of records delivered to the backend in one call.
///
/// A batch always holds at least one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogBatch {
    severity: Severity,
    category: String,
    records: Vec<LogRecord>,
}

impl LogBatch {
    /// Build a batch, returning `None` when `records` is empty.
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        records: Vec<LogRecord>,
    ) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        Some(Self {
            severity,
            category: category.into(),
            records,
        })
    }

    /// Build a batch holding a single record.
    pub fn single(severity: Severity, category: impl Into<String>, record: LogRecord) -> Self {
        Self {
            severity,
            category: category.into(),
            records: vec![record],
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Severity tag as sent in the SLS `Topic` field.
    pub fn topic(&self) -> &'static str {
        self.severity.as_str()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batches_are_refused() {
        assert_eq!(LogBatch::new(Severity::Info, "", Vec::new()), None);
    }

    #[test]
    fn topic_follows_severity() {
        let batch = LogBatch::single(
            Severity::DPanic,
            "jobs",
            LogRecord::new(1, vec![Pair::new("message", "x")]),
        );
        assert_eq!(batch.topic(), "DPanic");
        assert_eq!(batch.category(), "jobs");
        assert_eq!(batch.records().len(), 1);
    }
}
