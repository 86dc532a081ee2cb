//! Conversion of caller payloads into batches.

use thiserror::Error;

use crate::payload::{Message, Pair, Payload};
use crate::record::{LogBatch, LogRecord};
use crate::severity::Severity;
use crate::timestamp::TimestampResolver;

/// Key used for the single pair of a plain-text payload.
pub const TEXT_KEY: &str = "message";

/// Reasons a payload cannot become a batch.
///
/// Each variant carries the JSON form of the rejected payload so the failure
/// can be diagnosed from the notification alone.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("only text or structured messages are accepted, original payload: {payload}")]
    Unsupported { payload: String },
    #[error("structured message carries no key/value pairs, original payload: {payload}")]
    EmptyMessage { payload: String },
}

/// Shape `payload` into a batch tagged with `severity`.
///
/// # Errors
///
/// * [`NormalizeError::Unsupported`] for [`Payload::Unsupported`].
/// * [`NormalizeError::EmptyMessage`] for a structured message without pairs.
pub fn normalize(
    payload: &Payload,
    severity: Severity,
    clock: &TimestampResolver,
) -> Result<LogBatch, NormalizeError> {
    match payload {
        Payload::Text(text) => {
            let record = LogRecord::new(clock.resolve(""), vec![Pair::new(TEXT_KEY, text.clone())]);
            Ok(LogBatch::single(severity, String::new(), record))
        }
        Payload::Structured(message) => normalize_message(message, severity, clock)
            .ok_or_else(|| NormalizeError::EmptyMessage {
                payload: payload.to_json(),
            }),
        Payload::Unsupported(_) => Err(NormalizeError::Unsupported {
            payload: payload.to_json(),
        }),
    }
}

fn normalize_message(
    message: &Message,
    severity: Severity,
    clock: &TimestampResolver,
) -> Option<LogBatch> {
    if message.pairs.is_empty() {
        return None;
    }
    let time = clock.resolve(message.timezone.as_deref().unwrap_or_default());
    // All pairs share one record, so SLS stores them as fields of one line.
    let record = LogRecord::new(time, message.pairs.clone());
    LogBatch::new(severity, message.category.clone(), vec![record])
}
