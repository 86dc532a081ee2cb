//! Texts sent to the notifier for each failure kind.

use crate::backend::BackendError;
use crate::normalize::NormalizeError;
use crate::severity::Severity;

pub(crate) fn closed(severity: Severity, payload_json: &str) -> String {
    format!("{severity} log write failed: log channel is closed, original payload: {payload_json}")
}

pub(crate) fn rejected(severity: Severity, err: &NormalizeError) -> String {
    format!("{severity} log write failed: {err}")
}

pub(crate) fn delivery_failed(severity: Severity, err: &BackendError) -> String {
    format!("{severity} log delivery to SLS failed, err: {err}")
}

pub(crate) fn worker_panicked(severity: Severity) -> String {
    format!("{severity} log delivery to SLS failed, err: backend panicked")
}
