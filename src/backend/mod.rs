//! Remote log storage collaborator.
//!
//! [`LogBackend`] is the seam the dispatch workers call; [`SlsBackend`] is
//! the production implementation speaking the Aliyun SLS `PutLogs` API.

pub mod proto;
mod signature;
mod sls;

use thiserror::Error;

use crate::record::LogBatch;

pub use sls::{API_VERSION, SlsBackend};

/// Failures raised while appending a batch.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("SLS rejected batch with status {status} ({code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },
    /// The request signature could not be computed.
    #[error("signing error: {0}")]
    Signing(String),
}

/// Batch-append operation of a log store.
pub trait LogBackend: Send + Sync {
    /// Append `batch` to `logstore` within `project`.
    fn put_logs(&self, project: &str, logstore: &str, batch: &LogBatch) -> Result<(), BackendError>;
}
