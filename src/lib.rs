//! Buffered log shipping to Aliyun Simple Log Service.
//!
//! A [`Logger`] accepts [`Payload`] values through one entry point per
//! [`Severity`], normalizes them into [`LogBatch`] values, and hands them to a
//! bounded queue drained by a fixed pool of worker threads. Workers forward
//! each batch to a [`LogBackend`] exactly once; failures are reported through
//! a best-effort [`Notifier`] rather than returned to the caller.
//!
//! ```no_run
//! use slslog::{LoggerBuilder, Message};
//!
//! let logger = LoggerBuilder::new()
//!     .with_endpoint("cn-hangzhou.log.aliyuncs.com")
//!     .with_credentials("key-id", "key-secret")
//!     .with_project("my-project")
//!     .with_logstore("app")
//!     .build()?;
//!
//! logger.info("service started");
//! logger.error(
//!     Message::new()
//!         .with_category("product")
//!         .with_pair("title", "stock low")
//!         .with_pair("content", "sku 42 below threshold"),
//! );
//! logger.close();
//! # Ok::<(), slslog::ConfigError>(())
//! ```

pub mod backend;
pub mod config;
mod dispatch;
mod http;
pub(crate) mod lifecycle;
#[cfg(feature = "log-compat")]
pub mod log_compat;
mod logger;
pub mod normalize;
pub mod notifier;
pub mod payload;
pub mod record;
mod report;
pub mod severity;
pub mod timestamp;
#[cfg(feature = "tracing-compat")]
pub mod tracing_compat;

pub use backend::{BackendError, LogBackend, SlsBackend};
pub use config::{ConfigError, LoggerBuilder, LoggerConfig};
#[cfg(feature = "log-compat")]
pub use log_compat::SlsLogAdapter;
pub use logger::Logger;
pub use normalize::{NormalizeError, normalize};
pub use notifier::{DingTalkNotifier, LogNotifier, NotifyError, Notifier};
pub use payload::{Message, Pair, Payload};
pub use record::{LogBatch, LogRecord};
pub use severity::Severity;
pub use timestamp::TimestampResolver;
#[cfg(feature = "tracing-compat")]
pub use tracing_compat::SlsLayer;
