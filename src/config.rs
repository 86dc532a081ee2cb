//! Construction-time configuration.
//!
//! [`LoggerConfig`] is the immutable snapshot a [`Logger`](crate::Logger) is
//! built from. It can be assembled with [`LoggerBuilder`] or read from an
//! INI file:
//!
//! ```ini
//! [sls]
//! endpoint = cn-hangzhou.log.aliyuncs.com
//! access_key_id = LTAI...
//! access_key_secret = ...
//! project = my-project
//! logstore = app
//!
//! [notifier]
//! token = 0123abcd
//! secret = SEC...
//!
//! [pipeline]
//! queue_capacity = 100
//! worker_count = 3
//! debug = false
//! ```

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ini::{Ini, Properties};
use thiserror::Error;

use crate::backend::{LogBackend, SlsBackend};
use crate::http::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use crate::logger::Logger;
use crate::notifier::{DingTalkNotifier, LogNotifier, Notifier};
use crate::timestamp::DEFAULT_TIMEZONE;

/// Default number of batches the submission queue holds.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
/// Default number of dispatch workers.
pub const DEFAULT_WORKER_COUNT: usize = 3;

/// Errors raised while assembling or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting required outside debug mode is empty.
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    /// A setting holds an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The INI text could not be parsed.
    #[error("failed to parse INI configuration: {0}")]
    Ini(#[from] ini::ParseError),
    /// Reading the configuration file or spawning workers failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The platform TLS stack could not be initialised.
    #[error("failed to initialise TLS: {0}")]
    Tls(#[from] native_tls::Error),
}

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(ConfigError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Immutable settings for one logger instance.
#[derive(Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// SLS endpoint, optionally prefixed with `http://` or `https://`.
    pub endpoint: String,
    pub access_key_id: String,
    pub access_key_secret: String,
    pub project: String,
    pub logstore: String,
    /// DingTalk robot access token; empty routes reports to [`LogNotifier`].
    pub notifier_token: String,
    pub notifier_secret: String,
    pub queue_capacity: usize,
    pub worker_count: usize,
    /// Print entries synchronously instead of shipping them.
    pub debug: bool,
    /// Zone applied when a message names none or an unknown one.
    pub default_timezone: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Optional `Source` attached to every log group.
    pub source: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_key_id: String::new(),
            access_key_secret: String::new(),
            project: String::new(),
            logstore: String::new(),
            notifier_token: String::new(),
            notifier_secret: String::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_count: DEFAULT_WORKER_COUNT,
            debug: false,
            default_timezone: DEFAULT_TIMEZONE.to_owned(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            source: None,
        }
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("project", &self.project)
            .field("logstore", &self.logstore)
            .field("notifier_token", &"<redacted>")
            .field("notifier_secret", &"<redacted>")
            .field("queue_capacity", &self.queue_capacity)
            .field("worker_count", &self.worker_count)
            .field("debug", &self.debug)
            .field("default_timezone", &self.default_timezone)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("source", &self.source)
            .finish()
    }
}

impl LoggerConfig {
    /// Check the settings a pipeline needs.
    ///
    /// Debug mode needs nothing. Otherwise the queue and pool must be
    /// non-empty and the project and logstore named; endpoint and
    /// credentials are required unless `custom_backend` is set.
    pub fn validate(&self, custom_backend: bool) -> Result<(), ConfigError> {
        if self.debug {
            return Ok(());
        }
        ensure_positive!(self.queue_capacity, "queue_capacity")?;
        ensure_positive!(self.worker_count, "worker_count")?;
        let mut required = vec![("project", &self.project), ("logstore", &self.logstore)];
        if !custom_backend {
            required.extend([
                ("endpoint", &self.endpoint),
                ("access_key_id", &self.access_key_id),
                ("access_key_secret", &self.access_key_secret),
            ]);
        }
        match required.into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ConfigError::Missing(name)),
            None => Ok(()),
        }
    }

    /// Parse INI text. Absent keys keep their defaults; unknown keys are
    /// ignored.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        Self::from_ini(&Ini::load_from_str(text)?)
    }

    /// Read and parse an INI file.
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Ini::load_from_file(path) {
            Ok(ini) => Self::from_ini(&ini),
            Err(ini::Error::Io(err)) => Err(ConfigError::Io(err)),
            Err(ini::Error::Parse(err)) => Err(ConfigError::Ini(err)),
        }
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(sls) = ini.section(Some("sls")) {
            copy_string(sls, "endpoint", &mut config.endpoint);
            copy_string(sls, "access_key_id", &mut config.access_key_id);
            copy_string(sls, "access_key_secret", &mut config.access_key_secret);
            copy_string(sls, "project", &mut config.project);
            copy_string(sls, "logstore", &mut config.logstore);
            if let Some(source) = sls.get("source") {
                config.source = Some(source.to_owned());
            }
        }
        if let Some(notifier) = ini.section(Some("notifier")) {
            copy_string(notifier, "token", &mut config.notifier_token);
            copy_string(notifier, "secret", &mut config.notifier_secret);
        }
        if let Some(pipeline) = ini.section(Some("pipeline")) {
            if let Some(value) = pipeline.get("queue_capacity") {
                config.queue_capacity = parse_number("queue_capacity", value)?;
            }
            if let Some(value) = pipeline.get("worker_count") {
                config.worker_count = parse_number("worker_count", value)?;
            }
            if let Some(value) = pipeline.get("debug") {
                config.debug = parse_flag("debug", value)?;
            }
            copy_string(pipeline, "default_timezone", &mut config.default_timezone);
            if let Some(value) = pipeline.get("connect_timeout_ms") {
                config.connect_timeout =
                    Duration::from_millis(parse_number("connect_timeout_ms", value)?);
            }
            if let Some(value) = pipeline.get("request_timeout_ms") {
                config.request_timeout =
                    Duration::from_millis(parse_number("request_timeout_ms", value)?);
            }
        }
        Ok(config)
    }
}

fn copy_string(section: &Properties, key: &str, target: &mut String) {
    if let Some(value) = section.get(key) {
        *target = value.to_owned();
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidConfig(format!("{key} must be a non-negative integer, got {value:?}")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidConfig(format!(
            "{key} must be a boolean, got {value:?}"
        ))),
    }
}

/// Builder for [`Logger`] instances.
///
/// Collaborators default to [`SlsBackend`] and, depending on whether a
/// webhook token is set, [`DingTalkNotifier`] or [`LogNotifier`]. Either can
/// be replaced.
#[derive(Clone, Default)]
pub struct LoggerBuilder {
    config: LoggerConfig,
    queue_capacity: Option<usize>,
    worker_count: Option<usize>,
    connect_timeout_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    backend: Option<Arc<dyn LogBackend>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration snapshot.
    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
    ) -> Self {
        self.config.access_key_id = access_key_id.into();
        self.config.access_key_secret = access_key_secret.into();
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.config.project = project.into();
        self
    }

    pub fn with_logstore(mut self, logstore: impl Into<String>) -> Self {
        self.config.logstore = logstore.into();
        self
    }

    /// Configure the DingTalk robot used for failure reports.
    pub fn with_notifier_credentials(
        mut self,
        token: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        self.config.notifier_token = token.into();
        self.config.notifier_secret = secret.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn with_default_timezone(mut self, zone: impl Into<String>) -> Self {
        self.config.default_timezone = zone.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.config.source = Some(source.into());
        self
    }

    option_setter!(
        #[doc = "Set the submission queue capacity."]
        with_queue_capacity,
        queue_capacity,
        usize
    );
    option_setter!(
        #[doc = "Set the number of dispatch workers."]
        with_worker_count,
        worker_count,
        usize
    );
    option_setter!(
        #[doc = "Set the connection timeout in milliseconds."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the per-request timeout in milliseconds."]
        with_request_timeout_ms,
        request_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Replace the SLS backend."]
        with_backend,
        backend,
        Arc<dyn LogBackend>
    );
    option_setter!(
        #[doc = "Replace the failure notifier."]
        with_notifier,
        notifier,
        Arc<dyn Notifier>
    );

    /// Resolve overrides and validate, returning the final snapshot.
    pub fn config(&self) -> Result<LoggerConfig, ConfigError> {
        let mut config = self.config.clone();
        if let Some(capacity) = self.queue_capacity {
            config.queue_capacity = ensure_positive!(capacity, "queue_capacity")?;
        }
        if let Some(count) = self.worker_count {
            config.worker_count = ensure_positive!(count, "worker_count")?;
        }
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(ensure_positive!(ms, "connect_timeout_ms")?);
        }
        if let Some(ms) = self.request_timeout_ms {
            config.request_timeout = Duration::from_millis(ensure_positive!(ms, "request_timeout_ms")?);
        }
        config.validate(self.backend.is_some())?;
        Ok(config)
    }

    /// Build the logger, spawning its workers unless debug mode is set.
    pub fn build(self) -> Result<Logger, ConfigError> {
        let config = self.config()?;
        if config.debug {
            return Ok(Logger::debug_stdout());
        }
        let backend = match self.backend {
            Some(backend) => backend,
            None => {
                let mut backend = SlsBackend::with_timeouts(
                    &config.endpoint,
                    config.access_key_id.clone(),
                    config.access_key_secret.clone(),
                    config.connect_timeout,
                    config.request_timeout,
                )?;
                if let Some(source) = &config.source {
                    backend = backend.with_source(source.clone());
                }
                Arc::new(backend)
            }
        };
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None if config.notifier_token.trim().is_empty() => Arc::new(LogNotifier),
            None => Arc::new(DingTalkNotifier::with_timeouts(
                config.notifier_token.clone(),
                config.notifier_secret.clone(),
                config.connect_timeout,
                config.request_timeout,
            )?),
        };
        Logger::with_collaborators(config, backend, notifier)
    }
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("config", &self.config)
            .field("queue_capacity", &self.queue_capacity)
            .field("worker_count", &self.worker_count)
            .field("custom_backend", &self.backend.is_some())
            .field("custom_notifier", &self.notifier.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
