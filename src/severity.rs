//! Severity tags attached to every batch.
//!
//! The tag doubles as the SLS `Topic` field, so its textual form is part of
//! the wire contract and must not change.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Error,
    Debug,
    Warn,
    DPanic,
    Panic,
    Fatal,
}

/// Error returned when a string does not name a [`Severity`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown severity: {0}")]
pub struct ParseSeverityError(pub String);

impl Severity {
    /// Every severity in declaration order.
    pub const ALL: [Severity; 7] = [
        Severity::Info,
        Severity::Error,
        Severity::Debug,
        Severity::Warn,
        Severity::DPanic,
        Severity::Panic,
        Severity::Fatal,
    ];

    /// Return the tag exactly as it is sent to the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Error => "Error",
            Severity::Debug => "Debug",
            Severity::Warn => "Warn",
            Severity::DPanic => "DPanic",
            Severity::Panic => "Panic",
            Severity::Fatal => "Fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Ok(Self::Info),
            "ERROR" => Ok(Self::Error),
            "DEBUG" | "TRACE" => Ok(Self::Debug),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "DPANIC" => Ok(Self::DPanic),
            "PANIC" => Ok(Self::Panic),
            "FATAL" | "CRITICAL" => Ok(Self::Fatal),
            _ => Err(ParseSeverityError(s.to_owned())),
        }
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warn,
            log::Level::Info => Severity::Info,
            log::Level::Debug | log::Level::Trace => Severity::Debug,
        }
    }
}
