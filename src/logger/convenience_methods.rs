//! One entry point per severity.
//!
//! Each method is [`Logger::log`] with a fixed severity. `dpanic`, `panic`
//! and `fatal` only label the entry; none of them unwinds or exits.

use crate::payload::Payload;
use crate::severity::Severity;

use super::Logger;

impl Logger {
    pub fn info(&self, payload: impl Into<Payload>) {
        self.log(Severity::Info, payload);
    }

    pub fn error(&self, payload: impl Into<Payload>) {
        self.log(Severity::Error, payload);
    }

    pub fn debug(&self, payload: impl Into<Payload>) {
        self.log(Severity::Debug, payload);
    }

    pub fn warn(&self, payload: impl Into<Payload>) {
        self.log(Severity::Warn, payload);
    }

    /// Record at [`Severity::DPanic`].
    pub fn dpanic(&self, payload: impl Into<Payload>) {
        self.log(Severity::DPanic, payload);
    }

    /// Record at [`Severity::Panic`]. Does not panic.
    pub fn panic(&self, payload: impl Into<Payload>) {
        self.log(Severity::Panic, payload);
    }

    /// Record at [`Severity::Fatal`]. Does not terminate the process.
    pub fn fatal(&self, payload: impl Into<Payload>) {
        self.log(Severity::Fatal, payload);
    }
}
