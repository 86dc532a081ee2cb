//! Bridge from `tracing` events into a [`Logger`].
//!
//! Every recorded field becomes a pair of a structured message whose
//! category is the event target. Span context is not captured. Events from
//! the crate's own targets or emitted on a dispatch worker are skipped.

use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::dispatch::feeds_back;
use crate::logger::Logger;
use crate::payload::Message;
use crate::severity::Severity;

/// `tracing_subscriber` layer forwarding events to a shared [`Logger`].
pub struct SlsLayer {
    logger: Arc<Logger>,
}

impl SlsLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

fn severity_of(level: &Level) -> Severity {
    match *level {
        Level::ERROR => Severity::Error,
        Level::WARN => Severity::Warn,
        Level::INFO => Severity::Info,
        _ => Severity::Debug,
    }
}

struct PairVisitor<'a> {
    message: &'a mut Message,
}

impl Visit for PairVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.message.push(field.name(), value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.message.push(field.name(), format!("{value:?}"));
    }
}

impl<S: Subscriber> Layer<S> for SlsLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if feeds_back(metadata.target()) {
            return;
        }
        let mut message = Message::new().with_category(metadata.target());
        event.record(&mut PairVisitor {
            message: &mut message,
        });
        self.logger.log(severity_of(metadata.level()), message);
    }
}
