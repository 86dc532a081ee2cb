//! Fallback notifier routing failure reports through the `log` facade.

use log::error;

use super::{Notifier, NotifyError};

/// Target used for every report so bridges can recognise and skip them.
pub const NOTIFY_TARGET: &str = "slslog::notify";

/// Notifier used when no webhook token is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        error!(target: NOTIFY_TARGET, "{text}");
        Ok(())
    }
}
