//! Best-effort failure reporting side channel.
//!
//! The pipeline never returns errors to callers of the logging entry points.
//! Instead each failure is described in a single text message and handed to
//! a [`Notifier`]. Errors raised by the notifier itself are discarded by
//! [`notify_best_effort`].

mod dingtalk;
mod log_notifier;

use thiserror::Error;

pub use dingtalk::{DINGTALK_WEBHOOK_URL, DingTalkNotifier};
pub use log_notifier::{LogNotifier, NOTIFY_TARGET};

/// Failures raised while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request never produced an HTTP response.
    #[error("notifier transport error: {0}")]
    Transport(String),
    /// The webhook answered but refused the message.
    #[error("notifier rejected message ({code}): {message}")]
    Rejected { code: i64, message: String },
    /// The request signature could not be computed.
    #[error("notifier signing error: {0}")]
    Signing(String),
    /// The message could not be encoded.
    #[error("notifier encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for failure reports.
pub trait Notifier: Send + Sync {
    /// Deliver `text` to the channel.
    fn send_text(&self, text: &str) -> Result<(), NotifyError>;
}

/// Send `text`, swallowing any notifier failure.
pub fn notify_best_effort(notifier: &dyn Notifier, text: &str) {
    let _ = notifier.send_text(text);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Notifier for Failing {
        fn send_text(&self, _text: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Transport("offline".into()))
        }
    }

    #[test]
    fn best_effort_swallows_failures() {
        notify_best_effort(&Failing, "anything");
    }

    #[test]
    fn rejected_error_mentions_code() {
        let err = NotifyError::Rejected {
            code: 310000,
            message: "sign not match".into(),
        };
        assert_eq!(
            err.to_string(),
            "notifier rejected message (310000): sign not match"
        );
    }
}
