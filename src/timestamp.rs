//! Epoch-second timestamps with zone fallback.
//!
//! A zone only selects the wall-clock representation of "now"; the epoch
//! value is the same instant in every zone. Resolution therefore matters for
//! validation: an empty, unknown or unusable zone falls back to the default
//! zone, and an unusable default falls back to raw UTC.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Zone used when a message does not name one.
pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";

/// Resolve `zone` against [`DEFAULT_TIMEZONE`] at the current time.
pub fn resolve(zone: &str) -> u32 {
    TimestampResolver::default().resolve(zone)
}

/// Converts zone names into epoch seconds, never failing.
#[derive(Clone, Debug)]
pub struct TimestampResolver {
    default_zone: String,
}

impl Default for TimestampResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

impl TimestampResolver {
    pub fn new(default_zone: impl Into<String>) -> Self {
        Self {
            default_zone: default_zone.into(),
        }
    }

    pub fn default_zone(&self) -> &str {
        &self.default_zone
    }

    /// Current epoch seconds as seen from `zone`. Always at least 1.
    pub fn resolve(&self, zone: &str) -> u32 {
        self.resolve_at(zone, Utc::now())
    }

    pub(crate) fn resolve_at(&self, zone: &str, now: DateTime<Utc>) -> u32 {
        if !zone.is_empty()
            && let Some(secs) = epoch_in(zone, now)
        {
            return secs;
        }
        epoch_in(&self.default_zone, now).unwrap_or_else(|| clamp_epoch(now.timestamp()).max(1))
    }
}

/// Epoch seconds of `now` in `zone`, or `None` when the zone is unknown or
/// the value would be unset (below 1).
fn epoch_in(zone: &str, now: DateTime<Utc>) -> Option<u32> {
    let tz: Tz = zone.parse().ok()?;
    let secs = clamp_epoch(now.with_timezone(&tz).timestamp());
    (secs >= 1).then_some(secs)
}

fn clamp_epoch(secs: i64) -> u32 {
    u32::try_from(secs).unwrap_or(if secs < 0 { 0 } else { u32::MAX })
}
