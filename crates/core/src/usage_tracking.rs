//! Session-duration tracking rules.
//!
//! The browser autosaves the elapsed time of a session every few seconds and
//! sends one last beacon when the tab is hidden or closed. The server only
//! ever moves the stored duration forward and caps it at one day.

use std::time::Duration;

use crate::error::CoreError;

/// Longest duration a single session may record.
pub const MAX_SESSION_SECS: i64 = 24 * 60 * 60;

/// How often the stale-session reaper runs.
pub const REAP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default idle time after which a session without heartbeats is closed.
pub const DEFAULT_STALE_MINS: i64 = 30;

/// Widest look-back accepted by the stats endpoint.
pub const MAX_STATS_DAYS: i64 = 3650;

/// Validate and clamp a reported duration.
pub fn clamp_duration(duration_secs: i64) -> Result<i64, CoreError> {
    if duration_secs < 0 {
        return Err(CoreError::Validation(
            "duration_secs must not be negative".into(),
        ));
    }
    Ok(duration_secs.min(MAX_SESSION_SECS))
}

/// Validate a stats look-back; anything past [`MAX_STATS_DAYS`] is clamped.
pub fn stats_window(days: Option<i64>) -> Result<Option<i64>, CoreError> {
    match days {
        Some(d) if d <= 0 => Err(CoreError::Validation("days must be positive".into())),
        Some(d) => Ok(Some(d.min(MAX_STATS_DAYS))),
        None => Ok(None),
    }
}

/// Average session length, zero when there are no sessions.
pub fn average_secs(total_secs: i64, sessions: i64) -> i64 {
    if sessions <= 0 {
        0
    } else {
        total_secs / sessions
    }
}
