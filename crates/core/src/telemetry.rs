//! Client error telemetry: fingerprints and duplicate suppression.
//!
//! Browsers report `window.onerror` and `unhandledrejection` events. The same
//! failure tends to fire in bursts (a render loop, a retrying fetch), so
//! reports sharing a fingerprint inside [`DEDUPE_WINDOW`] are dropped.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Reports with the same fingerprint inside this window are dropped.
pub const DEDUPE_WINDOW: Duration = Duration::from_secs(8);

/// How often expired dedupe entries are pruned.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Longest message prefix that participates in the fingerprint.
pub const FINGERPRINT_MESSAGE_LEN: usize = 200;

/// Longest stack trace persisted.
pub const MAX_STACK_LEN: usize = 8_000;

/// Where the browser caught the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    #[default]
    Error,
    UnhandledRejection,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Error => "error",
            ErrorKind::UnhandledRejection => "unhandled_rejection",
        }
    }
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Build the dedupe fingerprint `kind|message|source:line:column`.
pub fn fingerprint(
    kind: ErrorKind,
    message: &str,
    source: Option<&str>,
    line: Option<i32>,
    column: Option<i32>,
) -> String {
    let message = truncate_chars(message.trim(), FINGERPRINT_MESSAGE_LEN);
    format!(
        "{}|{}|{}:{}:{}",
        kind.as_str(),
        message,
        source.unwrap_or(""),
        line.unwrap_or(0),
        column.unwrap_or(0),
    )
}
