//! Maintenance loops spawned by `main` next to the server.
//!
//! Each `run` ticks on its own interval and returns once the shared
//! [`CancellationToken`](tokio_util::sync::CancellationToken) fires, which
//! `main` does after the listener has drained.

pub mod throttle_prune;
pub mod token_purge;
pub mod usage_session_reaper;
