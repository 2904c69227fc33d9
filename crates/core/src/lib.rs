//! Vurp domain core.
//!
//! Pure logic shared by the repository and HTTP layers: the error type,
//! calculators, achievement rules, throttles, billing helpers, and
//! validation for every tenant-scoped entity. Nothing in this crate performs
//! I/O.

pub mod achievements;
pub mod billing;
pub mod calculators;
pub mod checklist;
pub mod client;
pub mod error;
pub mod naming;
pub mod pagination;
pub mod recharge;
pub mod referral;
pub mod report;
pub mod roles;
pub mod telemetry;
pub mod throttle;
pub mod types;
pub mod usage_tracking;
