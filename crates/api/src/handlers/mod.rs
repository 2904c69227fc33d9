//! Request handlers, one submodule per resource.
//!
//! Handlers validate input with `vurp_core`, delegate persistence to the
//! repositories in `vurp_db`, and map failures via [`AppError`](crate::error::AppError).

pub mod achievements;
pub mod agency;
pub mod auth;
pub mod billing;
pub mod blog;
pub mod calculators;
pub mod checklists;
pub mod clients;
pub mod dashboard;
pub mod recharges;
pub mod referrals;
pub mod reports;
pub mod telemetry;
pub mod usage_sessions;
