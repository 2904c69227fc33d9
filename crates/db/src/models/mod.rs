//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod achievement;
pub mod agency;
pub mod blog;
pub mod checklist;
pub mod client;
pub mod dashboard;
pub mod error_report;
pub mod recharge;
pub mod referral;
pub mod refresh_token;
pub mod report;
pub mod subscription;
pub mod usage_session;
pub mod user;
