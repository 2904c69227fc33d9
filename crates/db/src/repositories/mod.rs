//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Tenant-scoped repositories
//! also take the caller's `agency_id` and never return another agency's rows.

pub mod achievement_repo;
pub mod agency_repo;
pub mod blog_repo;
pub mod checklist_repo;
pub mod client_repo;
pub mod dashboard_repo;
pub mod error_report_repo;
pub mod recharge_repo;
pub mod referral_repo;
pub mod refresh_token_repo;
pub mod report_repo;
pub mod subscription_repo;
pub mod usage_session_repo;
pub mod user_repo;

pub use achievement_repo::AchievementRepo;
pub use agency_repo::AgencyRepo;
pub use blog_repo::BlogRepo;
pub use checklist_repo::ChecklistRepo;
pub use client_repo::ClientRepo;
pub use dashboard_repo::DashboardRepo;
pub use error_report_repo::ErrorReportRepo;
pub use recharge_repo::RechargeRepo;
pub use referral_repo::ReferralRepo;
pub use refresh_token_repo::RefreshTokenRepo;
pub use report_repo::ReportRepo;
pub use subscription_repo::SubscriptionRepo;
pub use usage_session_repo::UsageSessionRepo;
pub use user_repo::UserRepo;
