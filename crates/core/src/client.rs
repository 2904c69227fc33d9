//! Client CRM constants and validation.

use crate::error::CoreError;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_PAUSED: &str = "paused";
pub const STATUS_CHURNED: &str = "churned";

pub const VALID_STATUSES: &[&str] = &[STATUS_ACTIVE, STATUS_PAUSED, STATUS_CHURNED];

/// Ad platforms a client can run on.
pub const VALID_PLATFORMS: &[&str] = &["meta", "google", "tiktok", "linkedin", "other"];

/// Maximum length of a client name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Reject empty or whitespace-only names.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Client name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Client name exceeds {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid client status '{status}'. Must be one of: {VALID_STATUSES:?}"
        )))
    }
}

pub fn validate_platform(platform: &str) -> Result<(), CoreError> {
    if VALID_PLATFORMS.contains(&platform) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid platform '{platform}'. Must be one of: {VALID_PLATFORMS:?}"
        )))
    }
}

pub fn validate_budget(budget: f64) -> Result<(), CoreError> {
    if !budget.is_finite() || budget < 0.0 {
        return Err(CoreError::Validation(
            "monthly_budget must be a non-negative number".into(),
        ));
    }
    Ok(())
}

/// Check whether one more active client fits the plan limit.
pub fn check_client_limit(active_clients: i64, limit: Option<i64>) -> Result<(), CoreError> {
    match limit {
        Some(max) if active_clients >= max => Err(CoreError::Forbidden(format!(
            "Your plan allows at most {max} active clients. Upgrade to add more."
        ))),
        _ => Ok(()),
    }
}
