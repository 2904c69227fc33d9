//! Campaign report validation.

use crate::calculators::CampaignNumbers;
use crate::error::CoreError;
use crate::types::Date;

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Report title must not be empty".into()));
    }
    Ok(())
}

pub fn validate_period(start: Date, end: Date) -> Result<(), CoreError> {
    if end < start {
        return Err(CoreError::Validation(format!(
            "period_end ({end}) must not be before period_start ({start})"
        )));
    }
    Ok(())
}

/// Money must be finite and non-negative; counters non-negative.
pub fn validate_numbers(numbers: &CampaignNumbers) -> Result<(), CoreError> {
    for (field, value) in [
        ("investment", numbers.investment),
        ("revenue", numbers.revenue),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::Validation(format!(
                "{field} must be a non-negative number"
            )));
        }
    }
    for (field, value) in [
        ("impressions", numbers.impressions),
        ("clicks", numbers.clicks),
        ("leads", numbers.leads),
        ("conversions", numbers.conversions),
    ] {
        if value < 0 {
            return Err(CoreError::Validation(format!("{field} must not be negative")));
        }
    }
    Ok(())
}
