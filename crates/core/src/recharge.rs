//! Ad-account recharge calendar.
//!
//! Prepaid ad accounts (Meta boleto/PIX, TikTok) stop delivering when their
//! balance runs out. Managers schedule recharges on a calendar and use the
//! forecast to see when the next one is due.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Date;

pub const STATUS_SCHEDULED: &str = "scheduled";
pub const STATUS_DONE: &str = "done";
pub const STATUS_SKIPPED: &str = "skipped";

pub const VALID_STATUSES: &[&str] = &[STATUS_SCHEDULED, STATUS_DONE, STATUS_SKIPPED];

/// Days ahead the dashboard looks for upcoming recharges.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid recharge status '{status}'. Must be one of: {VALID_STATUSES:?}"
        )))
    }
}

pub fn validate_amount(amount: f64) -> Result<(), CoreError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::Validation(
            "amount must be greater than zero".into(),
        ));
    }
    Ok(())
}

/// When the current balance runs out at the given daily spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Forecast {
    /// `None` when nothing is being spent.
    pub days_remaining: Option<i64>,
    pub next_recharge_date: Option<Date>,
}

pub fn forecast(balance: f64, daily_spend: f64, from: Date) -> Result<Forecast, CoreError> {
    if !balance.is_finite() || balance < 0.0 {
        return Err(CoreError::Validation(
            "balance must be a non-negative number".into(),
        ));
    }
    if !daily_spend.is_finite() || daily_spend < 0.0 {
        return Err(CoreError::Validation(
            "daily_spend must be a non-negative number".into(),
        ));
    }
    if daily_spend == 0.0 {
        return Ok(Forecast {
            days_remaining: None,
            next_recharge_date: None,
        });
    }

    let days = (balance / daily_spend).floor() as i64;
    let span = chrono::TimeDelta::try_days(days).ok_or_else(|| {
        CoreError::Validation("balance is too large for the given daily_spend".into())
    })?;
    Ok(Forecast {
        days_remaining: Some(days),
        // Past the last representable calendar date.
        next_recharge_date: from.checked_add_signed(span),
    })
}
