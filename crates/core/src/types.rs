//! Primitive aliases shared by the core, db and api crates.

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (report periods, recharge due dates) carry no time zone.
pub type Date = chrono::NaiveDate;
