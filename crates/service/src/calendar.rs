//! Working-day arithmetic over calendar days.
//!
//! Dates are zone-free `NaiveDate`s: a `YYYY-MM-DD` string already names a
//! midnight-aligned day in the service zone, so no further normalization is
//! needed before iterating.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::errors::ServiceError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Every date in `[start, end]` that is neither a weekend nor a holiday, ascending.
///
/// Empty when `start > end`; callers reject that case before getting here.
///
/// # Examples
/// ```
/// use std::collections::HashSet;
/// use chrono::NaiveDate;
/// use service::calendar::working_days;
/// let mon = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let next_mon = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
/// assert_eq!(working_days(mon, next_mon, &HashSet::new()).len(), 6);
/// ```
pub fn working_days(start: NaiveDate, end: NaiveDate, holidays: &HashSet<NaiveDate>) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_working_day(*d, holidays))
        .collect()
}

pub fn is_weekend(d: NaiveDate) -> bool {
    matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_working_day(d: NaiveDate, holidays: &HashSet<NaiveDate>) -> bool {
    !is_weekend(d) && !holidays.contains(&d)
}

/// Parse a strict `YYYY-MM-DD` value; `field` names the input in the error.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ServiceError> {
    let trimmed = raw.trim();
    // chrono accepts unpadded fields; the wire format is fixed-width
    if trimmed.len() != 10 {
        return Err(ServiceError::InvalidRequest(format!("invalid {field}: expected YYYY-MM-DD")));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ServiceError::InvalidRequest(format!("invalid {field}: expected YYYY-MM-DD")))
}

pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Parse both bounds and require `start <= end`.
pub fn parse_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), ServiceError> {
    let s = parse_date("startDate", start)?;
    let e = parse_date("endDate", end)?;
    if e < s {
        return Err(ServiceError::InvalidRange("endDate must be on or after startDate".into()));
    }
    Ok((s, e))
}
