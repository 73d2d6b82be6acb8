use std::collections::HashSet;

use chrono::NaiveDate;
use models::leave::{LeaveStatus, LeaveType};
use models::leave_day::HalfDayPeriod;
use serde::Serialize;
use uuid::Uuid;

use crate::calendar::{format_date, working_days};
use crate::errors::ServiceError;

/// One derived day of leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedDay {
    pub date: NaiveDate,
    pub half: Option<HalfDayPeriod>,
}

/// The working-day set for a range, ready to be written as `leave_days` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan {
    pub days: Vec<PlannedDay>,
    pub total: f64,
}

impl DayPlan {
    /// Derive days for `[start, end]` minus weekends and `holidays`.
    ///
    /// `half` marks the sole day of a single-day range as a half day.
    pub fn build(
        start: NaiveDate,
        end: NaiveDate,
        holidays: &HashSet<NaiveDate>,
        half: Option<HalfDayPeriod>,
    ) -> Result<Self, ServiceError> {
        if end < start {
            return Err(ServiceError::InvalidRange("endDate must be on or after startDate".into()));
        }
        if half.is_some() && start != end {
            return Err(ServiceError::HalfDayRequiresSingleDay);
        }
        let dates = working_days(start, end, holidays);
        if dates.is_empty() {
            return Err(ServiceError::NoWorkingDays);
        }
        let total = if half.is_some() { 0.5 } else { dates.len() as f64 };
        let days = dates.into_iter().map(|date| PlannedDay { date, half }).collect();
        Ok(DayPlan { days, total })
    }
}

/// Validated input for a new leave.
#[derive(Debug, Clone)]
pub struct NewLeave {
    pub user_id: Uuid,
    pub leave_type: LeaveType,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub reason: String,
}

/// Requested change to a pending leave. Absent fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct LeaveEdit {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub is_half_day: Option<bool>,
    pub period: Option<HalfDayPeriod>,
}

/// What an edit does to the stored day rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPlan {
    /// Delete every day and derive a fresh set for the new range.
    Replace { start: NaiveDate, end: NaiveDate, half: Option<HalfDayPeriod> },
    /// Flip the half-day marker on the sole day of an unchanged single-day leave.
    Toggle { half: Option<HalfDayPeriod> },
}

impl LeaveEdit {
    /// Resolve against the locked row. Called inside the edit transaction.
    pub fn resolve(&self, current: &models::leave::Model) -> Result<EditPlan, ServiceError> {
        let start = self.start.unwrap_or(current.start_date);
        let end = self.end.unwrap_or(current.end_date);
        if end < start {
            return Err(ServiceError::InvalidRange("endDate must be on or after startDate".into()));
        }
        let half = match (self.is_half_day, self.period) {
            (Some(true), None) => return Err(ServiceError::HalfDayPeriodRequired),
            (Some(true), Some(_)) if start != end => {
                return Err(ServiceError::Conflict("half-day leave must start and end on the same day".into()))
            }
            (Some(true), Some(p)) => Some(p),
            (None, Some(_)) => {
                return Err(ServiceError::InvalidRequest("halfDayPeriod requires isHalfDay=true".into()))
            }
            (Some(false), _) | (None, None) => None,
        };
        let unchanged = start == current.start_date && end == current.end_date;
        if self.is_half_day.is_some() && unchanged && start == end {
            return Ok(EditPlan::Toggle { half });
        }
        Ok(EditPlan::Replace { start, end, half })
    }
}

/// A leave row together with its day rows.
#[derive(Debug, Clone)]
pub struct LeaveRecord {
    pub leave: models::leave::Model,
    pub days: Vec<models::leave_day::Model>,
    pub owner_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDayView {
    pub id: Uuid,
    pub leave_id: Uuid,
    pub date: String,
    pub is_half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
}

impl From<models::leave_day::Model> for LeaveDayView {
    fn from(d: models::leave_day::Model) -> Self {
        LeaveDayView {
            id: d.id,
            leave_id: d.leave_id,
            date: format_date(d.date),
            is_half_day: d.is_half_day,
            half_day_period: d.half_day_period,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveView {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
    pub status: LeaveStatus,
    pub approver_comment: Option<String>,
    pub created_at: String,
    pub total_leave_days: f64,
    pub days: Vec<LeaveDayView>,
}

impl From<LeaveRecord> for LeaveView {
    fn from(r: LeaveRecord) -> Self {
        let LeaveRecord { leave, mut days, owner_email } = r;
        days.sort_by_key(|d| d.date);
        LeaveView {
            id: leave.id,
            user_id: leave.user_id,
            user_email: owner_email,
            leave_type: leave.leave_type,
            start_date: format_date(leave.start_date),
            end_date: format_date(leave.end_date),
            reason: leave.reason,
            status: leave.status,
            approver_comment: leave.approver_comment,
            created_at: leave.created_at.to_rfc3339(),
            total_leave_days: leave.total_days,
            days: days.into_iter().map(LeaveDayView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn stored(start: &str, end: &str) -> models::leave::Model {
        models::leave::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            leave_type: LeaveType::Annual,
            start_date: d(start),
            end_date: d(end),
            total_days: 1.0,
            reason: "r".into(),
            status: LeaveStatus::Pending,
            approver_comment: None,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn full_days_count_working_dates() {
        let plan = DayPlan::build(d("2025-03-10"), d("2025-03-17"), &HashSet::new(), None).unwrap();
        assert_eq!(plan.total, 6.0);
        assert!(plan.days.iter().all(|p| p.half.is_none()));
    }

    #[test]
    fn half_day_is_one_row_worth_half() {
        let plan =
            DayPlan::build(d("2025-03-11"), d("2025-03-11"), &HashSet::new(), Some(HalfDayPeriod::Morning)).unwrap();
        assert_eq!(plan.total, 0.5);
        assert_eq!(plan.days, vec![PlannedDay { date: d("2025-03-11"), half: Some(HalfDayPeriod::Morning) }]);
    }

    #[test]
    fn half_day_on_range_or_weekend_fails() {
        let err = DayPlan::build(d("2025-03-10"), d("2025-03-11"), &HashSet::new(), Some(HalfDayPeriod::Evening));
        assert_eq!(err.unwrap_err().code(), "HALF_DAY_REQUIRES_SINGLE_DAY");
        let err = DayPlan::build(d("2025-03-15"), d("2025-03-15"), &HashSet::new(), Some(HalfDayPeriod::Evening));
        assert_eq!(err.unwrap_err().code(), "NO_WORKING_DAYS");
    }

    #[test]
    fn every_day_a_holiday_has_no_working_days() {
        let holidays: HashSet<_> = [d("2025-03-10"), d("2025-03-11")].into_iter().collect();
        let err = DayPlan::build(d("2025-03-10"), d("2025-03-11"), &holidays, None).unwrap_err();
        assert_eq!(err.code(), "NO_WORKING_DAYS");
    }

    #[test]
    fn edit_defaults_missing_dates() {
        let cur = stored("2025-03-10", "2025-03-14");
        let plan = LeaveEdit { end: Some(d("2025-03-12")), ..Default::default() }.resolve(&cur).unwrap();
        assert_eq!(plan, EditPlan::Replace { start: d("2025-03-10"), end: d("2025-03-12"), half: None });
        let err = LeaveEdit { start: Some(d("2025-03-20")), ..Default::default() }.resolve(&cur).unwrap_err();
        assert_eq!(err.code(), "INVALID_RANGE");
    }

    #[test]
    fn half_day_on_multi_day_edit_conflicts() {
        let cur = stored("2025-03-10", "2025-03-14");
        let edit = LeaveEdit { is_half_day: Some(true), period: Some(HalfDayPeriod::Morning), ..Default::default() };
        assert_eq!(edit.resolve(&cur).unwrap_err().status(), 409);
        let edit = LeaveEdit { is_half_day: Some(true), ..Default::default() };
        assert_eq!(edit.resolve(&cur).unwrap_err().code(), "HALF_DAY_PERIOD_REQUIRED");
        let edit = LeaveEdit { period: Some(HalfDayPeriod::Morning), ..Default::default() };
        assert_eq!(edit.resolve(&cur).unwrap_err().code(), "INVALID_REQUEST");
    }

    #[test]
    fn half_day_flag_alone_on_single_day_toggles() {
        let cur = stored("2025-03-11", "2025-03-11");
        let edit = LeaveEdit { is_half_day: Some(true), period: Some(HalfDayPeriod::Evening), ..Default::default() };
        assert_eq!(edit.resolve(&cur).unwrap(), EditPlan::Toggle { half: Some(HalfDayPeriod::Evening) });
        let edit = LeaveEdit { is_half_day: Some(false), ..Default::default() };
        assert_eq!(edit.resolve(&cur).unwrap(), EditPlan::Toggle { half: None });
    }

    #[test]
    fn moving_a_half_day_replaces() {
        let cur = stored("2025-03-11", "2025-03-11");
        let edit = LeaveEdit {
            start: Some(d("2025-03-12")),
            end: Some(d("2025-03-12")),
            is_half_day: Some(true),
            period: Some(HalfDayPeriod::Morning),
        };
        assert_eq!(
            edit.resolve(&cur).unwrap(),
            EditPlan::Replace { start: d("2025-03-12"), end: d("2025-03-12"), half: Some(HalfDayPeriod::Morning) }
        );
    }

    #[test]
    fn view_sorts_days_and_hides_missing_email() {
        let cur = stored("2025-03-10", "2025-03-11");
        let day = |s: &str| models::leave_day::Model {
            id: Uuid::new_v4(),
            leave_id: cur.id,
            date: d(s),
            is_half_day: false,
            half_day_period: None,
        };
        let view = LeaveView::from(LeaveRecord {
            leave: cur.clone(),
            days: vec![day("2025-03-11"), day("2025-03-10")],
            owner_email: None,
        });
        assert_eq!(view.days[0].date, "2025-03-10");
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("userEmail").is_none());
        assert_eq!(json["type"], "annual");
        assert_eq!(json["days"][0]["halfDayPeriod"], serde_json::Value::Null);
    }
}
