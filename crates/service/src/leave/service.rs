use std::sync::Arc;

use models::leave::{LeaveStatus, LeaveType};
use models::leave_day::HalfDayPeriod;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{DayPlan, LeaveDayView, LeaveEdit, LeaveRecord, LeaveView, NewLeave};
use super::repository::LeaveRepository;
use crate::calendar::{parse_date, parse_range};
use crate::errors::ServiceError;
use crate::identity::Principal;
use crate::metrics::LEAVE_DAY_REPLACEMENTS_TOTAL;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveInput {
    #[serde(rename = "type")]
    pub leave_type: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub reason: String,
    pub is_half_day: Option<bool>,
    pub half_day_period: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditLeaveInput {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub is_half_day: Option<bool>,
    pub half_day_period: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveStatusInput {
    pub status: String,
    pub approver_comment: Option<String>,
}

fn period_of(raw: Option<&str>) -> Option<HalfDayPeriod> {
    raw.and_then(HalfDayPeriod::parse)
}

/// Leave editor: create, edit, approve/reject and delete over a [`LeaveRepository`].
pub struct LeaveService<R: LeaveRepository> {
    repo: Arc<R>,
}

impl<R: LeaveRepository> LeaveService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    #[instrument(skip(self, principal, input), fields(user = %principal.email))]
    pub async fn create(&self, principal: &Principal, input: CreateLeaveInput) -> Result<LeaveView, ServiceError> {
        let (start, end) = parse_range(&input.start_date, &input.end_date)?;
        let leave_type = LeaveType::parse(&input.leave_type)
            .ok_or_else(|| ServiceError::InvalidType(format!("unknown leave type '{}'", input.leave_type)))?;
        let half = if input.is_half_day == Some(true) {
            if start != end {
                return Err(ServiceError::HalfDayRequiresSingleDay);
            }
            Some(period_of(input.half_day_period.as_deref()).ok_or(ServiceError::HalfDayPeriodRequired)?)
        } else {
            None
        };

        let holidays = self.repo.holidays_between(start, end).await?;
        let plan = DayPlan::build(start, end, &holidays, half)?;
        let new = NewLeave { user_id: principal.id(), leave_type, start, end, reason: input.reason };
        let rec = self.repo.insert(new, plan).await?;
        info!(leave_id = %rec.leave.id, total_days = rec.leave.total_days, "leave_created");
        Ok(rec.into())
    }

    /// Load a leave the caller may see.
    async fn visible(&self, principal: &Principal, id: Uuid) -> Result<LeaveRecord, ServiceError> {
        let rec = self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("leave"))?;
        if !principal.may_access(rec.leave.user_id) {
            return Err(ServiceError::forbidden());
        }
        Ok(rec)
    }

    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<LeaveView, ServiceError> {
        Ok(self.visible(principal, id).await?.into())
    }

    pub async fn days(&self, principal: &Principal, id: Uuid) -> Result<Vec<LeaveDayView>, ServiceError> {
        let view: LeaveView = self.visible(principal, id).await?.into();
        Ok(view.days)
    }

    /// Admins see every leave with its owner's email; users see their own.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<LeaveView>, ServiceError> {
        let owner = if principal.is_admin() { None } else { Some(principal.id()) };
        Ok(self.repo.list(owner).await?.into_iter().map(LeaveView::from).collect())
    }

    /// Replace the dates (and optionally the half-day marker) of a pending leave.
    #[instrument(skip(self, principal, input), fields(leave_id = %id, user = %principal.email))]
    pub async fn edit(&self, principal: &Principal, id: Uuid, input: EditLeaveInput) -> Result<LeaveView, ServiceError> {
        let start = input.start_date.as_deref().map(|s| parse_date("startDate", s)).transpose()?;
        let end = input.end_date.as_deref().map(|s| parse_date("endDate", s)).transpose()?;
        let period = match input.half_day_period.as_deref() {
            None => None,
            Some(raw) => match HalfDayPeriod::parse(raw) {
                Some(p) => Some(p),
                None if input.is_half_day == Some(true) => return Err(ServiceError::HalfDayPeriodRequired),
                None => return Err(ServiceError::InvalidRequest(format!("invalid halfDayPeriod '{raw}'"))),
            },
        };

        // preflight; the repository re-checks status under the row lock
        let current = self.visible(principal, id).await?;
        if current.leave.status != LeaveStatus::Pending {
            return Err(ServiceError::NotPending);
        }

        let edit = LeaveEdit { start, end, is_half_day: input.is_half_day, period };
        let rec = self.repo.edit(id, edit).await?;
        LEAVE_DAY_REPLACEMENTS_TOTAL.inc();
        info!(
            start = %rec.leave.start_date,
            end = %rec.leave.end_date,
            total_days = rec.leave.total_days,
            "leave_days_replaced"
        );
        Ok(rec.into())
    }

    /// Admin status change. Same-status calls are accepted and overwrite the comment.
    #[instrument(skip(self, principal, input), fields(leave_id = %id, by = %principal.email))]
    pub async fn set_status(&self, principal: &Principal, id: Uuid, input: LeaveStatusInput) -> Result<LeaveView, ServiceError> {
        principal.require_admin()?;
        let status = LeaveStatus::parse(&input.status)
            .ok_or_else(|| ServiceError::InvalidType(format!("unknown leave status '{}'", input.status)))?;
        let comment = match status {
            LeaveStatus::Pending => None,
            _ => input.approver_comment,
        };
        let rec = self.repo.set_status(id, status, comment).await?.ok_or_else(|| ServiceError::not_found("leave"))?;
        info!(status = ?rec.leave.status, "leave_status_set");
        Ok(rec.into())
    }

    /// Owner-only delete of a pending leave.
    #[instrument(skip(self, principal), fields(leave_id = %id, user = %principal.email))]
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), ServiceError> {
        self.repo.delete_pending(id, principal.id()).await?;
        info!("leave_deleted");
        Ok(())
    }
}
