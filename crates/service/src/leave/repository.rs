use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use models::leave::LeaveStatus;
use uuid::Uuid;

use super::domain::{DayPlan, LeaveEdit, LeaveRecord, NewLeave};
use crate::errors::ServiceError;

/// Persistence for leaves and their day rows.
///
/// Every write that touches both tables runs as one unit. `edit` and
/// `delete_pending` hold an exclusive lock on the leave row while they
/// re-check its status.
#[async_trait]
pub trait LeaveRepository: Send + Sync {
    async fn holidays_between(&self, start: NaiveDate, end: NaiveDate) -> Result<HashSet<NaiveDate>, ServiceError>;

    /// Insert a pending leave and its planned days together.
    async fn insert(&self, new: NewLeave, plan: DayPlan) -> Result<LeaveRecord, ServiceError>;

    async fn get(&self, id: Uuid) -> Result<Option<LeaveRecord>, ServiceError>;

    /// Newest first. `None` lists every owner and fills `owner_email`.
    async fn list(&self, owner: Option<Uuid>) -> Result<Vec<LeaveRecord>, ServiceError>;

    /// Apply `edit` under the row lock, failing with `NOT_PENDING` if the
    /// leave was acted on since it was last read.
    async fn edit(&self, id: Uuid, edit: LeaveEdit) -> Result<LeaveRecord, ServiceError>;

    async fn set_status(
        &self,
        id: Uuid,
        status: LeaveStatus,
        comment: Option<String>,
    ) -> Result<Option<LeaveRecord>, ServiceError>;

    /// Remove a pending leave owned by `owner`; its days go with it.
    async fn delete_pending(&self, id: Uuid, owner: Uuid) -> Result<(), ServiceError>;
}

/// In-memory repository for tests. One mutex guards all rows, so each call
/// is atomic the way a transaction would be.
pub mod mock {
    use super::*;
    use super::super::domain::EditPlan;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Rows {
        leaves: HashMap<Uuid, models::leave::Model>,
        days: HashMap<Uuid, Vec<models::leave_day::Model>>,
    }

    #[derive(Default)]
    pub struct MockLeaveRepository {
        rows: Mutex<Rows>,
        holidays: Mutex<HashSet<NaiveDate>>,
        emails: Mutex<HashMap<Uuid, String>>,
    }

    impl MockLeaveRepository {
        pub fn with_holidays(dates: &[NaiveDate]) -> Self {
            let repo = Self::default();
            repo.holidays.lock().unwrap().extend(dates.iter().copied());
            repo
        }

        pub fn add_holiday(&self, date: NaiveDate) {
            self.holidays.lock().unwrap().insert(date);
        }

        pub fn register_email(&self, user_id: Uuid, email: &str) {
            self.emails.lock().unwrap().insert(user_id, email.to_string());
        }

        pub fn day_count(&self, id: Uuid) -> usize {
            self.rows.lock().unwrap().days.get(&id).map(Vec::len).unwrap_or(0)
        }

        fn day_rows(leave_id: Uuid, plan: &DayPlan) -> Vec<models::leave_day::Model> {
            plan.days
                .iter()
                .map(|p| models::leave_day::Model {
                    id: Uuid::new_v4(),
                    leave_id,
                    date: p.date,
                    is_half_day: p.half.is_some(),
                    half_day_period: p.half,
                })
                .collect()
        }

        fn record(rows: &Rows, id: Uuid) -> Option<LeaveRecord> {
            let leave = rows.leaves.get(&id)?.clone();
            let days = rows.days.get(&id).cloned().unwrap_or_default();
            Some(LeaveRecord { leave, days, owner_email: None })
        }
    }

    #[async_trait]
    impl LeaveRepository for MockLeaveRepository {
        async fn holidays_between(&self, start: NaiveDate, end: NaiveDate) -> Result<HashSet<NaiveDate>, ServiceError> {
            Ok(self.holidays.lock().unwrap().iter().copied().filter(|d| *d >= start && *d <= end).collect())
        }

        async fn insert(&self, new: NewLeave, plan: DayPlan) -> Result<LeaveRecord, ServiceError> {
            let id = Uuid::new_v4();
            let leave = models::leave::Model {
                id,
                user_id: new.user_id,
                leave_type: new.leave_type,
                start_date: new.start,
                end_date: new.end,
                total_days: plan.total,
                reason: new.reason,
                status: LeaveStatus::Pending,
                approver_comment: None,
                created_at: Utc::now().into(),
            };
            let days = Self::day_rows(id, &plan);
            let mut rows = self.rows.lock().unwrap();
            rows.leaves.insert(id, leave.clone());
            rows.days.insert(id, days.clone());
            Ok(LeaveRecord { leave, days, owner_email: None })
        }

        async fn get(&self, id: Uuid) -> Result<Option<LeaveRecord>, ServiceError> {
            Ok(Self::record(&self.rows.lock().unwrap(), id))
        }

        async fn list(&self, owner: Option<Uuid>) -> Result<Vec<LeaveRecord>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            let emails = self.emails.lock().unwrap();
            let mut out: Vec<LeaveRecord> = rows
                .leaves
                .values()
                .filter(|l| owner.map_or(true, |o| l.user_id == o))
                .filter_map(|l| Self::record(&rows, l.id))
                .map(|mut r| {
                    if owner.is_none() {
                        r.owner_email = emails.get(&r.leave.user_id).cloned();
                    }
                    r
                })
                .collect();
            out.sort_by(|a, b| b.leave.created_at.cmp(&a.leave.created_at));
            Ok(out)
        }

        async fn edit(&self, id: Uuid, edit: LeaveEdit) -> Result<LeaveRecord, ServiceError> {
            let holidays = self.holidays.lock().unwrap().clone();
            let mut rows = self.rows.lock().unwrap();
            let current = rows.leaves.get(&id).cloned().ok_or_else(|| ServiceError::not_found("leave"))?;
            if current.status != LeaveStatus::Pending {
                return Err(ServiceError::NotPending);
            }
            let mut updated = current.clone();
            match edit.resolve(&current)? {
                EditPlan::Replace { start, end, half } => {
                    let plan = DayPlan::build(start, end, &holidays, half)?;
                    updated.start_date = start;
                    updated.end_date = end;
                    updated.total_days = plan.total;
                    rows.days.insert(id, Self::day_rows(id, &plan));
                }
                EditPlan::Toggle { half } => {
                    let days = rows.days.get_mut(&id).ok_or(ServiceError::NoWorkingDays)?;
                    for day in days.iter_mut() {
                        day.is_half_day = half.is_some();
                        day.half_day_period = half;
                    }
                    updated.total_days = if half.is_some() { 0.5 } else { days.len() as f64 };
                }
            }
            rows.leaves.insert(id, updated);
            Self::record(&rows, id).ok_or_else(|| ServiceError::not_found("leave"))
        }

        async fn set_status(
            &self,
            id: Uuid,
            status: LeaveStatus,
            comment: Option<String>,
        ) -> Result<Option<LeaveRecord>, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(leave) = rows.leaves.get_mut(&id) else { return Ok(None) };
            leave.status = status;
            leave.approver_comment = comment;
            Ok(Self::record(&rows, id))
        }

        async fn delete_pending(&self, id: Uuid, owner: Uuid) -> Result<(), ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let leave = rows.leaves.get(&id).ok_or_else(|| ServiceError::not_found("leave"))?;
            if leave.user_id != owner || leave.status != LeaveStatus::Pending {
                return Err(ServiceError::forbidden());
            }
            rows.leaves.remove(&id);
            rows.days.remove(&id);
            Ok(())
        }
    }
}
