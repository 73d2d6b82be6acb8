use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use models::leave::LeaveStatus;
use models::pool::DbPool;
use models::{leave, leave_day, user};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::holidays::seaorm::holiday_dates;
use crate::leave::domain::{DayPlan, EditPlan, LeaveEdit, LeaveRecord, NewLeave};
use crate::leave::repository::LeaveRepository;

pub struct SeaOrmLeaveRepository {
    pub pool: Arc<DbPool>,
}

impl SeaOrmLeaveRepository {
    pub fn new(pool: Arc<DbPool>) -> Self { Self { pool } }
}

async fn insert_days<C: ConnectionTrait>(db: &C, leave_id: Uuid, plan: &DayPlan) -> Result<(), ServiceError> {
    let rows = plan.days.iter().map(|p| leave_day::ActiveModel {
        id: Set(Uuid::new_v4()),
        leave_id: Set(leave_id),
        date: Set(p.date),
        is_half_day: Set(p.half.is_some()),
        half_day_period: Set(p.half),
    });
    leave_day::Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

async fn days_of<C: ConnectionTrait>(db: &C, leave_id: Uuid) -> Result<Vec<leave_day::Model>, ServiceError> {
    Ok(leave_day::Entity::find()
        .filter(leave_day::Column::LeaveId.eq(leave_id))
        .order_by_asc(leave_day::Column::Date)
        .all(db)
        .await?)
}

#[async_trait]
impl LeaveRepository for SeaOrmLeaveRepository {
    async fn holidays_between(&self, start: NaiveDate, end: NaiveDate) -> Result<HashSet<NaiveDate>, ServiceError> {
        holiday_dates(self.pool.conn().as_ref(), start, end).await
    }

    async fn insert(&self, new: NewLeave, plan: DayPlan) -> Result<LeaveRecord, ServiceError> {
        let db = self.pool.conn();
        let txn = db.begin().await?;
        let id = Uuid::new_v4();
        let am = leave::ActiveModel {
            id: Set(id),
            user_id: Set(new.user_id),
            leave_type: Set(new.leave_type),
            start_date: Set(new.start),
            end_date: Set(new.end),
            total_days: Set(plan.total),
            reason: Set(new.reason),
            status: Set(LeaveStatus::Pending),
            approver_comment: Set(None),
            created_at: Set(Utc::now().into()),
        };
        let leave = am.insert(&txn).await?;
        insert_days(&txn, id, &plan).await?;
        let days = days_of(&txn, id).await?;
        txn.commit().await?;
        Ok(LeaveRecord { leave, days, owner_email: None })
    }

    async fn get(&self, id: Uuid) -> Result<Option<LeaveRecord>, ServiceError> {
        let db = self.pool.conn();
        let Some(leave) = leave::Entity::find_by_id(id).one(db.as_ref()).await? else { return Ok(None) };
        let days = days_of(db.as_ref(), id).await?;
        Ok(Some(LeaveRecord { leave, days, owner_email: None }))
    }

    async fn list(&self, owner: Option<Uuid>) -> Result<Vec<LeaveRecord>, ServiceError> {
        let db = self.pool.conn();
        let mut q = leave::Entity::find().order_by_desc(leave::Column::CreatedAt);
        if let Some(o) = owner {
            q = q.filter(leave::Column::UserId.eq(o));
        }
        let leaves = q.all(db.as_ref()).await?;
        if leaves.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = leaves.iter().map(|l| l.id).collect();
        let mut by_leave: HashMap<Uuid, Vec<leave_day::Model>> = HashMap::new();
        for day in leave_day::Entity::find()
            .filter(leave_day::Column::LeaveId.is_in(ids))
            .order_by_asc(leave_day::Column::Date)
            .all(db.as_ref())
            .await?
        {
            by_leave.entry(day.leave_id).or_default().push(day);
        }

        let emails: HashMap<Uuid, String> = if owner.is_none() {
            let user_ids: HashSet<Uuid> = leaves.iter().map(|l| l.user_id).collect();
            user::Entity::find()
                .filter(user::Column::Id.is_in(user_ids))
                .all(db.as_ref())
                .await?
                .into_iter()
                .map(|u| (u.id, u.email))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(leaves
            .into_iter()
            .map(|leave| LeaveRecord {
                days: by_leave.remove(&leave.id).unwrap_or_default(),
                owner_email: emails.get(&leave.user_id).cloned(),
                leave,
            })
            .collect())
    }

    async fn edit(&self, id: Uuid, edit: LeaveEdit) -> Result<LeaveRecord, ServiceError> {
        let db = self.pool.conn();
        let txn = db.begin().await?;

        let current = leave::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("leave"))?;
        if current.status != LeaveStatus::Pending {
            return Err(ServiceError::NotPending);
        }

        let (start, end, total) = match edit.resolve(&current)? {
            EditPlan::Replace { start, end, half } => {
                leave_day::Entity::delete_many()
                    .filter(leave_day::Column::LeaveId.eq(id))
                    .exec(&txn)
                    .await?;
                let holidays = holiday_dates(&txn, start, end).await?;
                let plan = DayPlan::build(start, end, &holidays, half)?;
                insert_days(&txn, id, &plan).await?;
                (start, end, plan.total)
            }
            EditPlan::Toggle { half } => {
                let days = days_of(&txn, id).await?;
                if days.is_empty() {
                    return Err(ServiceError::NoWorkingDays);
                }
                let count = days.len();
                for day in days {
                    let mut am: leave_day::ActiveModel = day.into();
                    am.is_half_day = Set(half.is_some());
                    am.half_day_period = Set(half);
                    am.update(&txn).await?;
                }
                let total = if half.is_some() { 0.5 } else { count as f64 };
                (current.start_date, current.end_date, total)
            }
        };

        let res = leave::Entity::update_many()
            .col_expr(leave::Column::StartDate, Expr::value(start))
            .col_expr(leave::Column::EndDate, Expr::value(end))
            .col_expr(leave::Column::TotalDays, Expr::value(total))
            .filter(leave::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("leave"));
        }

        let leave = leave::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("leave"))?;
        let days = days_of(&txn, id).await?;
        txn.commit().await?;
        debug!(leave_id = %id, days = days.len(), "leave edit committed");
        Ok(LeaveRecord { leave, days, owner_email: None })
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: LeaveStatus,
        comment: Option<String>,
    ) -> Result<Option<LeaveRecord>, ServiceError> {
        let db = self.pool.conn();
        let Some(found) = leave::Entity::find_by_id(id).one(db.as_ref()).await? else { return Ok(None) };
        let mut am: leave::ActiveModel = found.into();
        am.status = Set(status);
        am.approver_comment = Set(comment);
        let leave = am.update(db.as_ref()).await?;
        let days = days_of(db.as_ref(), id).await?;
        Ok(Some(LeaveRecord { leave, days, owner_email: None }))
    }

    async fn delete_pending(&self, id: Uuid, owner: Uuid) -> Result<(), ServiceError> {
        let db = self.pool.conn();
        let txn = db.begin().await?;
        let current = leave::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("leave"))?;
        if current.user_id != owner || current.status != LeaveStatus::Pending {
            return Err(ServiceError::forbidden());
        }
        leave::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Principal;
    use crate::leave::service::{CreateLeaveInput, EditLeaveInput, LeaveStatusInput};
    use crate::leave::LeaveService;
    use crate::test_support::{get_pool, new_user};
    use models::user::Role;

    fn create_input(start: &str, end: &str) -> CreateLeaveInput {
        CreateLeaveInput {
            leave_type: "annual".into(),
            start_date: start.into(),
            end_date: end.into(),
            reason: "trip".into(),
            is_half_day: None,
            half_day_period: None,
        }
    }

    #[tokio::test]
    async fn edit_replaces_days_in_one_transaction() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let pool = get_pool().await?;
        let user = new_user(&pool, Role::User).await?;
        let me = Principal::new(user.clone(), Role::User);
        let svc = LeaveService::new(Arc::new(SeaOrmLeaveRepository::new(Arc::clone(&pool))));

        let created = svc.create(&me, create_input("2031-03-10", "2031-03-14")).await?;
        assert_eq!(created.total_leave_days, 5.0);

        let edit = EditLeaveInput {
            start_date: Some("2031-03-12".into()),
            end_date: Some("2031-03-18".into()),
            ..Default::default()
        };
        let edited = svc.edit(&me, created.id, edit).await?;
        let dates: Vec<_> = edited.days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2031-03-12", "2031-03-13", "2031-03-14", "2031-03-17", "2031-03-18"]);
        assert_eq!(edited.total_leave_days, 5.0);

        // a weekend-only edit rolls back and leaves the previous days in place
        let weekend = EditLeaveInput {
            start_date: Some("2031-03-22".into()),
            end_date: Some("2031-03-23".into()),
            ..Default::default()
        };
        assert_eq!(svc.edit(&me, created.id, weekend).await.unwrap_err().code(), "NO_WORKING_DAYS");
        let after = svc.get(&me, created.id).await?;
        assert_eq!(after.start_date, "2031-03-12");
        assert_eq!(after.days.len(), 5);

        svc.delete(&me, created.id).await?;
        user::Entity::delete_by_id(user.id).exec(pool.conn().as_ref()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn approved_leave_is_frozen() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let pool = get_pool().await?;
        let user = new_user(&pool, Role::User).await?;
        let me = Principal::new(user.clone(), Role::User);
        let admin = Principal::new(new_user(&pool, Role::Admin).await?, Role::Admin);
        let svc = LeaveService::new(Arc::new(SeaOrmLeaveRepository::new(Arc::clone(&pool))));

        let created = svc.create(&me, create_input("2032-06-01", "2032-06-01")).await?;
        let approve = LeaveStatusInput { status: "approved".into(), approver_comment: Some("ok".into()) };
        svc.set_status(&admin, created.id, approve).await?;

        let edit = EditLeaveInput { end_date: Some("2032-06-02".into()), ..Default::default() };
        assert_eq!(svc.edit(&me, created.id, edit).await.unwrap_err().code(), "NOT_PENDING");
        assert_eq!(svc.delete(&me, created.id).await.unwrap_err().code(), "FORBIDDEN");
        assert_eq!(svc.days(&me, created.id).await?.len(), 1);

        user::Entity::delete_by_id(user.id).exec(pool.conn().as_ref()).await?;
        user::Entity::delete_by_id(admin.id()).exec(pool.conn().as_ref()).await?;
        Ok(())
    }
}
