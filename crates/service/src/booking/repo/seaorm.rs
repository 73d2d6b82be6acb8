use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use models::booking::{self, BookingStatus};
use models::pool::DbPool;
use models::resource;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::booking::domain::{Interval, NewBooking};
use crate::booking::repository::{BookingRepository, NEW_SLOT_TAKEN, SLOT_TAKEN};
use crate::errors::ServiceError;

pub struct SeaOrmBookingRepository {
    pub pool: Arc<DbPool>,
}

impl SeaOrmBookingRepository {
    pub fn new(pool: Arc<DbPool>) -> Self { Self { pool } }
}

/// `SELECT ... FOR UPDATE` on the resource row: the per-resource serialization point.
async fn lock_resource(txn: &DatabaseTransaction, resource_id: Uuid) -> Result<resource::Model, ServiceError> {
    resource::Entity::find_by_id(resource_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("resource"))
}

async fn lock_active_resource(txn: &DatabaseTransaction, resource_id: Uuid) -> Result<resource::Model, ServiceError> {
    let res = lock_resource(txn, resource_id).await?;
    if !res.is_active {
        return Err(ServiceError::InvalidRequest("resource is not active".into()));
    }
    Ok(res)
}

/// Active bookings on `resource_id` overlapping `iv`, optionally ignoring one booking.
async fn overlapping<C: ConnectionTrait>(
    db: &C,
    resource_id: Uuid,
    iv: &Interval,
    exclude: Option<Uuid>,
) -> Result<u64, ServiceError> {
    let mut q = booking::Entity::find()
        .filter(booking::Column::ResourceId.eq(resource_id))
        .filter(booking::Column::Status.is_not_in(BookingStatus::RELEASED))
        .filter(booking::Column::StartTime.lt(iv.end))
        .filter(booking::Column::EndTime.gt(iv.start));
    if let Some(id) = exclude {
        q = q.filter(booking::Column::Id.ne(id));
    }
    Ok(q.count(db).await?)
}

async fn booking_in<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<booking::Model, ServiceError> {
    booking::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("booking"))
}

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn admit(&self, new: NewBooking) -> Result<booking::Model, ServiceError> {
        let db = self.pool.conn();
        let txn = db.begin().await?;
        lock_active_resource(&txn, new.resource_id).await?;
        if overlapping(&txn, new.resource_id, &new.interval, None).await? > 0 {
            return Err(ServiceError::Conflict(SLOT_TAKEN.into()));
        }
        let am = booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            resource_id: Set(new.resource_id),
            user_id: Set(new.user_id),
            start_time: Set(new.interval.start),
            end_time: Set(new.interval.end),
            status: Set(new.status),
            rejection_reason: Set(None),
            details: Set(new.details),
            created_at: Set(Utc::now().into()),
        };
        let created = am.insert(&txn).await?;
        txn.commit().await?;
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<booking::Model>, ServiceError> {
        Ok(booking::Entity::find_by_id(id).one(self.pool.conn().as_ref()).await?)
    }

    async fn list(&self, owner: Option<Uuid>) -> Result<Vec<booking::Model>, ServiceError> {
        let mut q = booking::Entity::find().order_by_asc(booking::Column::StartTime);
        if let Some(o) = owner {
            q = q.filter(booking::Column::UserId.eq(o));
        }
        Ok(q.all(self.pool.conn().as_ref()).await?)
    }

    async fn with_status(&self, status: BookingStatus) -> Result<Vec<booking::Model>, ServiceError> {
        Ok(booking::Entity::find()
            .filter(booking::Column::Status.eq(status))
            .all(self.pool.conn().as_ref())
            .await?)
    }

    async fn reschedule(&self, id: Uuid, interval: Interval) -> Result<booking::Model, ServiceError> {
        let db = self.pool.conn();
        let txn = db.begin().await?;
        let found = booking_in(&txn, id).await?;
        lock_active_resource(&txn, found.resource_id).await?;
        // re-read under the lock
        let current = booking_in(&txn, id).await?;
        if overlapping(&txn, current.resource_id, &interval, Some(id)).await? > 0 {
            return Err(ServiceError::Conflict(NEW_SLOT_TAKEN.into()));
        }
        let mut am: booking::ActiveModel = current.into();
        am.start_time = Set(interval.start);
        am.end_time = Set(interval.end);
        am.status = Set(BookingStatus::Proposed);
        let updated = am.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    async fn process(
        &self,
        id: Uuid,
        status: BookingStatus,
        reason: Option<String>,
    ) -> Result<booking::Model, ServiceError> {
        let db = self.pool.conn();
        let txn = db.begin().await?;
        let found = booking_in(&txn, id).await?;
        lock_resource(&txn, found.resource_id).await?;
        let current = booking_in(&txn, id).await?;
        if !current.status.holds_slot() && status.holds_slot() {
            let iv = Interval { start: current.start_time, end: current.end_time };
            if overlapping(&txn, current.resource_id, &iv, Some(id)).await? > 0 {
                return Err(ServiceError::Conflict(SLOT_TAKEN.into()));
            }
            debug!(booking_id = %id, "reactivation re-check passed");
        }
        let mut am: booking::ActiveModel = current.into();
        am.status = Set(status);
        if reason.is_some() {
            am.rejection_reason = Set(reason);
        }
        let updated = am.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    async fn cancel(&self, id: Uuid) -> Result<booking::Model, ServiceError> {
        let db = self.pool.conn();
        let current = booking_in(db.as_ref(), id).await?;
        let mut am: booking::ActiveModel = current.into();
        am.status = Set(BookingStatus::Cancelled);
        Ok(am.update(db.as_ref()).await?)
    }
}
