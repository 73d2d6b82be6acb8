use async_trait::async_trait;
use models::booking::BookingStatus;
use uuid::Uuid;

use super::domain::{Interval, NewBooking};
use crate::errors::ServiceError;

pub const SLOT_TAKEN: &str = "conflict detected: this slot is already booked";
pub const NEW_SLOT_TAKEN: &str = "conflict detected in new time slot";

/// Persistence for bookings.
///
/// `admit`, `reschedule` and `process` take an exclusive lock on the
/// resource row before checking for overlaps, so every admission decision
/// for one resource happens in a single total order.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert `new` if its interval is free on an active resource.
    async fn admit(&self, new: NewBooking) -> Result<models::booking::Model, ServiceError>;

    async fn get(&self, id: Uuid) -> Result<Option<models::booking::Model>, ServiceError>;

    /// Ordered by start. `None` lists every user's bookings.
    async fn list(&self, owner: Option<Uuid>) -> Result<Vec<models::booking::Model>, ServiceError>;

    async fn with_status(&self, status: BookingStatus) -> Result<Vec<models::booking::Model>, ServiceError>;

    /// Move the booking to `interval` and mark it `proposed`.
    async fn reschedule(&self, id: Uuid, interval: Interval) -> Result<models::booking::Model, ServiceError>;

    /// Set `status`, re-checking overlaps when a released booking becomes active again.
    async fn process(
        &self,
        id: Uuid,
        status: BookingStatus,
        reason: Option<String>,
    ) -> Result<models::booking::Model, ServiceError>;

    async fn cancel(&self, id: Uuid) -> Result<models::booking::Model, ServiceError>;
}

/// In-memory store for tests. Holds resources as well as bookings; one mutex
/// stands in for the per-resource row lock.
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct Rows {
        pub(crate) resources: HashMap<Uuid, models::resource::Model>,
        pub(crate) bookings: HashMap<Uuid, models::booking::Model>,
    }

    #[derive(Default)]
    pub struct MockBookingRepository {
        pub(crate) rows: Mutex<Rows>,
    }

    impl MockBookingRepository {
        pub fn add_resource(&self, name: &str, active: bool) -> Uuid {
            let id = Uuid::new_v4();
            let res = models::resource::Model {
                id,
                name: name.to_string(),
                resource_type: "room".into(),
                description: None,
                is_active: active,
                min_lead_time_hours: 0,
                icon: None,
                color: None,
                specs: None,
                form_fields: None,
                created_at: Utc::now().into(),
            };
            self.rows.lock().unwrap().resources.insert(id, res);
            id
        }

        pub fn active_count(&self, resource_id: Uuid) -> usize {
            let rows = self.rows.lock().unwrap();
            rows.bookings.values().filter(|b| b.resource_id == resource_id && b.status.holds_slot()).count()
        }

        fn clashes(rows: &Rows, resource_id: Uuid, iv: &Interval, exclude: Option<Uuid>) -> bool {
            rows.bookings.values().any(|b| {
                b.resource_id == resource_id
                    && Some(b.id) != exclude
                    && b.status.holds_slot()
                    && iv.overlaps(&Interval { start: b.start_time, end: b.end_time })
            })
        }

        fn usable_resource(rows: &Rows, resource_id: Uuid) -> Result<(), ServiceError> {
            let res = rows.resources.get(&resource_id).ok_or_else(|| ServiceError::not_found("resource"))?;
            if !res.is_active {
                return Err(ServiceError::InvalidRequest("resource is not active".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl BookingRepository for MockBookingRepository {
        async fn admit(&self, new: NewBooking) -> Result<models::booking::Model, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            Self::usable_resource(&rows, new.resource_id)?;
            if Self::clashes(&rows, new.resource_id, &new.interval, None) {
                return Err(ServiceError::Conflict(SLOT_TAKEN.into()));
            }
            let b = models::booking::Model {
                id: Uuid::new_v4(),
                resource_id: new.resource_id,
                user_id: new.user_id,
                start_time: new.interval.start,
                end_time: new.interval.end,
                status: new.status,
                rejection_reason: None,
                details: new.details,
                created_at: Utc::now().into(),
            };
            rows.bookings.insert(b.id, b.clone());
            Ok(b)
        }

        async fn get(&self, id: Uuid) -> Result<Option<models::booking::Model>, ServiceError> {
            Ok(self.rows.lock().unwrap().bookings.get(&id).cloned())
        }

        async fn list(&self, owner: Option<Uuid>) -> Result<Vec<models::booking::Model>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<_> =
                rows.bookings.values().filter(|b| owner.map_or(true, |o| b.user_id == o)).cloned().collect();
            out.sort_by_key(|b| b.start_time);
            Ok(out)
        }

        async fn with_status(&self, status: BookingStatus) -> Result<Vec<models::booking::Model>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.bookings.values().filter(|b| b.status == status).cloned().collect())
        }

        async fn reschedule(&self, id: Uuid, interval: Interval) -> Result<models::booking::Model, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let resource_id = rows.bookings.get(&id).ok_or_else(|| ServiceError::not_found("booking"))?.resource_id;
            Self::usable_resource(&rows, resource_id)?;
            if Self::clashes(&rows, resource_id, &interval, Some(id)) {
                return Err(ServiceError::Conflict(NEW_SLOT_TAKEN.into()));
            }
            let b = rows.bookings.get_mut(&id).ok_or_else(|| ServiceError::not_found("booking"))?;
            b.start_time = interval.start;
            b.end_time = interval.end;
            b.status = BookingStatus::Proposed;
            Ok(b.clone())
        }

        async fn process(
            &self,
            id: Uuid,
            status: BookingStatus,
            reason: Option<String>,
        ) -> Result<models::booking::Model, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let current = rows.bookings.get(&id).cloned().ok_or_else(|| ServiceError::not_found("booking"))?;
            if !current.status.holds_slot() && status.holds_slot() {
                let iv = Interval { start: current.start_time, end: current.end_time };
                if Self::clashes(&rows, current.resource_id, &iv, Some(id)) {
                    return Err(ServiceError::Conflict(SLOT_TAKEN.into()));
                }
            }
            let b = rows.bookings.get_mut(&id).ok_or_else(|| ServiceError::not_found("booking"))?;
            b.status = status;
            if reason.is_some() {
                b.rejection_reason = reason;
            }
            Ok(b.clone())
        }

        async fn cancel(&self, id: Uuid) -> Result<models::booking::Model, ServiceError> {
            let mut rows = self.rows.lock().unwrap();
            let b = rows.bookings.get_mut(&id).ok_or_else(|| ServiceError::not_found("booking"))?;
            b.status = BookingStatus::Cancelled;
            Ok(b.clone())
        }
    }
}
