use std::sync::Arc;

use models::booking::BookingStatus;
use serde::Deserialize;
use serde_json::value::RawValue;
use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{process_target, BookingView, Interval, NewBooking};
use super::repository::BookingRepository;
use super::stats::{utilization, ResourceUsage};
use crate::errors::ServiceError;
use crate::identity::Principal;
use crate::json::capture;
use crate::metrics::{BOOKINGS_ADMITTED_TOTAL, BOOKING_CONFLICTS_TOTAL};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingInput {
    pub resource_id: Uuid,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub details: Option<Box<RawValue>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleInput {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInput {
    pub status: String,
    pub rejection_reason: Option<String>,
}

fn count_conflict(err: ServiceError, booking: Option<Uuid>, resource: Option<Uuid>) -> ServiceError {
    if matches!(err, ServiceError::Conflict(_)) {
        BOOKING_CONFLICTS_TOTAL.inc();
        info!(booking_id = ?booking, resource_id = ?resource, "booking_conflict");
    }
    err
}

/// Booking admission core: create, reschedule, process and cancel.
pub struct BookingService<R: BookingRepository> {
    repo: Arc<R>,
}

impl<R: BookingRepository> BookingService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Admit a booking. Admins' bookings start `confirmed`, everyone else's `pending`.
    #[instrument(skip(self, principal, input), fields(user = %principal.email, resource_id = %input.resource_id))]
    pub async fn create(&self, principal: &Principal, input: CreateBookingInput) -> Result<BookingView, ServiceError> {
        let interval = Interval::parse(&input.start, &input.end)?;
        let status = if principal.is_admin() { BookingStatus::Confirmed } else { BookingStatus::Pending };
        let new = NewBooking {
            resource_id: input.resource_id,
            user_id: principal.id(),
            interval,
            status,
            details: capture(input.details),
        };
        let created = self
            .repo
            .admit(new)
            .await
            .map_err(|e| count_conflict(e, None, Some(input.resource_id)))?;
        BOOKINGS_ADMITTED_TOTAL.inc();
        info!(booking_id = %created.id, status = ?created.status, "booking_admitted");
        Ok(created.into())
    }

    /// Admins see every booking; users see their own.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<BookingView>, ServiceError> {
        let owner = if principal.is_admin() { None } else { Some(principal.id()) };
        Ok(self.repo.list(owner).await?.into_iter().map(BookingView::from).collect())
    }

    async fn owned(&self, principal: &Principal, id: Uuid) -> Result<models::booking::Model, ServiceError> {
        let b = self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("booking"))?;
        if !principal.may_access(b.user_id) {
            return Err(ServiceError::forbidden());
        }
        Ok(b)
    }

    /// Move a booking; it becomes `proposed` whatever its prior status.
    #[instrument(skip(self, principal, input), fields(booking_id = %id, user = %principal.email))]
    pub async fn reschedule(&self, principal: &Principal, id: Uuid, input: RescheduleInput) -> Result<BookingView, ServiceError> {
        let interval = Interval::parse(&input.start, &input.end)?;
        self.owned(principal, id).await?;
        let moved = self
            .repo
            .reschedule(id, interval)
            .await
            .map_err(|e| count_conflict(e, Some(id), None))?;
        info!(start = %moved.start_time, end = %moved.end_time, "booking_rescheduled");
        Ok(moved.into())
    }

    #[instrument(skip(self, principal, input), fields(booking_id = %id, by = %principal.email))]
    pub async fn process(&self, principal: &Principal, id: Uuid, input: ProcessInput) -> Result<BookingView, ServiceError> {
        principal.require_admin()?;
        let status = process_target(&input.status)?;
        let updated = self
            .repo
            .process(id, status, input.rejection_reason)
            .await
            .map_err(|e| count_conflict(e, Some(id), None))?;
        info!(status = ?updated.status, "booking_processed");
        Ok(updated.into())
    }

    /// Owner or admin. Cancelling twice is accepted.
    #[instrument(skip(self, principal), fields(booking_id = %id, user = %principal.email))]
    pub async fn cancel(&self, principal: &Principal, id: Uuid) -> Result<BookingView, ServiceError> {
        self.owned(principal, id).await?;
        let cancelled = self.repo.cancel(id).await?;
        info!("booking_cancelled");
        Ok(cancelled.into())
    }

    /// Utilisation of each resource over its confirmed bookings.
    pub async fn stats(&self, resources: &[models::resource::Model]) -> Result<Vec<ResourceUsage>, ServiceError> {
        let confirmed = self.repo.with_status(BookingStatus::Confirmed).await?;
        Ok(utilization(resources, &confirmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::repository::mock::MockBookingRepository;
    use chrono::Utc;
    use models::user::Role;

    fn principal(role: Role) -> Principal {
        let user = models::user::Model {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", Uuid::new_v4()),
            role,
            sick_allowance: 15,
            annual_allowance: 10,
            casual_allowance: 5,
            department: None,
            avatar: None,
            created_at: Utc::now().into(),
        };
        Principal::new(user, role)
    }

    fn input(resource_id: Uuid, start: &str, end: &str) -> CreateBookingInput {
        CreateBookingInput {
            resource_id,
            start: format!("2025-03-10T{start}:00Z"),
            end: format!("2025-03-10T{end}:00Z"),
            details: None,
        }
    }

    fn setup() -> (Arc<MockBookingRepository>, BookingService<MockBookingRepository>, Uuid) {
        let repo = Arc::new(MockBookingRepository::default());
        let room = repo.add_resource("R1", true);
        (Arc::clone(&repo), BookingService::new(repo), room)
    }

    #[tokio::test]
    async fn user_booking_is_pending_admin_booking_confirmed() {
        let (_, svc, room) = setup();
        let user = principal(Role::User);
        let admin = principal(Role::Admin);
        let a = svc.create(&user, input(room, "09:00", "10:00")).await.unwrap();
        let b = svc.create(&admin, input(room, "10:00", "11:00")).await.unwrap();
        assert_eq!(a.status, BookingStatus::Pending);
        assert_eq!(b.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn overlap_is_conflict_back_to_back_is_not() {
        let (repo, svc, room) = setup();
        let user = principal(Role::User);
        svc.create(&user, input(room, "09:00", "11:00")).await.unwrap();
        let err = svc.create(&user, input(room, "10:00", "12:00")).await.unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
        assert_eq!(err.status(), 409);
        svc.create(&user, input(room, "11:00", "12:00")).await.unwrap();
        assert_eq!(repo.active_count(room), 2);
    }

    #[tokio::test]
    async fn admission_preconditions() {
        let (repo, svc, _) = setup();
        let user = principal(Role::User);
        let closed = repo.add_resource("closed", false);
        let empty = input(Uuid::new_v4(), "09:00", "09:00");
        assert_eq!(svc.create(&user, empty).await.unwrap_err().code(), "INVALID_RANGE");
        let missing = input(Uuid::new_v4(), "09:00", "10:00");
        assert_eq!(svc.create(&user, missing).await.unwrap_err().code(), "NOT_FOUND");
        let inactive = input(closed, "09:00", "10:00");
        assert_eq!(svc.create(&user, inactive).await.unwrap_err().code(), "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn released_bookings_free_their_slot() {
        let (_, svc, room) = setup();
        let user = principal(Role::User);
        let admin = principal(Role::Admin);
        let first = svc.create(&user, input(room, "09:00", "10:00")).await.unwrap();
        svc.cancel(&user, first.id).await.unwrap();
        let second = svc.create(&user, input(room, "09:00", "10:00")).await.unwrap();
        let reject = ProcessInput { status: "rejected".into(), rejection_reason: Some("maintenance".into()) };
        let rejected = svc.process(&admin, second.id, reject).await.unwrap();
        assert_eq!(rejected.rejection_reason.as_deref(), Some("maintenance"));
        svc.create(&user, input(room, "09:30", "10:30")).await.unwrap();
    }

    #[tokio::test]
    async fn reactivating_a_released_booking_rechecks() {
        let (_, svc, room) = setup();
        let user = principal(Role::User);
        let admin = principal(Role::Admin);
        let first = svc.create(&user, input(room, "09:00", "10:00")).await.unwrap();
        svc.cancel(&user, first.id).await.unwrap();
        svc.create(&user, input(room, "09:30", "10:30")).await.unwrap();

        let confirm = ProcessInput { status: "confirmed".into(), rejection_reason: None };
        let err = svc.process(&admin, first.id, confirm.clone()).await.unwrap_err();
        assert_eq!(err.code(), "CONFLICT");

        // an active booking moving between active statuses is not re-checked
        let other = svc.create(&user, input(room, "12:00", "13:00")).await.unwrap();
        assert_eq!(svc.process(&admin, other.id, confirm).await.unwrap().status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn process_is_admin_only_with_valid_targets() {
        let (_, svc, room) = setup();
        let user = principal(Role::User);
        let admin = principal(Role::Admin);
        let b = svc.create(&user, input(room, "09:00", "10:00")).await.unwrap();
        let confirm = ProcessInput { status: "confirmed".into(), rejection_reason: None };
        assert_eq!(svc.process(&user, b.id, confirm).await.unwrap_err().code(), "FORBIDDEN");
        let back = ProcessInput { status: "pending".into(), rejection_reason: None };
        assert_eq!(svc.process(&admin, b.id, back).await.unwrap_err().code(), "INVALID_TYPE");
        let done = ProcessInput { status: "checked_in".into(), rejection_reason: None };
        assert_eq!(svc.process(&admin, b.id, done).await.unwrap().status, BookingStatus::CheckedIn);
    }

    #[tokio::test]
    async fn reschedule_excludes_self_and_proposes() {
        let (_, svc, room) = setup();
        let user = principal(Role::User);
        let admin = principal(Role::Admin);
        let b = svc.create(&admin, input(room, "09:00", "11:00")).await.unwrap();
        let other = svc.create(&admin, input(room, "12:00", "13:00")).await.unwrap();

        let shift = RescheduleInput { start: "2025-03-10T10:00:00Z".into(), end: "2025-03-10T12:00:00Z".into() };
        let moved = svc.reschedule(&admin, b.id, shift).await.unwrap();
        assert_eq!(moved.status, BookingStatus::Proposed);
        assert_eq!(moved.start, "2025-03-10T10:00:00+00:00");

        let clash = RescheduleInput { start: "2025-03-10T11:30:00Z".into(), end: "2025-03-10T12:30:00Z".into() };
        assert_eq!(svc.reschedule(&admin, b.id, clash).await.unwrap_err().code(), "CONFLICT");
        let bad = RescheduleInput { start: "2025-03-10T12:00:00Z".into(), end: "2025-03-10T11:00:00Z".into() };
        assert_eq!(svc.reschedule(&admin, other.id, bad).await.unwrap_err().code(), "INVALID_RANGE");
        let theirs = RescheduleInput { start: "2025-03-10T15:00:00Z".into(), end: "2025-03-10T16:00:00Z".into() };
        assert_eq!(svc.reschedule(&user, other.id, theirs).await.unwrap_err().code(), "FORBIDDEN");
    }

    #[tokio::test]
    async fn cancel_is_idempotent_and_owner_or_admin() {
        let (_, svc, room) = setup();
        let owner = principal(Role::User);
        let stranger = principal(Role::User);
        let admin = principal(Role::Admin);
        let b = svc.create(&owner, input(room, "09:00", "10:00")).await.unwrap();
        assert_eq!(svc.cancel(&stranger, b.id).await.unwrap_err().code(), "FORBIDDEN");
        let once = svc.cancel(&owner, b.id).await.unwrap();
        let twice = svc.cancel(&admin, b.id).await.unwrap();
        assert_eq!(once.status, BookingStatus::Cancelled);
        assert_eq!(twice.status, BookingStatus::Cancelled);
        assert_eq!(once.start, twice.start);
        assert_eq!(svc.cancel(&admin, Uuid::new_v4()).await.unwrap_err().code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn concurrent_overlapping_admissions_admit_exactly_one() {
        let (repo, svc, room) = setup();
        let svc = Arc::new(svc);
        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let mut handles = Vec::new();
        for (start, end) in [("09:00", "11:00"), ("10:00", "12:00")] {
            let svc = Arc::clone(&svc);
            let barrier = Arc::clone(&barrier);
            let admin = principal(Role::Admin);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                svc.create(&admin, input(room, start, end)).await
            }));
        }
        let mut admitted = 0;
        let mut conflicts = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(e) if e.code() == "CONFLICT" => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!((admitted, conflicts), (1, 1));
        assert_eq!(repo.active_count(room), 1);
    }

    #[tokio::test]
    async fn list_scope_and_order() {
        let (_, svc, room) = setup();
        let amy = principal(Role::User);
        let bob = principal(Role::User);
        let admin = principal(Role::Admin);
        svc.create(&amy, input(room, "13:00", "14:00")).await.unwrap();
        svc.create(&bob, input(room, "09:00", "10:00")).await.unwrap();
        svc.create(&amy, input(room, "11:00", "12:00")).await.unwrap();

        let mine = svc.list(&amy).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].start < mine[1].start);
        let all = svc.list(&admin).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].user_id, bob.id());
    }
}
