use chrono::{DateTime, FixedOffset};
use models::booking::BookingStatus;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::ServiceError;

pub type Timestamp = DateTime<FixedOffset>;

/// Half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Interval {
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, ServiceError> {
        if end <= start {
            return Err(ServiceError::InvalidRange("end must be after start".into()));
        }
        Ok(Interval { start, end })
    }

    /// Parse two RFC3339 bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self, ServiceError> {
        Self::new(parse_timestamp("start", start)?, parse_timestamp("end", end)?)
    }

    /// `[a,b)` and `[c,d)` overlap iff `a < d` and `c < b`; touching ends do not.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

pub fn parse_timestamp(field: &str, raw: &str) -> Result<Timestamp, ServiceError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|_| ServiceError::InvalidRequest(format!("invalid {field}: expected RFC3339 timestamp")))
}

/// Validated input for an admission attempt.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub resource_id: Uuid,
    pub user_id: Uuid,
    pub interval: Interval,
    pub status: BookingStatus,
    pub details: Option<String>,
}

/// Statuses an admin may set through the process operation.
pub fn process_target(raw: &str) -> Result<BookingStatus, ServiceError> {
    match BookingStatus::parse(raw) {
        Some(s @ (BookingStatus::Pending | BookingStatus::Proposed)) => {
            Err(ServiceError::InvalidType(format!("'{}' is not a processing outcome", status_name(s))))
        }
        Some(s) => Ok(s),
        None => Err(ServiceError::InvalidType(format!("unknown booking status '{raw}'"))),
    }
}

fn status_name(s: BookingStatus) -> &'static str {
    match s {
        BookingStatus::Pending => "pending",
        BookingStatus::Confirmed => "confirmed",
        BookingStatus::Rejected => "rejected",
        BookingStatus::Cancelled => "cancelled",
        BookingStatus::Completed => "completed",
        BookingStatus::CheckedIn => "checked_in",
        BookingStatus::Proposed => "proposed",
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub user_id: Uuid,
    pub start: String,
    pub end: String,
    pub status: BookingStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(serialize_with = "crate::json::serialize_raw")]
    pub details: Option<String>,
}

impl From<models::booking::Model> for BookingView {
    fn from(b: models::booking::Model) -> Self {
        BookingView {
            id: b.id,
            resource_id: b.resource_id,
            user_id: b.user_id,
            start: b.start_time.to_rfc3339(),
            end: b.end_time.to_rfc3339(),
            status: b.status,
            created_at: b.created_at.to_rfc3339(),
            rejection_reason: b.rejection_reason,
            details: b.details,
        }
    }
}
