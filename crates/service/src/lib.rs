//! Business layer for the office desk back-end.
//! - Leave editor and holiday directory on top of the working-day calendar.
//! - Booking admission core and the resources catalogue.
//! - Identity bootstrap from JWKS-verified bearer tokens.
//!
//! Each area exposes a repository trait with a SeaORM implementation and an
//! in-memory mock, and a service struct generic over it.
//!
//! ```
//! use std::sync::Arc;
//! use service::holidays::{mock::MockHolidayRepository, HolidayService};
//!
//! let svc = HolidayService::new(Arc::new(MockHolidayRepository::default()));
//! let all = tokio_test::block_on(svc.all()).unwrap();
//! assert!(all.is_empty());
//! ```

pub mod errors;
pub mod calendar;
pub mod json;
pub mod metrics;
pub mod holidays;
pub mod leave;
pub mod booking;
pub mod resources;
pub mod users;
pub mod identity;
#[cfg(test)]
pub mod test_support;
