//! Booking admission core.
//!
//! Every admission decision for a resource runs under an exclusive lock on
//! that resource's row; bookings in `cancelled` or `rejected` never block.

pub mod domain;
pub mod repo;
pub mod repository;
pub mod service;
pub mod stats;

pub use service::BookingService;
