//! Leave editor: domain, repository and service layers.
//!
//! Day sets are derived from the working-day calculator and replaced
//! wholesale, under a row lock on the leave, whenever a pending leave's
//! dates change.

pub mod domain;
pub mod repo;
pub mod repository;
pub mod service;

pub use service::LeaveService;
