//! SeaORM entities for users, holidays, leaves, leave days, resources and bookings,
//! plus connection helpers and the swappable pool.
pub mod errors;
pub mod db;
pub mod pool;
pub mod user;
pub mod holiday;
pub mod leave;
pub mod leave_day;
pub mod resource;
pub mod booking;

#[cfg(test)]
mod tests;
