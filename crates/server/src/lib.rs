//! HTTP surface: router, bearer authentication, handlers and startup.
pub mod auth;
pub mod errors;
pub mod openapi;
pub mod routes;
pub mod startup;
pub mod state;

pub use startup::run;
