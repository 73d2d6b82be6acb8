//! Identity bootstrap: bearer token to principal.

pub mod jwks;
pub mod service;
pub mod token;

pub use jwks::KeySet;
pub use service::{IdentityService, Principal};
