//! REST client module for the GreenDan account server.
//!
//! The server issues an opaque session token in exchange for an email and
//! password. Requests carry the currently held token as a bearer credential.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginTransport};
pub use error::ApiError;
