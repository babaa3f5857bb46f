//! # Pro Mana Client
//!
//! Typed HTTP client for the Pro Mana API, with the session state and auth
//! gate a front end needs.
//!
//! ## Modules
//!
//! - `client`: Requests for every API operation
//! - `session`: Observable session state and the auth gate
//! - `routes`: Application routes and post-action navigation
//! - `inflight`: Duplicate-submit guard
//! - `error`: Client error type

pub mod client;
pub mod error;
pub mod inflight;
pub mod routes;
pub mod session;

pub use client::ProManaClient;
pub use error::{ClientError, ClientResult};
pub use routes::{Navigation, Route};
pub use session::{AuthGate, SessionContext, SessionState, SessionUser};
