/// API route handlers, one module per resource
///
/// Handlers stay thin: extract, call the matching service operation, and
/// pick the status code. Business rules live in `promana_shared::services`.

pub mod auth;
pub mod health;
pub mod members;
pub mod projects;
pub mod tasks;
pub mod workboards;
