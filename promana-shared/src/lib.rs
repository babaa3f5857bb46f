//! # Pro Mana Shared Library
//!
//! This crate contains the data model, storage backends, business operations
//! and authentication primitives shared by the Pro Mana API server and client.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their SQL operations
//! - `store`: The backend boundary (`Store` trait) with PostgreSQL and in-memory implementations
//! - `services`: Project, workboard, task, membership and account operations
//! - `auth`: Password hashing, JWT tokens and project authorization
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the Pro Mana shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
