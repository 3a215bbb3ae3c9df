//! # dqwatch Shared Library
//!
//! Types, persistence and authentication logic used by the dqwatch API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: database models (identities, refresh tokens, dashboard collections)
//! - `auth`: password hashing, access/refresh tokens, federated verification, role gate
//! - `db`: connection pool, migrations and seed data

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the dqwatch shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
