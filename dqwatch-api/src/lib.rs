//! # dqwatch API Server Library
//!
//! HTTP API for the data-quality dashboard: authentication, role-gated
//! dashboard collections, user management and the CSV report export.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON extractor with API error rejections
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
