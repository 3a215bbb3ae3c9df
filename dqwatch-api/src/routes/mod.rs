/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (login, signup, google, refresh, me, logout)
/// - `users`: User management (admin)
/// - `settings`: System settings (admin)
/// - `dashboard`: Dashboard collections
/// - `export`: CSV quality report

pub mod auth;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod settings;
pub mod users;
