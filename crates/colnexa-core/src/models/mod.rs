//! Data models for the dashboard backend.
//!
//! - `AuthUser`: the cached profile and the rows of the users listing
//! - `AuthResponse`: what a successful login returns
//! - `Service`, `ServiceInput`: the services resource
//!
//! Filtering is done client-side over already-fetched lists.

pub mod service;
pub mod user;

pub use service::{filter_services, Service, ServiceInput};
pub use user::{filter_users, AuthResponse, AuthUser, UserStatusFilter};
