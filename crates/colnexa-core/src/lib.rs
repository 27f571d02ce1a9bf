//! Core library for colnexa.
//!
//! Holds everything the dashboard front ends share:
//! - `auth`: the session manager and the auth-state machine built on it
//! - `api`: the REST client for the content-management backend
//! - `storage`: key-value persistence for the session (memory, file, keyring)
//! - `models`: users and services, with client-side filters
//! - `config`: file and environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod storage;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthBackend, AuthPhase, AuthState, Navigator, Routes, SessionManager};
pub use config::Config;
pub use models::{AuthResponse, AuthUser, Service, ServiceInput, UserStatusFilter};
pub use storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore};
