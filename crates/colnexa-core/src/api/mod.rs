//! REST API client module for the dashboard backend.
//!
//! This module provides the `ApiClient` for the Strapi-style content
//! backend: local-credential login, the current-user probe used to verify
//! tokens, and the services and users resources.
//!
//! Authenticated requests carry the JWT issued by `/auth/local` as a
//! bearer token.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::{ApiError, GENERIC_AUTH_FAILURE};
