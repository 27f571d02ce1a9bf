//! Authentication module: the session lifecycle.
//!
//! This module provides:
//! - `SessionManager`: owns the bearer token and cached profile in a
//!   `KeyValueStore`; login, logout, expiry, verify and refresh
//! - `AuthState`: observable auth state over a session manager, with the
//!   `Unknown -> Checking -> {Authenticated, Unauthenticated}` phase machine
//!   and navigation on auth changes
//! - `token`: decoding of the expiry claim embedded in the JWT
//!
//! Both are constructed explicitly and passed in; there is no global session.

pub mod backend;
pub mod messages;
pub mod session;
pub mod state;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::AuthBackend;
pub use session::{SessionManager, USER_KEY};
pub use state::{AuthPhase, AuthState, Navigator, Routes};
