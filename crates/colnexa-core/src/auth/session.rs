use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header;
use tracing::{debug, info, warn};

use crate::models::AuthUser;
use crate::storage::KeyValueStore;

use super::backend::AuthBackend;
use super::token;

/// Storage key for the serialized user profile
pub const USER_KEY: &str = "user";

/// Owns the bearer token and the cached user profile.
///
/// Nothing is cached in memory: every accessor reads the store, so two
/// managers over the same store always agree.
pub struct SessionManager<S, B> {
    store: S,
    backend: B,
    token_key: String,
}

impl<S: KeyValueStore, B: AuthBackend> SessionManager<S, B> {
    pub fn new(store: S, backend: B, token_key: impl Into<String>) -> Self {
        Self {
            store,
            backend,
            token_key: token_key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn token_key(&self) -> &str {
        &self.token_key
    }

    /// Send credentials to the backend; on success persist token and
    /// profile and return the profile.
    ///
    /// A rejected login writes nothing. The error carries the backend's
    /// message, or a generic one when it sent none.
    pub async fn login(&mut self, identifier: &str, secret: &str) -> Result<AuthUser> {
        let response = self.backend.authenticate(identifier, secret).await?;

        self.store
            .set(&self.token_key, &response.jwt)
            .context("Failed to store session token")?;
        let profile = serde_json::to_string(&response.user)?;
        if let Err(e) = self.store.set(USER_KEY, &profile) {
            // No token without its profile
            if let Err(rollback) = self.store.remove(&self.token_key) {
                warn!(error = %rollback, "Failed to roll back session token");
            }
            return Err(e.context("Failed to store user profile"));
        }

        info!(user_id = response.user.id, "Login successful");
        Ok(response.user)
    }

    /// Whether the server still honors `token`.
    ///
    /// Fails open: if the server cannot be reached the token is assumed
    /// valid until the next check.
    pub async fn verify(&self, token: &str) -> bool {
        match self.backend.probe_token(token).await {
            Ok(honored) => honored,
            Err(e) => {
                warn!(error = %e, "Token verification unreachable, assuming valid");
                true
            }
        }
    }

    /// Whether the stored token is expired now. No token counts as expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.token() {
            Some(jwt) => token::is_expired_at(&jwt, now),
            None => true,
        }
    }

    /// Clear token and profile. Both removals are attempted even if the
    /// first one fails.
    pub fn logout(&mut self) -> Result<()> {
        let token_result = self
            .store
            .remove(&self.token_key)
            .context("Failed to remove session token");
        let user_result = self
            .store
            .remove(USER_KEY)
            .context("Failed to remove user profile");
        debug!("Session cleared");
        token_result.and(user_result)
    }

    /// Re-validate the stored session.
    ///
    /// Returns `false` (after logging out) if there is no token, it has
    /// expired, or the server rejects it.
    pub async fn refresh(&mut self) -> Result<bool> {
        let Some(jwt) = self.token() else {
            return Ok(false);
        };

        if self.is_expired() {
            info!("Session expired, logging out");
            self.logout()?;
            return Ok(false);
        }

        if !self.verify(&jwt).await {
            info!("Session rejected by server, logging out");
            self.logout()?;
            return Ok(false);
        }

        Ok(true)
    }

    /// True when a token is present. Expiry is not checked here.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The stored bearer token, if any
    pub fn token(&self) -> Option<String> {
        match self.store.get(&self.token_key) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read session token");
                None
            }
        }
    }

    /// The cached profile. A corrupt entry reads as no profile.
    pub fn user(&self) -> Option<AuthUser> {
        let raw = match self.store.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read user profile");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Failed to parse stored user profile");
                None
            }
        }
    }

    /// Headers for an authenticated API call
    pub fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.token() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }
}
