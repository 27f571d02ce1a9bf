use anyhow::Result;
use async_trait::async_trait;

use crate::models::AuthResponse;

/// The two backend calls the session lifecycle depends on.
///
/// `ApiClient` is the production implementation; tests substitute fakes.
#[async_trait]
pub trait AuthBackend {
    /// Exchange credentials for a token and profile.
    async fn authenticate(&self, identifier: &str, password: &str) -> Result<AuthResponse>;

    /// `Ok(true)` if the server honors the token, `Ok(false)` if it answered
    /// with a rejection, `Err` if it could not be reached.
    async fn probe_token(&self, token: &str) -> Result<bool>;
}
