//! Fakes shared by the auth tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};

use super::backend::AuthBackend;
use super::state::Navigator;
use crate::api::ApiError;
use crate::models::{AuthResponse, AuthUser};
use crate::storage::{KeyValueStore, MemoryStore};

/// Build an unsigned JWT-shaped token around a claims JSON object
pub fn token_with_claims(claims: &str) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims)
    )
}

pub fn valid_token() -> String {
    let exp = (Utc::now() + Duration::hours(1)).timestamp();
    token_with_claims(&format!(r#"{{"id":1,"exp":{}}}"#, exp))
}

pub fn expired_token() -> String {
    token_with_claims(r#"{"id":1,"exp":1}"#)
}

pub fn sample_user() -> AuthUser {
    AuthUser {
        id: 1,
        username: "admin".to_string(),
        email: "admin@colnexa.com.co".to_string(),
        role: None,
        blocked: false,
        created_at: None,
    }
}

/// How the fake answers a token probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Honored,
    Rejected,
    Unreachable,
}

/// How the fake answers a login
#[derive(Debug, Clone)]
enum Login {
    Accept(AuthResponse),
    Reject(String),
    Unreachable,
}

pub struct FakeBackend {
    login: Login,
    probe: Probe,
    login_calls: AtomicUsize,
    probe_calls: AtomicUsize,
}

impl FakeBackend {
    /// Accepts any credentials, issuing `token`
    pub fn accepting(token: String) -> Self {
        Self {
            login: Login::Accept(AuthResponse {
                jwt: token,
                user: sample_user(),
            }),
            probe: Probe::Honored,
            login_calls: AtomicUsize::new(0),
            probe_calls: AtomicUsize::new(0),
        }
    }

    /// Rejects every login with the given backend message
    pub fn rejecting(message: &str) -> Self {
        Self {
            login: Login::Reject(message.to_string()),
            ..Self::accepting(valid_token())
        }
    }

    /// Login requests fail in transport, before the backend answers
    pub fn unreachable() -> Self {
        Self {
            login: Login::Unreachable,
            ..Self::accepting(valid_token())
        }
    }

    pub fn with_probe(mut self, probe: Probe) -> Self {
        self.probe = probe;
        self
    }

    pub fn probes(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn logins(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn authenticate(&self, _identifier: &str, _password: &str) -> Result<AuthResponse> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        match &self.login {
            Login::Accept(response) => Ok(response.clone()),
            Login::Reject(message) => Err(ApiError::AuthenticationFailed(message.clone()).into()),
            Login::Unreachable => Err(anyhow!("invalid peer certificate: UnknownIssuer")
                .context("Failed to send authentication request")),
        }
    }

    async fn probe_token(&self, _token: &str) -> Result<bool> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        match self.probe {
            Probe::Honored => Ok(true),
            Probe::Rejected => Ok(false),
            Probe::Unreachable => Err(anyhow!("connection refused")),
        }
    }
}

/// Memory store whose writes or removals fail for chosen keys
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing_sets: Vec<String>,
    failing_removes: Vec<String>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn failing_set(mut self, key: &str) -> Self {
        self.failing_sets.push(key.to_string());
        self
    }

    pub fn failing_remove(mut self, key: &str) -> Self {
        self.failing_removes.push(key.to_string());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        matches!(self.inner.get(key), Ok(Some(_)))
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.failing_sets.iter().any(|k| k == key) {
            return Err(anyhow!("storage quota exceeded"));
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.failing_removes.iter().any(|k| k == key) {
            return Err(anyhow!("storage is read-only"));
        }
        self.inner.remove(key)
    }
}

/// Records every navigation as ("push" | "replace", route)
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub visits: Vec<(&'static str, String)>,
}

impl RecordingNavigator {
    pub fn last(&self) -> Option<(&'static str, &str)> {
        self.visits.last().map(|(kind, route)| (*kind, route.as_str()))
    }
}

impl Navigator for RecordingNavigator {
    fn push(&mut self, route: &str) {
        self.visits.push(("push", route.to_string()));
    }

    fn replace(&mut self, route: &str) {
        self.visits.push(("replace", route.to_string()));
    }
}
