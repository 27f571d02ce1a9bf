use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::models::AuthUser;
use crate::storage::KeyValueStore;

use super::backend::AuthBackend;
use super::messages::{login_error_message, SESSION_CHECK_FAILED, SESSION_EXPIRED};
use super::session::SessionManager;

/// Default route of the login screen
pub const DEFAULT_LOGIN_ROUTE: &str = "/";

/// Default route of the dashboard shell
pub const DEFAULT_DASHBOARD_ROUTE: &str = "/dashboard";

/// Where auth changes send the user.
pub trait Navigator {
    /// Navigate, keeping the current location in history.
    fn push(&mut self, route: &str);

    /// Navigate, replacing the current location.
    fn replace(&mut self, route: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    pub login: String,
    pub dashboard: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            login: DEFAULT_LOGIN_ROUTE.to_string(),
            dashboard: DEFAULT_DASHBOARD_ROUTE.to_string(),
        }
    }
}

/// Phase of the per-session auth state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// Nothing checked yet
    Unknown,
    /// A check or login is in flight
    Checking,
    Authenticated,
    Unauthenticated,
}

impl AuthPhase {
    /// Legal moves. Staying in the same phase is always allowed.
    ///
    /// `Unauthenticated -> Checking` is the login path.
    pub fn can_transition_to(self, next: AuthPhase) -> bool {
        use AuthPhase::*;
        self == next
            || matches!(
                (self, next),
                (Unknown, Checking)
                    | (Checking, Authenticated)
                    | (Checking, Unauthenticated)
                    | (Authenticated, Unauthenticated)
                    | (Unauthenticated, Checking)
            )
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuthPhase::Unknown => "unknown",
            AuthPhase::Checking => "checking",
            AuthPhase::Authenticated => "authenticated",
            AuthPhase::Unauthenticated => "unauthenticated",
        }
    }
}

/// Observable auth state for a front end.
///
/// Exposes `user`, `is_authenticated`, `is_loading` and `error`, and the
/// `login`, `logout` and `refresh` actions. Navigation on auth changes goes
/// through the injected `Navigator`.
pub struct AuthState<S, B, N> {
    session: SessionManager<S, B>,
    navigator: N,
    routes: Routes,
    phase: AuthPhase,
    user: Option<AuthUser>,
    is_loading: bool,
    error: Option<String>,
}

impl<S: KeyValueStore, B: AuthBackend, N: Navigator> AuthState<S, B, N> {
    /// Wrap a session. Starts in `Unknown`, loading, until `check` runs.
    pub fn new(session: SessionManager<S, B>, navigator: N, routes: Routes) -> Self {
        Self {
            session,
            navigator,
            routes,
            phase: AuthPhase::Unknown,
            user: None,
            is_loading: true,
            error: None,
        }
    }

    // ===== Observable fields =====

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == AuthPhase::Authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    pub fn session(&self) -> &SessionManager<S, B> {
        &self.session
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Move to `next` if the machine allows it; illegal moves are logged
    /// and ignored.
    fn transition(&mut self, next: AuthPhase) -> bool {
        if self.phase.can_transition_to(next) {
            if self.phase != next {
                debug!(from = self.phase.label(), to = next.label(), "Auth phase change");
            }
            self.phase = next;
            true
        } else {
            warn!(from = self.phase.label(), to = next.label(), "Rejected auth phase change");
            false
        }
    }

    fn settle_authenticated(&mut self, user: Option<AuthUser>) {
        self.user = user;
        self.transition(AuthPhase::Authenticated);
    }

    fn settle_unauthenticated(&mut self) {
        self.user = None;
        self.transition(AuthPhase::Unauthenticated);
    }

    /// Mount-time check: expiry first, then server verification, before
    /// declaring the session valid. With no stored token this settles to
    /// `Unauthenticated` without touching the network.
    pub async fn check(&mut self) {
        if !self.transition(AuthPhase::Checking) {
            return;
        }
        self.is_loading = true;
        self.error = None;

        match self.check_stored_session().await {
            Ok(true) => {
                let user = self.session.user();
                self.settle_authenticated(user);
            }
            Ok(false) => self.settle_unauthenticated(),
            Err(e) => {
                error!(error = %e, "Session check failed");
                self.error = Some(SESSION_CHECK_FAILED.to_string());
                if let Err(e) = self.session.logout() {
                    warn!(error = %e, "Failed to clear session");
                }
                self.settle_unauthenticated();
            }
        }

        self.is_loading = false;
    }

    async fn check_stored_session(&mut self) -> Result<bool> {
        let Some(token) = self.session.token() else {
            debug!("No stored token");
            return Ok(false);
        };

        if self.session.is_expired() {
            info!("Stored session expired");
            self.session.logout()?;
            return Ok(false);
        }

        if !self.session.verify(&token).await {
            info!("Stored session rejected by server");
            self.session.logout()?;
            return Ok(false);
        }

        Ok(true)
    }

    /// Log in and go to the dashboard.
    ///
    /// On failure `error` holds the user-facing message and the underlying
    /// error is returned to the caller.
    pub async fn login(&mut self, identifier: &str, secret: &str) -> Result<AuthUser> {
        self.is_loading = true;
        self.error = None;
        let from_signed_out = self.phase != AuthPhase::Authenticated;
        if from_signed_out {
            self.transition(AuthPhase::Checking);
        }

        let result = self.session.login(identifier, secret).await;
        self.is_loading = false;

        match result {
            Ok(user) => {
                self.settle_authenticated(Some(user.clone()));
                let dashboard = self.routes.dashboard.clone();
                self.navigator.push(&dashboard);
                Ok(user)
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "Login failed");
                // Classify the outermost message only
                self.error = Some(login_error_message(&e.to_string()).to_string());
                if from_signed_out {
                    self.settle_unauthenticated();
                }
                Err(e)
            }
        }
    }

    /// Clear the session and go to the login screen.
    pub fn logout(&mut self) {
        if let Err(e) = self.session.logout() {
            warn!(error = %e, "Failed to clear session");
        }
        self.error = None;
        self.settle_unauthenticated();
        let login = self.routes.login.clone();
        self.navigator.push(&login);
        info!("Logged out");
    }

    /// Re-validate the session; if it is no longer valid, clear state,
    /// set the expiry message and go to the login screen.
    pub async fn refresh(&mut self) {
        self.is_loading = true;
        self.error = None;
        if self.phase != AuthPhase::Authenticated {
            self.transition(AuthPhase::Checking);
        }

        let valid = match self.session.refresh().await {
            Ok(valid) => valid,
            Err(e) => {
                error!(error = %e, "Session refresh failed");
                if let Err(e) = self.session.logout() {
                    warn!(error = %e, "Failed to clear session");
                }
                false
            }
        };

        if valid {
            let user = self.session.user();
            self.settle_authenticated(user);
        } else {
            self.error = Some(SESSION_EXPIRED.to_string());
            self.settle_unauthenticated();
            let login = self.routes.login.clone();
            self.navigator.push(&login);
        }

        self.is_loading = false;
    }

    /// Guard for pages behind the login: once settled and unauthenticated,
    /// replace the location with the login route. Returns whether it
    /// redirected.
    pub fn protect(&mut self) -> bool {
        if !self.is_loading && !self.is_authenticated() {
            let login = self.routes.login.clone();
            self.navigator.replace(&login);
            true
        } else {
            false
        }
    }

    /// Guard for the login page: once settled and authenticated, replace
    /// the location with the dashboard route so no second session starts.
    pub fn redirect_if_authenticated(&mut self) -> bool {
        if !self.is_loading && self.is_authenticated() {
            let dashboard = self.routes.dashboard.clone();
            self.navigator.replace(&dashboard);
            true
        } else {
            false
        }
    }
}
