//! Application state for the colnexa CLI.
//!
//! `App` owns the configuration and the auth state built over the session
//! storage and API client, and implements each subcommand on top of them.

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use colnexa_core::auth::token;
use colnexa_core::models::{filter_services, filter_users};
use colnexa_core::utils::{format_optional_date, truncate_string};
use colnexa_core::{
    ApiClient, AuthPhase, AuthState, Config, FileStore, KeyValueStore, KeyringStore, Navigator,
    ServiceInput, SessionManager, UserStatusFilter,
};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for the login identifier.
const MAX_IDENTIFIER_LENGTH: usize = 254;

/// Maximum length for the password.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Column width for titles and usernames in listings
const NAME_COLUMN_WIDTH: usize = 28;

/// Column width for descriptions and emails in listings
const DETAIL_COLUMN_WIDTH: usize = 40;

const ENV_IDENTIFIER: &str = "COLNEXA_IDENTIFIER";
const ENV_PASSWORD: &str = "COLNEXA_PASSWORD";

// ============================================================================
// Navigation
// ============================================================================

/// Navigator for a terminal: there is no page to change, so routes are
/// recorded and logged.
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    current: Option<String>,
}

impl TerminalNavigator {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

impl Navigator for TerminalNavigator {
    fn push(&mut self, route: &str) {
        info!(route, "Navigate");
        self.current = Some(route.to_string());
    }

    fn replace(&mut self, route: &str) {
        info!(route, "Redirect");
        self.current = Some(route.to_string());
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub type Store = Box<dyn KeyValueStore>;
pub type Auth = AuthState<Store, ApiClient, TerminalNavigator>;

pub struct App {
    pub config: Config,
    pub auth: Auth,
}

impl App {
    /// Build the app over file storage, or the OS keychain when
    /// `use_keyring` is set.
    pub fn new(config: Config, use_keyring: bool) -> Result<Self> {
        let store: Store = if use_keyring {
            debug!("Using keychain session storage");
            Box::new(KeyringStore::new())
        } else {
            let path = config.storage_path()?;
            debug!(path = %path.display(), "Using file session storage");
            Box::new(FileStore::open(path)?)
        };

        let api = ApiClient::new(config.api_url.clone())?;
        let session = SessionManager::new(store, api, config.jwt_storage_key.clone());
        let auth = AuthState::new(session, TerminalNavigator::default(), config.routes());

        Ok(Self { config, auth })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub async fn login(&mut self, identifier: Option<String>) -> Result<()> {
        self.auth.check().await;
        if self.auth.redirect_if_authenticated() {
            let name = self
                .auth
                .user()
                .map(|u| u.display_name().to_string())
                .unwrap_or_default();
            println!("Already signed in as {}. Run `colnexa logout` first.", name);
            return Ok(());
        }

        let identifier = match identifier.or_else(|| std::env::var(ENV_IDENTIFIER).ok()) {
            Some(identifier) => identifier,
            None => self.prompt_identifier()?,
        };
        let password = match std::env::var(ENV_PASSWORD) {
            Ok(password) => password,
            Err(_) => rpassword::prompt_password("Password: ")?,
        };

        validate_credentials(&identifier, &password)?;

        println!("Authenticating...");
        match self.auth.login(&identifier, &password).await {
            Ok(user) => {
                self.config.last_identifier = Some(identifier);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                println!("Signed in as {} <{}>", user.display_name(), user.email);
                Ok(())
            }
            Err(e) => {
                let message = self.auth.error().unwrap_or("Login failed").to_string();
                Err(e.context(message))
            }
        }
    }

    fn prompt_identifier(&self) -> Result<String> {
        match self.config.last_identifier {
            Some(ref last) => print!("Email or username [{}]: ", last),
            None => print!("Email or username: "),
        }
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        Ok(match (input.is_empty(), &self.config.last_identifier) {
            (true, Some(last)) => last.clone(),
            _ => input.to_string(),
        })
    }

    pub async fn logout(&mut self) {
        // Settle the phase first so the logout is an ordinary transition
        self.auth.check().await;
        self.auth.logout();
        println!("Signed out.");
    }

    pub async fn status(&mut self) {
        self.auth.check().await;

        println!("Backend:  {}", self.config.api_url);
        println!("Session:  {}", self.auth.phase().label());
        if let Some(error) = self.auth.error() {
            println!("Error:    {}", error);
        }
        if let Some(user) = self.auth.user() {
            println!("User:     {} <{}>", user.display_name(), user.email);
            if let Some(ref role) = user.role {
                println!("Role:     {}", role);
            }
        }
        if self.auth.phase() == AuthPhase::Authenticated {
            if let Some(expiry) = self
                .auth
                .session()
                .token()
                .and_then(|t| token::expires_at(&t).ok())
            {
                println!("Expires:  {}", expiry.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }
    }

    /// Run the mount check and fail unless signed in. Returns a client
    /// carrying the session token.
    async fn require_session(&mut self) -> Result<ApiClient> {
        self.auth.check().await;
        if self.auth.protect() {
            let reason = self
                .auth
                .error()
                .unwrap_or("No active session.")
                .to_string();
            bail!("{} Sign in with `colnexa login`.", reason);
        }
        let token = self
            .auth
            .session()
            .token()
            .context("Session has no token")?;
        Ok(self.auth.session().backend().with_token(token))
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn list_users(&mut self, search: &str, status: UserStatusFilter) -> Result<()> {
        let api = self.require_session().await?;
        let users = api.fetch_users().await.context("Failed to load users")?;
        let shown = filter_users(&users, search, status);

        println!(
            "{:>5}  {:<name$}  {:<detail$}  {:<8}  {}",
            "ID",
            "USERNAME",
            "EMAIL",
            "STATUS",
            "CREATED",
            name = NAME_COLUMN_WIDTH,
            detail = DETAIL_COLUMN_WIDTH
        );
        for user in &shown {
            println!(
                "{:>5}  {:<name$}  {:<detail$}  {:<8}  {}",
                user.id,
                truncate_string(&user.username, NAME_COLUMN_WIDTH),
                truncate_string(&user.email, DETAIL_COLUMN_WIDTH),
                user.status_label(),
                format_optional_date(user.created_at.as_ref(), "-"),
                name = NAME_COLUMN_WIDTH,
                detail = DETAIL_COLUMN_WIDTH
            );
        }
        println!("{} of {} users", shown.len(), users.len());
        Ok(())
    }

    // =========================================================================
    // Services
    // =========================================================================

    pub async fn list_services(&mut self, search: &str) -> Result<()> {
        let api = self.require_session().await?;
        let services = api.fetch_services().await.context("Failed to load services")?;
        let shown = filter_services(&services, search);

        println!(
            "{:>5}  {:<name$}  {}",
            "ID",
            "TITLE",
            "DESCRIPTION",
            name = NAME_COLUMN_WIDTH
        );
        for service in &shown {
            println!(
                "{:>5}  {:<name$}  {}",
                service.id,
                truncate_string(&service.title, NAME_COLUMN_WIDTH),
                truncate_string(&service.description, DETAIL_COLUMN_WIDTH),
                name = NAME_COLUMN_WIDTH
            );
        }
        println!("{} of {} services", shown.len(), services.len());
        Ok(())
    }

    pub async fn create_service(&mut self, title: String, description: String) -> Result<()> {
        let input = validate_service_input(title, description)?;
        let api = self.require_session().await?;
        let service = api
            .create_service(&input)
            .await
            .context("Failed to create service")?;
        println!("Created service {}: {}", service.id, service.title);
        Ok(())
    }

    pub async fn update_service(&mut self, id: i64, title: String, description: String) -> Result<()> {
        let input = validate_service_input(title, description)?;
        let api = self.require_session().await?;
        let service = api
            .update_service(id, &input)
            .await
            .context("Failed to update service")?;
        println!("Updated service {}: {}", service.id, service.title);
        Ok(())
    }

    pub async fn delete_service(&mut self, id: i64) -> Result<()> {
        let api = self.require_session().await?;
        api.delete_service(id)
            .await
            .context("Failed to delete service")?;
        println!("Deleted service {}", id);
        Ok(())
    }
}

// ============================================================================
// Input validation helpers
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Reject empty, oversized, or control-character credentials before they
/// reach the backend.
pub fn validate_credentials(identifier: &str, password: &str) -> Result<()> {
    if identifier.is_empty() || password.is_empty() {
        bail!("Username and password required");
    }
    if identifier.chars().count() > MAX_IDENTIFIER_LENGTH
        || !identifier.chars().all(is_valid_input_char)
    {
        bail!("Invalid username");
    }
    if password.chars().count() > MAX_PASSWORD_LENGTH || !password.chars().all(is_valid_input_char) {
        bail!("Password too long or contains control characters");
    }
    Ok(())
}

/// Both fields are required and trimmed
pub fn validate_service_input(title: String, description: String) -> Result<ServiceInput> {
    let title = title.trim();
    let description = description.trim();
    if title.is_empty() || description.is_empty() {
        bail!("Title and description are required");
    }
    Ok(ServiceInput::new(title, description))
}

// ============================================================================
// Tests
// ============================================================================
