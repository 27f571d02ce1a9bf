//! API client for the dashboard's content backend.
//!
//! This module provides the `ApiClient` struct for logging in, probing
//! token validity, and working with the services and users resources.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::AuthBackend;
use crate::models::{AuthResponse, AuthUser, Service, ServiceInput};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Backend used when no URL is configured
pub const DEFAULT_BASE_URL: &str = "https://sstrapiss.colnexa.com.co";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

/// The users listing wraps its rows in `data`
#[derive(Debug, Deserialize)]
struct UsersEnvelope {
    #[serde(default)]
    data: Option<Vec<AuthUser>>,
}

/// API client for the content backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", what))?;
        Self::check_response(response).await
    }

    fn authorized(&self, method: Method, url: &str) -> Result<RequestBuilder> {
        Ok(self.client.request(method, url).headers(self.auth_headers()?))
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T> {
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Authentication =====

    /// Log in with local credentials.
    ///
    /// A rejected login is reported as `ApiError::AuthenticationFailed`
    /// carrying the backend's message.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> Result<AuthResponse> {
        let url = self.url("/auth/local");

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest {
                identifier,
                password,
            })
            .send()
            .await
            .context("Failed to send authentication request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "Login rejected by backend");
            return Err(ApiError::login_rejected(&body).into());
        }

        response
            .json()
            .await
            .context("Failed to parse auth response")
    }

    /// Ask the backend whether it still honors `token`.
    ///
    /// `Ok(false)` means the server answered and rejected it; `Err` means
    /// the server could not be reached.
    pub async fn probe_token(&self, token: &str) -> Result<bool> {
        let url = self.url("/users/me");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to reach current-user endpoint")?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "Token rejected by backend");
        }
        Ok(status.is_success())
    }

    // ===== Services =====

    /// Fetch all services. This read is public and sends no token.
    pub async fn fetch_services(&self) -> Result<Vec<Service>> {
        let url = self.url("/services");
        let response = self.send(self.client.get(&url), "services").await?;
        Self::read_json(response, &url).await
    }

    pub async fn create_service(&self, input: &ServiceInput) -> Result<Service> {
        let url = self.url("/services");
        let request = self.authorized(Method::POST, &url)?.json(input);
        let response = self.send(request, "create service").await?;
        Self::read_json(response, &url).await
    }

    pub async fn update_service(&self, id: i64, input: &ServiceInput) -> Result<Service> {
        let url = self.url(&format!("/services/{}", id));
        let request = self.authorized(Method::PUT, &url)?.json(input);
        let response = self.send(request, "update service").await?;
        Self::read_json(response, &url).await
    }

    pub async fn delete_service(&self, id: i64) -> Result<()> {
        let url = self.url(&format!("/services/{}", id));
        let request = self.authorized(Method::DELETE, &url)?;
        self.send(request, "delete service").await?;
        Ok(())
    }

    // ===== Users =====

    /// Fetch the users listing. Rows missing from the envelope read as empty.
    pub async fn fetch_users(&self) -> Result<Vec<AuthUser>> {
        let url = self.url("/api/users");
        let request = self.authorized(Method::GET, &url)?;
        let response = self.send(request, "users").await?;
        let envelope: UsersEnvelope = Self::read_json(response, &url).await?;
        let users = envelope.data.unwrap_or_default();
        if users.is_empty() {
            warn!("Users listing returned no rows");
        }
        Ok(users)
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn authenticate(&self, identifier: &str, password: &str) -> Result<AuthResponse> {
        ApiClient::authenticate(self, identifier, password).await
    }

    async fn probe_token(&self, token: &str) -> Result<bool> {
        ApiClient::probe_token(self, token).await
    }
}
