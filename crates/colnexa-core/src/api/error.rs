use serde_json::Value;
use thiserror::Error;

/// Message used when a rejected login carries no usable backend message
pub const GENERIC_AUTH_FAILURE: &str = "Authentication error";

#[derive(Error, Debug)]
pub enum ApiError {
    /// Login rejected; carries the backend's own message.
    #[error("{0}")]
    AuthenticationFailed(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Build the error for a rejected login from the response body.
    pub fn login_rejected(body: &str) -> Self {
        let message = backend_message(body).unwrap_or_else(|| GENERIC_AUTH_FAILURE.to_string());
        ApiError::AuthenticationFailed(message)
    }
}

/// Pull the human-readable message out of a backend error body.
///
/// Understands the `{"error": {"message": ...}}` shape and the older
/// `{"message": [{"messages": [{"message": ...}]}]}` shape. Returns `None`
/// for anything else, including non-JSON bodies.
pub fn backend_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    let message = value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| {
            value
                .pointer("/message/0/messages/0/message")
                .and_then(Value::as_str)
        })
        .or_else(|| value.get("message").and_then(Value::as_str))?;

    let message = message.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
