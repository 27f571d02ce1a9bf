//! User-facing messages for auth failures.

pub const INVALID_CREDENTIALS: &str = "Incorrect username or password.";
pub const ACCOUNT_BLOCKED: &str = "Your account is blocked. Contact the administrator.";
pub const LOGIN_FAILED: &str = "Something went wrong while signing in. Please try again.";
pub const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";
pub const SESSION_CHECK_FAILED: &str = "Error verifying the session";

/// Pick the message to show for a failed login from the error text.
/// Matching is by case-insensitive substring only.
pub fn login_error_message(error: &str) -> &'static str {
    let lower = error.to_lowercase();
    if lower.contains("invalid") {
        INVALID_CREDENTIALS
    } else if lower.contains("blocked") {
        ACCOUNT_BLOCKED
    } else {
        LOGIN_FAILED
    }
}
