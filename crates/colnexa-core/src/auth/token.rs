//! Expiry decoding for bearer tokens.
//!
//! Tokens are JWTs; only the payload segment is read and the signature is
//! never checked here, the server is the authority on validity.

use anyhow::{anyhow, Context, Result};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// URL-safe alphabet, padding optional
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The payload claims this crate cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Expiry, epoch seconds
    pub exp: Option<i64>,
}

/// Decode the claims from the token's second dot-separated segment.
pub fn decode_claims(token: &str) -> Result<TokenClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| anyhow!("Token has no payload segment"))?;

    let bytes = PAYLOAD_ENGINE
        .decode(payload)
        .context("Token payload is not valid base64url")?;

    serde_json::from_slice(&bytes).context("Token payload is not a JSON claims object")
}

/// The instant the token stops being valid.
pub fn expires_at(token: &str) -> Result<DateTime<Utc>> {
    let exp = decode_claims(token)?
        .exp
        .ok_or_else(|| anyhow!("Token has no exp claim"))?;
    Utc.timestamp_opt(exp, 0)
        .single()
        .ok_or_else(|| anyhow!("Token exp claim out of range: {}", exp))
}

/// Whether the token is expired at `now`. Malformed tokens, and tokens
/// without an `exp` claim, count as expired.
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Ok(TokenClaims { exp: Some(exp), .. }) => {
            now.timestamp_millis() > exp.saturating_mul(1000)
        }
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to decode token");
            true
        }
    }
}

pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::token_with_claims;
    use base64::engine::general_purpose::URL_SAFE;
    use base64::Engine as _;
    use chrono::Duration;

    #[test]
    fn test_decode_claims() {
        let token = token_with_claims(r#"{"id":12,"iat":1700000000,"exp":1700003600}"#);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.exp, Some(1_700_003_600));
        assert_eq!(expires_at(&token).unwrap().timestamp(), 1_700_003_600);
    }

    #[test]
    fn test_padded_payload_accepted() {
        let padded = format!("h.{}.s", URL_SAFE.encode(r#"{"exp":10}"#));
        assert!(padded.contains('='));
        assert_eq!(decode_claims(&padded).unwrap().exp, Some(10));
    }

    #[test]
    fn test_exp_one_is_always_expired() {
        let token = token_with_claims(r#"{"exp":1}"#);
        assert!(is_expired(&token));
        assert!(is_expired_at(&token, Utc.timestamp_opt(2, 0).unwrap()));
    }

    #[test]
    fn test_expiry_boundary() {
        let token = token_with_claims(r#"{"exp":1000}"#);
        let exp = Utc.timestamp_opt(1000, 0).unwrap();
        assert!(!is_expired_at(&token, exp - Duration::seconds(1)));
        // Expired only strictly after the exp instant
        assert!(!is_expired_at(&token, exp));
        assert!(is_expired_at(&token, exp + Duration::milliseconds(1)));
    }

    #[test]
    fn test_future_token_not_expired() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let token = token_with_claims(&format!(r#"{{"exp":{}}}"#, exp));
        assert!(!is_expired(&token));
    }

    #[test]
    fn test_malformed_tokens_are_expired() {
        assert!(is_expired(""));
        assert!(is_expired("not-a-jwt"));
        assert!(is_expired("a..c"));
        assert!(is_expired("a.!!!.c"));
        // Valid base64 but not JSON
        assert!(is_expired(&format!("a.{}.c", PAYLOAD_ENGINE.encode("hello"))));
        // JSON without exp
        assert!(is_expired(&token_with_claims(r#"{"id":1}"#)));
        // exp of the wrong type
        assert!(is_expired(&token_with_claims(r#"{"exp":"soon"}"#)));
        assert!(expires_at("garbage").is_err());
    }
}
