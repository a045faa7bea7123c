//! Compact HS256 token issuance and verification.
//!
//! Wire format: `b64url(header).b64url(claims).b64url(HMAC-SHA256(secret, header "." claims))`
//! with header `{"alg":"HS256","typ":"JWT"}` and claims `{"userId","email","exp"}`.
//! Tokens are stateless; nothing is stored server-side.

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use super::AuthError;
use super::codec::{decode_base64_url, encode_base64_url};
use super::digest::{constant_time_eq, hmac_sha256};
use crate::models::auth::{TokenClaims, TokenSubject};

/// Default token lifetime: 7 days.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Serialize)]
struct TokenHeader {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: TokenHeader = TokenHeader {
    alg: "HS256",
    typ: "JWT",
};

/// Issue a signed token for `subject`, expiring `ttl_secs` from now.
pub fn issue_token(
    subject: &TokenSubject,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, AuthError> {
    issue_token_at(subject, secret, ttl_secs, Utc::now().timestamp())
}

/// Issue a signed token with an explicit issue time (unix seconds).
pub fn issue_token_at(
    subject: &TokenSubject,
    secret: &str,
    ttl_secs: i64,
    now: i64,
) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::ConfigurationError(
            "JWT secret is not configured".into(),
        ));
    }
    let claims = TokenClaims {
        user_id: subject.subject_id,
        email: subject.email.clone(),
        exp: Some(now.saturating_add(ttl_secs)),
    };
    let header = serde_json::to_vec(&HEADER)
        .map_err(|e| AuthError::Internal(format!("jwt header encode: {e}")))?;
    let payload = serde_json::to_vec(&claims)
        .map_err(|e| AuthError::Internal(format!("jwt claims encode: {e}")))?;

    let signing_input = format!(
        "{}.{}",
        encode_base64_url(&header),
        encode_base64_url(&payload)
    );
    let signature = sign(&signing_input, secret)?;
    Ok(format!("{signing_input}.{signature}"))
}

/// Verify a token, returning its claims if the signature matches and it has not expired.
///
/// Every failure (wrong segment count, bad signature, undecodable claims,
/// expiry, empty secret) collapses to `None`.
pub fn verify_token(token: &str, secret: &str) -> Option<TokenClaims> {
    verify_token_at(token, secret, Utc::now().timestamp())
}

/// Verify a token against an explicit clock (unix seconds).
pub fn verify_token_at(token: &str, secret: &str, now: i64) -> Option<TokenClaims> {
    match decode_verified(token, secret, now) {
        Ok(claims) => Some(claims),
        Err(e) => {
            debug!(error = %e, "token rejected");
            None
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn decode_verified(token: &str, secret: &str, now: i64) -> Result<TokenClaims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::ConfigurationError(
            "JWT secret is not configured".into(),
        ));
    }

    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::DecodeError(
            "token must have exactly three segments".into(),
        ));
    };

    let signing_input = &token[..header.len() + 1 + payload.len()];
    let expected = sign(signing_input, secret)?;
    if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
        return Err(AuthError::TokenError("signature mismatch".into()));
    }

    let claims: TokenClaims = serde_json::from_slice(&decode_base64_url(payload)?)
        .map_err(|e| AuthError::DecodeError(format!("claims: {e}")))?;

    if claims.exp.is_some_and(|exp| exp < now) {
        return Err(AuthError::TokenError("token expired".into()));
    }
    Ok(claims)
}

fn sign(signing_input: &str, secret: &str) -> Result<String, AuthError> {
    let mac = hmac_sha256(secret.as_bytes(), signing_input.as_bytes())?;
    Ok(encode_base64_url(mac))
}
