//! Password hashing via bcrypt.
//!
//! New hashes are salted bcrypt. Records written by the previous backend
//! hold an unsalted lowercase-hex SHA-256 digest; those still verify so
//! existing users can sign in.
//!
//! bcrypt only reads the first 72 bytes of its input. Longer passwords are
//! rejected when hashing, and never verify against a bcrypt hash.

use tracing::debug;

use super::AuthError;
use super::digest::{constant_time_eq, sha256};

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Longest password bcrypt consumes in full.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Length of a hex-encoded SHA-256 digest.
const LEGACY_HASH_LEN: usize = 64;

/// Hash a password with bcrypt (cost 10).
///
/// Fails with [`AuthError::ValidationError`] for passwords over
/// [`MAX_PASSWORD_BYTES`].
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::ValidationError(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    bcrypt::non_truncating_hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::CryptoUnavailable(format!("bcrypt hash: {e}")))
}

/// Verify a password against a stored hash (bcrypt or legacy SHA-256 hex).
///
/// A stored value in neither format verifies to `false`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    if is_legacy_hash(hash) {
        let candidate = legacy_sha256_hex(password);
        return Ok(constant_time_eq(candidate.as_bytes(), hash.as_bytes()));
    }
    match bcrypt::non_truncating_verify(password, hash) {
        Ok(valid) => Ok(valid),
        Err(e) => {
            debug!(error = %e, "stored password hash not recognised");
            Ok(false)
        }
    }
}

/// Unsalted lowercase-hex SHA-256 of the UTF-8 password.
pub fn legacy_sha256_hex(password: &str) -> String {
    hex::encode(sha256(password.as_bytes()))
}

fn is_legacy_hash(hash: &str) -> bool {
    hash.len() == LEGACY_HASH_LEN && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
