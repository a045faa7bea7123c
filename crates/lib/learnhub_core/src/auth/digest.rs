//! SHA-256 digests and HMAC-SHA256 message authentication.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// HMAC-SHA256 of `message` under `key`.
///
/// HMAC accepts keys of any length, so initialisation only fails when the
/// primitive itself is unusable; that is reported, never masked.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<[u8; 32], AuthError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AuthError::CryptoUnavailable(format!("hmac-sha256 init: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().into())
}

/// Compare two byte strings without short-circuiting on the first mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
