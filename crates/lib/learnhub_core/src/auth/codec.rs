//! Base64url codec for token segments.
//!
//! URL-safe alphabet, no padding on output. Decoding accepts input with or
//! without `=` padding and rejects anything that is not a valid encoding.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use super::AuthError;

const BASE64_URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode raw bytes (UTF-8 text or a binary digest) as unpadded base64url.
pub fn encode_base64_url(bytes: impl AsRef<[u8]>) -> String {
    BASE64_URL.encode(bytes)
}

/// Decode base64url into the original bytes.
pub fn decode_base64_url(input: &str) -> Result<Vec<u8>, AuthError> {
    BASE64_URL
        .decode(input)
        .map_err(|e| AuthError::DecodeError(format!("base64url: {e}")))
}

/// Decode base64url and interpret the bytes as UTF-8 text.
pub fn decode_base64_url_str(input: &str) -> Result<String, AuthError> {
    let bytes = decode_base64_url(input)?;
    String::from_utf8(bytes).map_err(|e| AuthError::DecodeError(format!("utf-8: {e}")))
}
