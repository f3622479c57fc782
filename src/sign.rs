//! HMAC-SHA256 request signing.
//!
//! The one contract the client SDK and the server gate must implement
//! identically: the signature covers the exact concatenation
//! `appId + timestamp + nonce` (decimal timestamp, no separators), keyed
//! by the app's shared secret and hex-encoded. Any deviation breaks
//! interoperability.

use ring::hmac;
use uuid::Uuid;

/// Canonical message covered by the signature.
pub fn signing_message(app_id: &str, timestamp: u64, nonce: &str) -> String {
    format!("{app_id}{timestamp}{nonce}")
}

/// Compute the hex-encoded HMAC-SHA256 signature for a request.
pub fn sign(secret: &str, app_id: &str, timestamp: u64, nonce: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let tag = hmac::sign(&key, signing_message(app_id, timestamp, nonce).as_bytes());
    hex::encode(tag.as_ref())
}

/// Verify a supplied hex signature in constant time.
///
/// Malformed hex is reported as a plain mismatch; callers get no more
/// detail than "wrong signature".
pub fn verify(secret: &str, app_id: &str, timestamp: u64, nonce: &str, signature: &str) -> bool {
    let Ok(supplied) = hex::decode(signature) else {
        return false;
    };
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    hmac::verify(
        &key,
        signing_message(app_id, timestamp, nonce).as_bytes(),
        &supplied,
    )
    .is_ok()
}

/// Generate a fresh nonce: 16 random bytes, hex-encoded.
pub fn generate_nonce() -> String {
    Uuid::new_v4().simple().to_string()
}
