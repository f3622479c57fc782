//! Wire-level authentication envelope.
//!
//! Protected report endpoints carry four headers:
//!
//! | Header        | Content                                  |
//! |---------------|------------------------------------------|
//! | `X-App-Id`    | application identifier                   |
//! | `X-Timestamp` | unix seconds, decimal string             |
//! | `X-Nonce`     | single-use token (16 random bytes, hex)  |
//! | `X-Signature` | hex HMAC-SHA256 over `appId‖ts‖nonce`    |

use crate::clock::Clock;
use crate::sign;

pub const HEADER_APP_ID: &str = "X-App-Id";
pub const HEADER_TIMESTAMP: &str = "X-Timestamp";
pub const HEADER_NONCE: &str = "X-Nonce";
pub const HEADER_SIGNATURE: &str = "X-Signature";

/// The authentication headers of a signed request.
///
/// Fields are optional on the inbound side: the admission pipeline treats
/// a missing or empty value as a rejection, not a parse error.
#[derive(Debug, Clone, Default)]
pub struct AuthHeaders {
    pub app_id: Option<String>,
    pub timestamp: Option<String>,
    pub nonce: Option<String>,
    pub signature: Option<String>,
}

impl AuthHeaders {
    /// Build a fresh signed header set for an outbound request.
    ///
    /// Every call produces a new timestamp and nonce; signed headers are
    /// single-use and must not be reused across delivery attempts.
    pub fn build(app_id: &str, secret: &str, clock: &dyn Clock) -> Self {
        let timestamp = clock.now_unix();
        let nonce = sign::generate_nonce();
        let signature = sign::sign(secret, app_id, timestamp, &nonce);
        Self {
            app_id: Some(app_id.to_string()),
            timestamp: Some(timestamp.to_string()),
            nonce: Some(nonce),
            signature: Some(signature),
        }
    }

    /// Header name/value pairs for fields that are set.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            (HEADER_APP_ID, &self.app_id),
            (HEADER_TIMESTAMP, &self.timestamp),
            (HEADER_NONCE, &self.nonce),
            (HEADER_SIGNATURE, &self.signature),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}
