//! Error types for the admission gate.

use thiserror::Error;

/// Main error type for the gate.
#[derive(Error, Debug)]
pub enum GateError {
    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Admission rejections.
    #[error("Admission rejected: {kind}")]
    Admission { kind: AdmissionErrorKind },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Admission rejection kinds, in pipeline order.
///
/// All are terminal for the request. The precise kind is logged
/// server-side only; callers see the collapsed 401/429 surface of
/// [`status_code`](Self::status_code) and
/// [`public_message`](Self::public_message).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionErrorKind {
    #[error("Request rate exceeded for client")]
    RateLimited,

    #[error("Missing or empty authentication headers")]
    MissingCredentials,

    #[error("Unknown app id")]
    UnknownApp,

    #[error("Timestamp outside the freshness window")]
    StaleOrFutureRequest,

    #[error("Nonce already used (replay attack detected)")]
    ReplayDetected,

    #[error("Invalid signature")]
    SignatureMismatch,
}

impl AdmissionErrorKind {
    /// HTTP status the routing layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RateLimited => 429,
            _ => 401,
        }
    }

    /// Caller-facing message. Deliberately does not distinguish the
    /// authentication failure modes.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::RateLimited => "too many requests",
            _ => "authentication failed",
        }
    }
}

/// Client-side delivery failure kinds.
///
/// These are recovered locally by the retry loop and never surface to
/// the application: the SDK's contract is fire and forget.
#[derive(Error, Debug)]
pub enum DeliveryErrorKind {
    #[error("Failed to encode report body: {0}")]
    EncodingFailure(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    TransportFailure(#[from] reqwest::Error),

    #[error("Unexpected status code: {status}")]
    NonSuccessStatus { status: u16 },
}

/// Result type alias for gate operations.
pub type GateResult<T> = Result<T, GateError>;
