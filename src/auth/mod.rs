//! Server-side admission.
//!
//! Composes nonce replay detection, per-IP sliding-window rate limiting,
//! timestamp freshness, and HMAC signature verification into one ordered
//! gate in front of the report endpoints.

mod admission;
mod nonce;
mod rate_limit;

pub use admission::AdmissionPipeline;
pub use nonce::{GcTask, NonceStore};
pub use rate_limit::SlidingWindowLimiter;
