//! Tracegate Library
//!
//! This crate provides the trust boundary for a report-ingestion service:
//! the server-side admission gate (HMAC-SHA256 signature verification,
//! timestamp freshness, nonce replay detection, per-IP sliding-window rate
//! limiting) and the matching client SDK (signed, fire-and-forget delivery
//! through a bounded background queue with fixed retry).
//!
//! HTTP routing, storage, and dashboard concerns live outside this crate;
//! the routing layer feeds inbound header values to
//! [`auth::AdmissionPipeline`] and maps rejections to 401/429.

pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod protocol;
pub mod sign;
