//! Error types for the admission gate and the client SDK.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
