//! Client SDK.
//!
//! Fire-and-forget reporting: callers hand a payload to [`Client`] and
//! get control back immediately. A bounded queue and a single background
//! worker handle signing, HTTP delivery, and bounded retry; when the
//! queue is full or retries are exhausted, the report is dropped rather
//! than ever blocking the caller.

mod config;
mod payload;
mod queue;
mod reporter;

pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use payload::{ActivePayload, ErrorPayload};
pub use reporter::Client;
