//! Report payloads accepted by the ingest endpoints.
//!
//! Field names follow the JSON wire format the server expects; the
//! client stamps `appId` itself, callers never set it.

use serde::{Deserialize, Serialize};

/// A captured application error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Error class, e.g. `TypeError`.
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub stack: String,
    /// Page URL where the error occurred.
    pub url: String,
    #[serde(rename = "appId")]
    pub app_id: String,
}

/// An activity heartbeat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivePayload {
    #[serde(rename = "appId")]
    pub app_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub page: String,
    /// Time spent on the page, in seconds.
    pub duration: u64,
}
