//! Client SDK configuration.

use std::time::Duration;

/// Default per-attempt HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for a reporting client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Application identifier registered with the server.
    pub app_id: String,
    /// Shared secret used to sign requests.
    pub app_secret: String,
    /// Base URL of the ingest server, e.g. `https://reports.example.com`.
    pub host: String,
    /// Per-attempt HTTP timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            host: host.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
