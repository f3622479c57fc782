//! Configuration settings for the admission gate.

use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::error::GateError;

/// Main configuration structure for the gate.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub security: SecurityConfig,
    /// Registered applications and their shared secrets.
    ///
    /// Loaded at process start and read-only for the lifetime of the
    /// pipeline.
    #[serde(default)]
    pub apps: Vec<AppCredential>,
}

/// Security configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Maximum requests per minute per client IP.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: usize,
    /// Nonce time-to-live in seconds.
    #[serde(default = "default_nonce_ttl")]
    pub nonce_ttl_seconds: u64,
    /// Maximum clock skew (either direction) for request timestamps, in seconds.
    #[serde(default = "default_timestamp_ttl")]
    pub timestamp_ttl_seconds: u64,
    /// Interval between nonce garbage-collection sweeps, in seconds.
    ///
    /// Independent of the nonce TTL. When the interval exceeds the TTL,
    /// expired nonces linger until the next sweep and the effective
    /// replay window grows accordingly; validation warns about this.
    #[serde(default = "default_nonce_gc_interval")]
    pub nonce_gc_interval_seconds: u64,
}

/// A registered application and its shared secret.
#[derive(Debug, Clone, Deserialize)]
pub struct AppCredential {
    pub app_id: String,
    #[serde(default)]
    pub app_name: String,
    pub app_secret: String,
}

// Default value functions
fn default_rate_limit() -> usize {
    60
}

fn default_nonce_ttl() -> u64 {
    300
}

fn default_timestamp_ttl() -> u64 {
    300
}

fn default_nonce_gc_interval() -> u64 {
    300
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            rate_limit: default_rate_limit(),
            nonce_ttl_seconds: default_nonce_ttl(),
            timestamp_ttl_seconds: default_timestamp_ttl(),
            nonce_gc_interval_seconds: default_nonce_gc_interval(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GateError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| GateError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| GateError::Config {
            message: format!("Failed to parse config file '{}': {}", path.display(), e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.security.rate_limit == 0 {
            return Err(GateError::Config {
                message: "rate_limit must be at least 1".to_string(),
            });
        }

        if self.security.timestamp_ttl_seconds == 0 {
            return Err(GateError::Config {
                message: "timestamp_ttl_seconds must be at least 1".to_string(),
            });
        }

        for (i, app) in self.apps.iter().enumerate() {
            if app.app_id.is_empty() || app.app_secret.is_empty() {
                return Err(GateError::Config {
                    message: format!("apps[{}] must have a non-empty app_id and app_secret", i),
                });
            }
            if self.apps[..i].iter().any(|other| other.app_id == app.app_id) {
                return Err(GateError::Config {
                    message: format!("Duplicate app_id '{}'", app.app_id),
                });
            }
        }

        if self.apps.is_empty() {
            warn!("No apps configured; every signed request will be rejected");
        }

        if self.security.nonce_gc_interval_seconds > self.security.nonce_ttl_seconds {
            warn!(
                gc_interval = self.security.nonce_gc_interval_seconds,
                nonce_ttl = self.security.nonce_ttl_seconds,
                "Nonce GC interval exceeds the nonce TTL; replay window extends to the next sweep"
            );
        }

        Ok(())
    }

    /// Look up the shared secret for an app id.
    pub fn get_secret(&self, app_id: &str) -> Option<&str> {
        self.apps
            .iter()
            .find(|app| app.app_id == app_id)
            .map(|app| app.app_secret.as_str())
    }
}
