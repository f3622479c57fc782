//! Ordered admission checks for signed report requests.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::error::{AdmissionErrorKind, GateError};
use crate::protocol::AuthHeaders;
use crate::sign;

use super::{NonceStore, SlidingWindowLimiter};

/// The admission gate in front of the report endpoints.
///
/// Checks run in a fixed order and short-circuit on the first failure:
/// rate limit (cheapest, IP-scoped), header presence, app lookup,
/// timestamp freshness, nonce replay, signature. The nonce is spent the
/// moment its check passes; a request that fails signature verification
/// afterwards, or fails in the downstream handler, has still consumed it.
pub struct AdmissionPipeline {
    settings: Arc<Settings>,
    nonce_store: Arc<NonceStore>,
    rate_limiter: Arc<SlidingWindowLimiter>,
    clock: Arc<dyn Clock>,
}

impl AdmissionPipeline {
    /// Create a new admission pipeline.
    pub fn new(
        settings: Arc<Settings>,
        nonce_store: Arc<NonceStore>,
        rate_limiter: Arc<SlidingWindowLimiter>,
    ) -> Self {
        Self::with_clock(settings, nonce_store, rate_limiter, Arc::new(SystemClock))
    }

    /// Create a pipeline with an injected clock (for tests).
    pub fn with_clock(
        settings: Arc<Settings>,
        nonce_store: Arc<NonceStore>,
        rate_limiter: Arc<SlidingWindowLimiter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            nonce_store,
            rate_limiter,
            clock,
        }
    }

    /// Decide admit/reject for an inbound request.
    ///
    /// On `Ok(())` control may pass to the downstream handler. Rejections
    /// carry an [`AdmissionErrorKind`]; the routing layer should answer
    /// with its `status_code()` / `public_message()` and leak nothing
    /// more. The precise reason is logged here.
    pub fn admit(&self, client_ip: &str, headers: &AuthHeaders) -> Result<(), GateError> {
        if !self.rate_limiter.admit(client_ip) {
            warn!(client_ip = %client_ip, "Rate limit exceeded");
            return Err(reject(AdmissionErrorKind::RateLimited));
        }

        let (app_id, timestamp, nonce, signature) = match (
            required(&headers.app_id),
            required(&headers.timestamp),
            required(&headers.nonce),
            required(&headers.signature),
        ) {
            (Some(a), Some(t), Some(n), Some(s)) => (a, t, n, s),
            _ => {
                warn!(client_ip = %client_ip, "Missing authentication headers");
                return Err(reject(AdmissionErrorKind::MissingCredentials));
            }
        };

        let Some(secret) = self.settings.get_secret(app_id) else {
            warn!(client_ip = %client_ip, app_id = %app_id, "Unknown app id");
            return Err(reject(AdmissionErrorKind::UnknownApp));
        };

        let ts: u64 = match timestamp.parse() {
            Ok(ts) => ts,
            Err(_) => {
                warn!(app_id = %app_id, timestamp = %timestamp, "Unparseable timestamp");
                return Err(reject(AdmissionErrorKind::StaleOrFutureRequest));
            }
        };

        // Symmetric freshness bound: tolerates the same clock skew in
        // both directions and caps the replay window.
        let now = self.clock.now_unix();
        if now.abs_diff(ts) > self.settings.security.timestamp_ttl_seconds {
            warn!(
                app_id = %app_id,
                timestamp = ts,
                now = now,
                "Request timestamp outside freshness window"
            );
            return Err(reject(AdmissionErrorKind::StaleOrFutureRequest));
        }

        if !self.nonce_store.probe_and_insert(nonce) {
            warn!(app_id = %app_id, nonce = %nonce, "Nonce reuse (replay attack detected)");
            return Err(reject(AdmissionErrorKind::ReplayDetected));
        }

        if !sign::verify(secret, app_id, ts, nonce, signature) {
            warn!(app_id = %app_id, "Signature mismatch");
            return Err(reject(AdmissionErrorKind::SignatureMismatch));
        }

        debug!(app_id = %app_id, client_ip = %client_ip, "Request admitted");
        Ok(())
    }
}

fn reject(kind: AdmissionErrorKind) -> GateError {
    GateError::Admission { kind }
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{AppCredential, SecurityConfig};
    use std::time::Duration;

    const NOW: u64 = 1_700_000_000;

    struct Fixture {
        pipeline: AdmissionPipeline,
        clock: Arc<ManualClock>,
    }

    fn fixture(rate_limit: usize) -> Fixture {
        let settings = Arc::new(Settings {
            security: SecurityConfig {
                rate_limit,
                nonce_ttl_seconds: 300,
                timestamp_ttl_seconds: 300,
                nonce_gc_interval_seconds: 300,
            },
            apps: vec![AppCredential {
                app_id: "app1".to_string(),
                app_name: "Test App".to_string(),
                app_secret: "s3cr3t".to_string(),
            }],
        });
        let clock = Arc::new(ManualClock::new(Duration::from_secs(NOW)));
        let nonce_store = Arc::new(NonceStore::with_clock(
            Duration::from_secs(300),
            Arc::clone(&clock) as Arc<dyn Clock>,
        ));
        let rate_limiter = Arc::new(SlidingWindowLimiter::with_clock(
            rate_limit,
            Duration::from_secs(60),
            Arc::clone(&clock) as Arc<dyn Clock>,
        ));
        let pipeline = AdmissionPipeline::with_clock(
            settings,
            nonce_store,
            rate_limiter,
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        Fixture { pipeline, clock }
    }

    fn signed_headers(app_id: &str, secret: &str, ts: u64, nonce: &str) -> AuthHeaders {
        AuthHeaders {
            app_id: Some(app_id.to_string()),
            timestamp: Some(ts.to_string()),
            nonce: Some(nonce.to_string()),
            signature: Some(sign::sign(secret, app_id, ts, nonce)),
        }
    }

    fn kind_of(result: Result<(), GateError>) -> AdmissionErrorKind {
        match result {
            Err(GateError::Admission { kind }) => kind,
            other => panic!("expected admission rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_request_admitted() {
        let f = fixture(60);
        let headers = signed_headers("app1", "s3cr3t", NOW, "abc123");
        assert!(f.pipeline.admit("10.0.0.1", &headers).is_ok());
    }

    #[test]
    fn test_replay_rejected() {
        let f = fixture(60);
        let headers = signed_headers("app1", "s3cr3t", NOW, "abc123");

        assert!(f.pipeline.admit("10.0.0.1", &headers).is_ok());
        assert_eq!(
            kind_of(f.pipeline.admit("10.0.0.1", &headers)),
            AdmissionErrorKind::ReplayDetected
        );
    }

    #[test]
    fn test_missing_headers_rejected() {
        let f = fixture(60);
        let mut headers = signed_headers("app1", "s3cr3t", NOW, "abc123");
        headers.nonce = None;
        assert_eq!(
            kind_of(f.pipeline.admit("10.0.0.1", &headers)),
            AdmissionErrorKind::MissingCredentials
        );

        let mut headers = signed_headers("app1", "s3cr3t", NOW, "abc123");
        headers.signature = Some(String::new());
        assert_eq!(
            kind_of(f.pipeline.admit("10.0.0.1", &headers)),
            AdmissionErrorKind::MissingCredentials
        );
    }

    #[test]
    fn test_unknown_app_rejected() {
        let f = fixture(60);
        let headers = signed_headers("ghost", "s3cr3t", NOW, "abc123");
        assert_eq!(
            kind_of(f.pipeline.admit("10.0.0.1", &headers)),
            AdmissionErrorKind::UnknownApp
        );
    }

    #[test]
    fn test_stale_request_rejected_despite_valid_signature() {
        let f = fixture(60);
        let headers = signed_headers("app1", "s3cr3t", NOW - 301, "abc123");
        assert_eq!(
            kind_of(f.pipeline.admit("10.0.0.1", &headers)),
            AdmissionErrorKind::StaleOrFutureRequest
        );
    }

    #[test]
    fn test_future_request_rejected() {
        let f = fixture(60);
        let headers = signed_headers("app1", "s3cr3t", NOW + 301, "abc123");
        assert_eq!(
            kind_of(f.pipeline.admit("10.0.0.1", &headers)),
            AdmissionErrorKind::StaleOrFutureRequest
        );
    }

    #[test]
    fn test_skew_within_ttl_accepted_both_directions() {
        let f = fixture(60);
        let headers = signed_headers("app1", "s3cr3t", NOW - 300, "past");
        assert!(f.pipeline.admit("10.0.0.1", &headers).is_ok());

        let headers = signed_headers("app1", "s3cr3t", NOW + 300, "future");
        assert!(f.pipeline.admit("10.0.0.1", &headers).is_ok());
    }

    #[test]
    fn test_unparseable_timestamp_rejected() {
        let f = fixture(60);
        let mut headers = signed_headers("app1", "s3cr3t", NOW, "abc123");
        headers.timestamp = Some("yesterday".to_string());
        assert_eq!(
            kind_of(f.pipeline.admit("10.0.0.1", &headers)),
            AdmissionErrorKind::StaleOrFutureRequest
        );
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let f = fixture(60);
        let mut headers = signed_headers("app1", "s3cr3t", NOW, "abc123");
        let mut signature = headers.signature.take().unwrap();
        let flipped = if signature.ends_with('0') { "1" } else { "0" };
        signature.replace_range(signature.len() - 1.., flipped);
        headers.signature = Some(signature);

        assert_eq!(
            kind_of(f.pipeline.admit("10.0.0.1", &headers)),
            AdmissionErrorKind::SignatureMismatch
        );
    }

    #[test]
    fn test_failed_signature_still_spends_nonce() {
        let f = fixture(60);
        let mut bad = signed_headers("app1", "s3cr3t", NOW, "abc123");
        bad.signature = Some("00".repeat(32));
        assert_eq!(
            kind_of(f.pipeline.admit("10.0.0.1", &bad)),
            AdmissionErrorKind::SignatureMismatch
        );

        // A later valid request with the same nonce finds it spent.
        let good = signed_headers("app1", "s3cr3t", NOW, "abc123");
        assert_eq!(
            kind_of(f.pipeline.admit("10.0.0.1", &good)),
            AdmissionErrorKind::ReplayDetected
        );
    }

    #[test]
    fn test_rate_limit_applies_before_credential_checks() {
        let f = fixture(2);
        for i in 0..2 {
            let headers = signed_headers("app1", "s3cr3t", NOW, &format!("nonce{i}"));
            assert!(f.pipeline.admit("10.0.0.1", &headers).is_ok());
        }

        // Third request from the same IP is throttled even with fresh,
        // valid credentials.
        let headers = signed_headers("app1", "s3cr3t", NOW, "nonce2");
        assert_eq!(
            kind_of(f.pipeline.admit("10.0.0.1", &headers)),
            AdmissionErrorKind::RateLimited
        );

        // A different IP is unaffected.
        let headers = signed_headers("app1", "s3cr3t", NOW, "nonce3");
        assert!(f.pipeline.admit("10.0.0.2", &headers).is_ok());
    }

    #[test]
    fn test_rate_limit_window_slides_open_again() {
        let f = fixture(1);
        let headers = signed_headers("app1", "s3cr3t", NOW, "nonce0");
        assert!(f.pipeline.admit("10.0.0.1", &headers).is_ok());

        f.clock.advance(Duration::from_secs(61));
        let headers = signed_headers("app1", "s3cr3t", NOW + 61, "nonce1");
        assert!(f.pipeline.admit("10.0.0.1", &headers).is_ok());
    }
}
