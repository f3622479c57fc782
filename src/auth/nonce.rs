//! In-memory nonce store for replay attack prevention.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clock::{Clock, SystemClock};

/// Thread-safe in-memory nonce store with TTL-based expiry.
///
/// A nonce is rejected for as long as it is resident. Residency ends only
/// when a garbage-collection sweep removes entries past the TTL; after
/// that the nonce becomes acceptable again. That residual replay window
/// is the accepted price of finite memory.
pub struct NonceStore {
    /// Map of nonce -> first-seen unix time (seconds).
    nonces: Mutex<HashMap<String, u64>>,
    /// Time-to-live for nonces.
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl NonceStore {
    /// Create a new nonce store with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a nonce store with an injected clock (for tests).
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            nonces: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Probe for a nonce and record it when unseen.
    ///
    /// Returns `true` if the nonce is new (valid), `false` if already
    /// resident. Probe and insert happen under one lock acquisition, so
    /// two concurrent requests racing on the same nonce cannot both pass.
    pub fn probe_and_insert(&self, nonce: &str) -> bool {
        let mut nonces = self.nonces.lock().unwrap_or_else(|e| e.into_inner());

        if nonces.contains_key(nonce) {
            return false;
        }

        nonces.insert(nonce.to_string(), self.clock.now_unix());
        true
    }

    /// Remove entries whose age exceeds the TTL.
    ///
    /// Runs on the GC schedule, independent of request traffic.
    pub fn sweep(&self) {
        let now = self.clock.now_unix();
        let ttl = self.ttl.as_secs();
        self.nonces
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|_, first_seen| now.saturating_sub(*first_seen) <= ttl);
    }

    /// Get the current number of resident nonces (for monitoring).
    pub fn len(&self) -> usize {
        self.nonces.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start the periodic GC sweep.
    ///
    /// The interval is configured independently of the TTL; when it is
    /// longer, expired nonces stay resident (and rejected) until the
    /// next sweep. The returned handle stops the sweep when dropped.
    pub fn start_gc_task(self: &Arc<Self>, interval: Duration) -> GcTask {
        let store = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                store.sweep();
            }
        });
        GcTask { handle }
    }
}

/// Handle for a background sweep loop; aborts the loop on drop.
pub struct GcTask {
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for GcTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
