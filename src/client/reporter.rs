//! Fire-and-forget reporting client.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::{DeliveryErrorKind, GateError, GateResult};

use super::payload::{ActivePayload, ErrorPayload};
use super::queue::{run_worker, DeliveryQueue, ReportTask, WorkerContext, QUEUE_CAPACITY};
use super::ClientConfig;

/// Reporting client.
///
/// One background worker per instance drains the bounded queue; reports
/// from a single client are delivered FIFO. Reporting calls never block
/// and never fail from the caller's point of view.
pub struct Client {
    config: ClientConfig,
    queue: DeliveryQueue,
}

impl Client {
    /// Create a client and spawn its delivery worker.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails only when the HTTP transport cannot be constructed.
    pub fn new(config: ClientConfig) -> GateResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a client with an injected clock (for tests).
    pub fn with_clock(config: ClientConfig, clock: Arc<dyn Clock>) -> GateResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GateError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let (queue, rx) = DeliveryQueue::bounded(QUEUE_CAPACITY);
        let ctx = WorkerContext {
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
            http,
            clock,
        };
        tokio::spawn(run_worker(rx, ctx));

        Ok(Self { config, queue })
    }

    /// Queue an error report. Never blocks; drops when the buffer is full.
    pub fn report_error(&self, mut payload: ErrorPayload) {
        payload.app_id = self.config.app_id.clone();
        self.enqueue("/report/error", &payload);
    }

    /// Queue an activity report. Never blocks; drops when the buffer is full.
    pub fn report_active(&self, mut payload: ActivePayload) {
        payload.app_id = self.config.app_id.clone();
        self.enqueue("/report/active", &payload);
    }

    fn enqueue<T: Serialize>(&self, path: &str, payload: &T) {
        let body = match serde_json::to_value(payload) {
            Ok(body) => body,
            Err(e) => {
                debug!(
                    path = %path,
                    error = %DeliveryErrorKind::EncodingFailure(e),
                    "Report dropped"
                );
                return;
            }
        };

        let task = ReportTask {
            url: format!("{}{}", self.config.host, path),
            body,
        };
        if !self.queue.offer(task) {
            debug!(path = %path, "Report queue full, dropping");
        }
    }
}
